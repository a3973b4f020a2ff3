//! Blacklists for the XSS scanner plus the HTML entity decoder the URL
//! matcher relies on.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// How an attribute value must be treated once its name matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrClass {
    /// Not interesting.
    None,
    /// Any value makes the document scriptable.
    Harmful,
    /// Value is a URL; check its protocol.
    Url,
    /// Value is CSS.
    Style,
    /// Value names another attribute (SVG `attributeName`).
    Indirect,
}

/// Tags that execute script or rewrite the document on their own.
static DANGEROUS_TAGS: &[&str] = &[
    "APPLET", "BASE", "COMMENT", "EMBED", "FRAME", "FRAMESET", "HANDLER", "IFRAME", "IMPORT",
    "ISINDEX", "LINK", "LISTENER", "META", "NOSCRIPT", "OBJECT", "SCRIPT", "STYLE", "VMLFRAME",
    "XML", "XSS",
];

/// Event-handler names, matched after stripping the `on` prefix. Every one
/// of them takes script as its value.
#[rustfmt::skip]
static EVENT_NAMES: &[&str] = &[
    "ABORT", "ACTIVATE", "ACTIVE", "ADDSOURCEBUFFER", "ADDSTREAM", "ADDTRACK",
    "AFTERPRINT", "ANIMATIONCANCEL", "ANIMATIONEND", "ANIMATIONITERATION",
    "ANIMATIONSTART", "AUDIOEND", "AUDIOPROCESS", "AUDIOSTART",
    "AUTOCOMPLETEERROR", "AUTOCOMPLETE", "BEFOREACTIVATE", "BEFORECOPY",
    "BEFORECUT", "BEFOREINPUT", "BEFORELOAD", "BEFOREPASTE", "BEFOREPRINT",
    "BEFOREUNLOAD", "BEGINEVENT", "BLOCKED", "BLUR", "BOUNDARY",
    "BUFFEREDAMOUNTLOW", "CACHED", "CANCEL", "CANPLAYTHROUGH", "CANPLAY",
    "CHANGE", "CHARGINGCHANGE", "CHARGINGTIMECHANGE", "CHECKING", "CLICK",
    "CLOSE", "COMPLETE", "COMPOSITIONEND", "COMPOSITIONSTART",
    "COMPOSITIONUPDATE", "CONNECTING", "CONNECTIONSTATECHANGE", "CONNECT",
    "CONTEXTMENU", "CONTROLLERCHANGE", "COPY", "CUECHANGE", "CUT",
    "DATAAVAILABLE", "DATACHANNEL", "DBLCLICK", "DEVICECHANGE",
    "DEVICEMOTION", "DEVICEORIENTATION", "DISCHARGINGTIMECHANGE",
    "DISCONNECT", "DOMACTIVATE", "DOMCHARACTERDATAMODIFIED",
    "DOMCONTENTLOADED", "DOMFOCUSIN", "DOMFOCUSOUT",
    "DOMNODEINSERTEDINTODOCUMENT", "DOMNODEINSERTED",
    "DOMNODEREMOVEDFROMDOCUMENT", "DOMNODEREMOVED", "DOMSUBTREEMODIFIED",
    "DOWNLOADING", "DRAGEND", "DRAGENTER", "DRAGLEAVE", "DRAGOVER",
    "DRAGSTART", "DRAG", "DROP", "DURATIONCHANGE", "EMPTIED", "ENCRYPTED",
    "ENDED", "ENDEVENT", "END", "ENTERPICTUREINPICTURE", "ENTER", "ERROR",
    "EXIT", "FETCH", "FINISH", "FOCUSIN", "FOCUSOUT", "FOCUS", "FORMCHANGE",
    "FORMINPUT", "GAMEPADCONNECTED", "GAMEPADDISCONNECTED", "GESTURECHANGE",
    "GESTUREEND", "GESTURESCROLLEND", "GESTURESCROLLSTART",
    "GESTURESCROLLUPDATE", "GESTURESTART", "GESTURETAPDOWN", "GESTURETAP",
    "GOTPOINTERCAPTURE", "HASHCHANGE", "ICECANDIDATEERROR", "ICECANDIDATE",
    "ICECONNECTIONSTATECHANGE", "ICEGATHERINGSTATECHANGE", "INACTIVE",
    "INPUTSOURCESCHANGE", "INPUT", "INSTALL", "INVALID", "KEYDOWN",
    "KEYPRESS", "KEYSTATUSESCHANGE", "KEYUP", "LANGUAGECHANGE",
    "LEAVEPICTUREINPICTURE", "LEVELCHANGE", "LOADEDDATA", "LOADEDMETADATA",
    "LOADEND", "LOADINGDONE", "LOADINGERROR", "LOADING", "LOADSTART", "LOAD",
    "LOSTPOINTERCAPTURE", "MARK", "MERCHANTVALIDATION", "MESSAGEERROR",
    "MESSAGE", "MOUSEDOWN", "MOUSEENTER", "MOUSELEAVE", "MOUSEMOVE",
    "MOUSEOUT", "MOUSEOVER", "MOUSEUP", "MOUSEWHEEL", "MUTE",
    "NEGOTIATIONNEEDED", "NEXTTRACK", "NOMATCH", "NOUPDATE", "OBSOLETE",
    "OFFLINE", "ONLINE", "OPEN", "ORIENTATIONCHANGE", "OVERCONSTRAINED",
    "OVERFLOWCHANGED", "PAGEHIDE", "PAGESHOW", "PASTE", "PAUSE",
    "PAYERDETAILCHANGE", "PAYMENTAUTHORIZED", "PAYMENTMETHODCHANGE",
    "PAYMENTMETHODSELECTED", "PLAYING", "PLAY", "POINTERCANCEL",
    "POINTERDOWN", "POINTERENTER", "POINTERLEAVE", "POINTERLOCKCHANGE",
    "POINTERLOCKERROR", "POINTERMOVE", "POINTEROUT", "POINTEROVER",
    "POINTERUP", "POPSTATE", "PREVIOUSTRACK", "PROCESSORERROR", "PROGRESS",
    "PROPERTYCHANGE", "RATECHANGE", "READYSTATECHANGE", "REJECTIONHANDLED",
    "REMOVESOURCEBUFFER", "REMOVESTREAM", "REMOVETRACK", "REMOVE", "RESET",
    "RESIZE", "RESOURCETIMINGBUFFERFULL", "RESULT", "RESUME", "SCROLL",
    "SEARCH", "SECURITYPOLICYVIOLATION", "SEEKED", "SEEKING", "SELECTEND",
    "SELECTIONCHANGE", "SELECTSTART", "SELECT", "SHIPPINGADDRESSCHANGE",
    "SHIPPINGCONTACTSELECTED", "SHIPPINGMETHODSELECTED",
    "SHIPPINGOPTIONCHANGE", "SHOW", "SIGNALINGSTATECHANGE", "SLOTCHANGE",
    "SOUNDEND", "SOUNDSTART", "SOURCECLOSE", "SOURCEENDED", "SOURCEOPEN",
    "SPEECHEND", "SPEECHSTART", "SQUEEZEEND", "SQUEEZESTART", "SQUEEZE",
    "STALLED", "STARTED", "START", "STATECHANGE", "STOP", "STORAGE",
    "SUBMIT", "SUCCESS", "SUSPEND", "TEXTINPUT", "TIMEOUT", "TIMEUPDATE",
    "TOGGLE", "TONECHANGE", "TOUCHCANCEL", "TOUCHEND", "TOUCHFORCECHANGE",
    "TOUCHMOVE", "TOUCHSTART", "TRACK", "TRANSITIONCANCEL", "TRANSITIONEND",
    "TRANSITIONRUN", "TRANSITIONSTART", "UNCAPTUREDERROR",
    "UNHANDLEDREJECTION", "UNLOAD", "UNMUTE", "UPDATEEND", "UPDATEFOUND",
    "UPDATEREADY", "UPDATESTART", "UPDATE", "UPGRADENEEDED",
    "VALIDATEMERCHANT", "VERSIONCHANGE", "VISIBILITYCHANGE", "VOLUMECHANGE",
    "WAITINGFORKEY", "WAITING", "WEBGLCONTEXTCHANGED",
    "WEBGLCONTEXTCREATIONERROR", "WEBGLCONTEXTLOST", "WEBGLCONTEXTRESTORED",
    "WEBKITANIMATIONEND", "WEBKITANIMATIONITERATION", "WEBKITANIMATIONSTART",
    "WEBKITBEFORETEXTINSERTED", "WEBKITBEGINFULLSCREEN",
    "WEBKITCURRENTPLAYBACKTARGETISWIRELESSCHANGED", "WEBKITENDFULLSCREEN",
    "WEBKITFULLSCREENCHANGE", "WEBKITFULLSCREENERROR", "WEBKITKEYADDED",
    "WEBKITKEYERROR", "WEBKITKEYMESSAGE", "WEBKITMOUSEFORCECHANGED",
    "WEBKITMOUSEFORCEDOWN", "WEBKITMOUSEFORCEUP",
    "WEBKITMOUSEFORCEWILLBEGIN", "WEBKITNEEDKEY",
    "WEBKITNETWORKINFOCHANGE", "WEBKITPLAYBACKTARGETAVAILABILITYCHANGED",
    "WEBKITPRESENTATIONMODECHANGED", "WEBKITREGIONOVERSETCHANGE",
    "WEBKITREMOVESOURCEBUFFER", "WEBKITSOURCECLOSE", "WEBKITSOURCEENDED",
    "WEBKITSOURCEOPEN", "WEBKITSPEECHCHANGE", "WEBKITTRANSITIONEND",
    "WEBKITWILLREVEALBOTTOM", "WEBKITWILLREVEALLEFT",
    "WEBKITWILLREVEALRIGHT", "WEBKITWILLREVEALTOP", "WHEEL", "WRITEEND",
    "WRITESTART", "WRITE", "ZOOM",
];

/// Non-event attributes whose value needs inspection or is dangerous
/// outright.
static SPECIAL_ATTRS: &[(&str, AttrClass)] = &[
    ("ACTION", AttrClass::Url),
    ("ATTRIBUTENAME", AttrClass::Indirect),
    ("BY", AttrClass::Url),
    ("BACKGROUND", AttrClass::Url),
    ("DATAFORMATAS", AttrClass::Harmful),
    ("DATASRC", AttrClass::Harmful),
    ("DYNSRC", AttrClass::Url),
    ("FILTER", AttrClass::Style),
    ("FORMACTION", AttrClass::Url),
    ("FOLDER", AttrClass::Url),
    ("FROM", AttrClass::Url),
    ("HANDLER", AttrClass::Url),
    ("HREF", AttrClass::Url),
    ("LOWSRC", AttrClass::Url),
    ("POSTER", AttrClass::Url),
    ("SRC", AttrClass::Url),
    ("STYLE", AttrClass::Style),
    ("TO", AttrClass::Url),
    ("VALUES", AttrClass::Url),
    ("XLINK:HREF", AttrClass::Url),
];

/// Protocols that execute or re-interpret their payload. "JAVA" also covers
/// "JAVASCRIPT"; matching is prefix-based after entity decoding.
pub static DANGEROUS_PROTOCOLS: &[&str] = &["DATA", "VIEW-SOURCE", "VBSCRIPT", "JAVA"];

static TAG_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
static EVENT_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
static ATTR_MAP: OnceLock<HashMap<&'static str, AttrClass>> = OnceLock::new();

/// Longest name worth normalizing; the longest event name is 44 bytes.
const MAX_NAME_LEN: usize = 64;

/// Uppercase a tag or attribute name and drop NUL bytes, which browsers
/// ignore inside names. Returns `None` for names too long to match anything.
fn normalize_name(raw: &[u8]) -> Option<String> {
    if raw.len() > MAX_NAME_LEN * 2 {
        return None;
    }
    let mut out = String::with_capacity(raw.len());
    for &b in raw {
        if b == 0 {
            continue;
        }
        out.push(b.to_ascii_uppercase() as char);
        if out.len() > MAX_NAME_LEN {
            return None;
        }
    }
    Some(out)
}

/// True for tag names that are dangerous wherever they appear, including
/// every `svg*` and `xsl*` name.
pub fn is_dangerous_tag(raw: &[u8]) -> bool {
    if raw.len() < 3 {
        return false;
    }
    let Some(name) = normalize_name(raw) else {
        return false;
    };
    if name.len() < 3 {
        return false;
    }
    let tags = TAG_SET.get_or_init(|| DANGEROUS_TAGS.iter().copied().collect());
    if tags.contains(name.as_str()) {
        return true;
    }
    name.starts_with("SVG") || name.starts_with("XSL")
}

/// Classify an attribute name: `on*` event handlers, XML namespace
/// attributes, and the special-attribute table.
pub fn classify_attr(raw: &[u8]) -> AttrClass {
    if raw.len() < 2 {
        return AttrClass::None;
    }
    let Some(name) = normalize_name(raw) else {
        return AttrClass::None;
    };

    if name.len() >= 5 {
        if let Some(event) = name.strip_prefix("ON") {
            let events = EVENT_SET.get_or_init(|| EVENT_NAMES.iter().copied().collect());
            if events.contains(event) {
                return AttrClass::Harmful;
            }
        }
        if name == "XMLNS" || name == "XLINK" {
            return AttrClass::Harmful;
        }
    }

    let attrs = ATTR_MAP.get_or_init(|| SPECIAL_ATTRS.iter().copied().collect());
    attrs.get(name.as_str()).copied().unwrap_or(AttrClass::None)
}

/// Decode one character of an HTML-entity-encoded byte stream. Only numeric
/// entities are decoded; named entities come back as a literal `&` because a
/// browser that decodes `&colon;` will also have decoded it before the URL
/// parser runs. Returns the character value and the bytes consumed.
pub fn decode_entity_at(src: &[u8]) -> (i32, usize) {
    let Some(&first) = src.first() else {
        return (-1, 0);
    };
    if first != b'&' || src.len() < 2 {
        return (i32::from(first), 1);
    }
    if src[1] != b'#' {
        return (i32::from(b'&'), 1);
    }

    if src.len() > 2 && (src[2] | 0x20) == b'x' {
        // &#x...;
        let Some(&d) = src.get(3) else {
            return (i32::from(b'&'), 1);
        };
        let Some(mut val) = hex_digit(d) else {
            return (i32::from(b'&'), 1);
        };
        let mut i = 4;
        while i < src.len() {
            let b = src[i];
            if b == b';' {
                return (val, i + 1);
            }
            let Some(digit) = hex_digit(b) else {
                return (val, i);
            };
            val = val * 16 + digit;
            if val > 0x1000FF {
                return (i32::from(b'&'), 1);
            }
            i += 1;
        }
        (val, i)
    } else {
        // &#...;
        let Some(&d) = src.get(2) else {
            return (i32::from(b'&'), 1);
        };
        if !d.is_ascii_digit() {
            return (i32::from(b'&'), 1);
        }
        let mut val = i32::from(d - b'0');
        let mut i = 3;
        while i < src.len() {
            let b = src[i];
            if b == b';' {
                return (val, i + 1);
            }
            if !b.is_ascii_digit() {
                return (val, i);
            }
            val = val * 10 + i32::from(b - b'0');
            if val > 0x1000FF {
                return (i32::from(b'&'), 1);
            }
            i += 1;
        }
        (val, i)
    }
}

fn hex_digit(b: u8) -> Option<i32> {
    match b {
        b'0'..=b'9' => Some(i32::from(b - b'0')),
        b'a'..=b'f' => Some(i32::from(b - b'a' + 10)),
        b'A'..=b'F' => Some(i32::from(b - b'A' + 10)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn tag_matching() {
        assert!(is_dangerous_tag(b"script"));
        assert!(is_dangerous_tag(b"SCRIPT"));
        assert!(is_dangerous_tag(b"scr\x00ipt"));
        assert!(is_dangerous_tag(b"svg"));
        assert!(is_dangerous_tag(b"svganimate"));
        assert!(is_dangerous_tag(b"xsl:template"));
        assert!(!is_dangerous_tag(b"div"));
        assert!(!is_dangerous_tag(b"b"));
    }

    #[test]
    fn attr_classification() {
        assert_eq!(classify_attr(b"onclick"), AttrClass::Harmful);
        assert_eq!(classify_attr(b"ONERROR"), AttrClass::Harmful);
        assert_eq!(classify_attr(b"onmouseover"), AttrClass::Harmful);
        assert_eq!(classify_attr(b"href"), AttrClass::Url);
        assert_eq!(classify_attr(b"style"), AttrClass::Style);
        assert_eq!(classify_attr(b"attributeName"), AttrClass::Indirect);
        assert_eq!(classify_attr(b"xmlns"), AttrClass::Harmful);
        assert_eq!(classify_attr(b"class"), AttrClass::None);
        assert_eq!(classify_attr(b"id"), AttrClass::None);
        // "onfoo" is not a known event.
        assert_eq!(classify_attr(b"onfoo"), AttrClass::None);
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(decode_entity_at(b"a"), (i32::from(b'a'), 1));
        assert_eq!(decode_entity_at(b"&#106;"), (106, 6));
        assert_eq!(decode_entity_at(b"&#x6A;"), (0x6A, 6));
        assert_eq!(decode_entity_at(b"&#x6a"), (0x6A, 5));
        // Named entities are left alone.
        assert_eq!(decode_entity_at(b"&amp;"), (i32::from(b'&'), 1));
        // Out-of-range values decay to a literal ampersand.
        assert_eq!(decode_entity_at(b"&#99999999;"), (i32::from(b'&'), 1));
    }
}
