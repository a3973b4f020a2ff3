//! Cross-site scripting detection.
//!
//! A permissive HTML5 tokenizer feeds a scanner that looks for constructs
//! which turn markup into script: dangerous tags, event-handler attributes,
//! scriptable URL protocols, CSS-bearing attributes, and comment formats
//! that legacy browsers execute. The driver runs the scan in every injection
//! context because the attacker chooses where the fragment lands.

pub mod html5;
pub mod tables;

use bitflags::bitflags;

use html5::{Html5Tokenizer, HtmlContext, HtmlTokenType};
use tables::{classify_attr, decode_entity_at, is_dangerous_tag, AttrClass, DANGEROUS_PROTOCOLS};

bitflags! {
    /// Reserved dialect selector for the XSS scanner. Accepted for
    /// interface stability; no value changes scanning behavior today.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct XssFlags: u32 {
        const NONE = 0;
    }
}

/// Two-state verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XssResult {
    Safe,
    Xss,
}

impl XssResult {
    pub fn is_xss(self) -> bool {
        matches!(self, XssResult::Xss)
    }
}

/// All contexts the multi-context driver evaluates, in order.
pub const ALL_CONTEXTS: [HtmlContext; 5] = [
    HtmlContext::Data,
    HtmlContext::ValueNoQuote,
    HtmlContext::ValueSingleQuote,
    HtmlContext::ValueDoubleQuote,
    HtmlContext::ValueBackQuote,
];

/// Evaluate every context; any hit makes the verdict `Xss`.
pub fn detect(input: &[u8]) -> XssResult {
    detect_with_flags(input, XssFlags::NONE)
}

/// Flag-accepting variant. Flags are reserved and currently inert.
pub fn detect_with_flags(input: &[u8], _flags: XssFlags) -> XssResult {
    if ALL_CONTEXTS.iter().any(|&context| scan(input, context)) {
        XssResult::Xss
    } else {
        XssResult::Safe
    }
}

/// Scan the input assuming one fixed context.
pub fn scan(input: &[u8], context: HtmlContext) -> bool {
    let mut tokenizer = Html5Tokenizer::new(input, context);
    let mut attr = AttrClass::None;

    while tokenizer.next() {
        if tokenizer.token_type != HtmlTokenType::AttrValue {
            attr = AttrClass::None;
        }

        match tokenizer.token_type {
            // A DOCTYPE in user input can switch the document into a mode
            // with different parsing rules.
            HtmlTokenType::Doctype => return true,
            HtmlTokenType::TagNameOpen => {
                if is_dangerous_tag(tokenizer.token()) {
                    return true;
                }
            }
            HtmlTokenType::AttrName => {
                attr = classify_attr(tokenizer.token());
            }
            HtmlTokenType::AttrValue => {
                match attr {
                    AttrClass::None => {}
                    AttrClass::Harmful => return true,
                    AttrClass::Url => {
                        if is_dangerous_url(tokenizer.token()) {
                            return true;
                        }
                    }
                    AttrClass::Style => return true,
                    AttrClass::Indirect => {
                        // SVG lets the value name the attribute actually
                        // being set.
                        if classify_attr(tokenizer.token()) != AttrClass::None {
                            return true;
                        }
                    }
                }
                attr = AttrClass::None;
            }
            HtmlTokenType::TagComment => {
                if is_dangerous_comment(tokenizer.token()) {
                    return true;
                }
            }
            _ => {}
        }
    }

    false
}

/// URL protocol check, decoding numeric HTML entities on the fly so
/// `jav&#x61;script:` does not slip through.
fn is_dangerous_url(url: &[u8]) -> bool {
    // Browsers strip leading control and high-bit bytes before parsing.
    let trimmed = match url.iter().position(|&b| b > 32 && b < 127) {
        Some(at) => &url[at..],
        None => return false,
    };
    DANGEROUS_PROTOCOLS
        .iter()
        .any(|protocol| decoded_starts_with(trimmed, protocol.as_bytes()))
}

/// Case-insensitive prefix match over the entity-decoded value, skipping
/// NULs, newlines, and leading whitespace the way URL parsers do.
fn decoded_starts_with(input: &[u8], pattern: &[u8]) -> bool {
    let mut at = 0;
    let mut matched = 0;
    let mut leading = true;

    while at < input.len() && matched < pattern.len() {
        let (decoded, consumed) = decode_entity_at(&input[at..]);
        at += consumed.max(1);

        if leading && decoded <= 32 {
            continue;
        }
        leading = false;
        if decoded == 0 || decoded == 10 {
            continue;
        }

        let upper = if (b'a'..=b'z').contains(&(decoded as u8)) && decoded < 128 {
            decoded - 0x20
        } else {
            decoded
        };
        if i32::from(pattern[matched]) != upper {
            return false;
        }
        matched += 1;
    }

    matched == pattern.len()
}

/// Comment bodies legacy engines treat as live content: IE backtick
/// tag-endings, `[if` conditionals, XML processing instructions, `IMPORT`
/// pseudo-tags, and inline ENTITY definitions.
fn is_dangerous_comment(comment: &[u8]) -> bool {
    if comment.contains(&b'`') {
        return true;
    }
    if comment.len() > 3 {
        if comment[0] == b'[' && comment[1..3].eq_ignore_ascii_case(b"if") {
            return true;
        }
        if comment[..3].eq_ignore_ascii_case(b"xml") {
            return true;
        }
    }
    if comment.len() > 5 {
        if comment[..6].eq_ignore_ascii_case(b"IMPORT") {
            return true;
        }
        if comment[..6].eq_ignore_ascii_case(b"ENTITY") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn xss(input: &str) -> bool {
        detect(input.as_bytes()).is_xss()
    }

    #[test]
    fn flags_are_inert() {
        let attack = b"<script>alert(1)</script>";
        assert_eq!(detect_with_flags(attack, XssFlags::NONE), XssResult::Xss);
        assert_eq!(detect_with_flags(attack, XssFlags::NONE), detect(attack));
        assert_eq!(detect(b"plain text"), XssResult::Safe);
    }

    #[test]
    fn script_tags() {
        assert!(xss("<script>alert(1)</script>"));
        assert!(xss("<SCRIPT SRC=http://evil/x.js>"));
        assert!(xss("<scr\u{0}ipt>"));
        assert!(xss("<iframe src='x'>"));
        assert!(xss("<svg onload=alert(1)>"));
        assert!(xss("<xsl:template>"));
    }

    #[test]
    fn event_handlers() {
        assert!(xss("<img src=x onerror=alert(1)>"));
        assert!(xss("<div onclick='go()'>"));
        assert!(xss("<body onload=init()>"));
        assert!(!xss("<div data-onclick='x'>"));
    }

    #[test]
    fn url_protocols() {
        assert!(xss("<a href='javascript:alert(1)'>"));
        assert!(xss("<a href='JAVASCRIPT:x'>"));
        assert!(xss("<a href='  vbscript:x'>"));
        assert!(xss("<a href='data:text/html,x'>"));
        assert!(xss("<a href='view-source:x'>"));
        assert!(!xss("<a href='https://example.com/'>"));
        assert!(!xss("<a href='/relative/path'>"));
    }

    #[test]
    fn entity_encoded_protocol() {
        assert!(xss("<a href='jav&#x61;script:alert(1)'>"));
        assert!(xss("<a href='&#106;avascript:alert(1)'>"));
        assert!(xss("<a href='java\u{0}script:alert(1)'>"));
    }

    #[test]
    fn style_and_indirect() {
        assert!(xss("<div style='x'>"));
        assert!(xss("<set attributeName='onload' to='alert(1)'>"));
    }

    #[test]
    fn attribute_value_break_out() {
        // Payload assumes it lands inside an existing quoted attribute.
        assert!(xss("x' onerror='alert(1)"));
        assert!(xss("x\" onmouseover=\"alert(1)"));
        assert!(xss("x` onclick=`alert(1)"));
        assert!(xss(" onfocus=alert(1) autofocus x"));
    }

    #[test]
    fn dangerous_comments_and_doctype() {
        assert!(xss("<!DOCTYPE html>"));
        assert!(xss("<!--[if IE]>x<![endif]-->"));
        assert!(xss("<!-- `payload -->"));
        assert!(xss("<?import namespace='t'?>"));
        assert!(!xss("<!-- plain note -->"));
    }

    #[test]
    fn benign_markup() {
        assert!(!xss("hello world"));
        assert!(!xss("<b>bold</b>"));
        assert!(!xss("<p class='big'>text</p>"));
        assert!(!xss("a < b and c > d"));
        assert!(!xss(""));
    }
}
