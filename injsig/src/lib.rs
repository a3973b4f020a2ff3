//! Injection-attack detection for untrusted input fragments.
//!
//! `injsig` decides whether a string a user handed to your application would
//! change meaning if it reached a SQL engine or an HTML document. Detection
//! is structural, not regex-based: input is tokenized the way a permissive
//! backend parser would tokenize it, the token stream is folded down to the
//! shape an attacker cannot avoid, and that shape is matched against known
//! attack fingerprints.
//!
//! ```
//! use injsig::{detect_sqli, detect_xss};
//!
//! let result = detect_sqli(b"1 OR 1=1");
//! assert!(result.is_sqli);
//! assert_eq!(result.fingerprint.as_str(), "1&1");
//!
//! assert!(!detect_sqli(b"hello world").is_sqli);
//!
//! assert!(detect_xss(b"<img src=x onerror=alert(1)>").is_xss());
//! assert!(!detect_xss(b"<b>plain markup</b>").is_xss());
//! ```

pub mod sqli;
pub mod xss;

pub use sqli::{Fingerprint, SqliDetector, SqliFlags, SqliResult};
pub use xss::html5::HtmlContext;
pub use xss::{XssFlags, XssResult};

/// Run SQL injection detection across all evaluation contexts.
pub fn detect_sqli(input: &[u8]) -> SqliResult {
    sqli::detect(input)
}

/// Run SQL injection detection with caller-fixed flags, skipping the
/// multi-context driver.
pub fn detect_sqli_with_flags(input: &[u8], flags: SqliFlags) -> SqliResult {
    sqli::detect_with_flags(input, flags)
}

/// Run XSS detection across all five HTML injection contexts.
pub fn detect_xss(input: &[u8]) -> XssResult {
    xss::detect(input)
}

/// Flag-accepting XSS detection. The flags are a reserved extension point;
/// every value behaves like [`XssFlags::NONE`] today.
pub fn detect_xss_with_flags(input: &[u8], flags: XssFlags) -> XssResult {
    xss::detect_with_flags(input, flags)
}

/// Run XSS detection for one fixed HTML context.
pub fn detect_xss_in_context(input: &[u8], context: HtmlContext) -> bool {
    xss::scan(input, context)
}

/// Library version, from the crate manifest.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_smoke() {
        assert!(detect_sqli(b"' OR '1'='1").is_sqli);
        assert!(!detect_sqli(b"plain text").is_sqli);
        assert!(detect_xss(b"<script>x</script>").is_xss());
        assert!(!detect_xss(b"plain text").is_xss());
        assert!(!version().is_empty());
    }

    #[test]
    fn reserved_xss_flags_change_nothing() {
        for input in [&b"<svg onload=x>"[..], &b"hello"[..], &b""[..]] {
            assert_eq!(detect_xss_with_flags(input, XssFlags::NONE), detect_xss(input));
        }
    }

    #[test]
    fn context_scoped_xss() {
        // Harmless in the data context, a break-out inside a quoted value.
        let payload = b"x' onerror='alert(1)";
        assert!(!detect_xss_in_context(payload, HtmlContext::Data));
        assert!(detect_xss_in_context(
            payload,
            HtmlContext::ValueSingleQuote
        ));
    }
}
