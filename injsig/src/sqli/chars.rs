//! Byte classification driving the SQL lexer.
//!
//! Every one of the 256 byte values maps to exactly one [`CharClass`]; the
//! tokenizer dispatches on the class to pick a sub-lexer. High-bit bytes are
//! treated as word characters so UTF-8 payload fragments still tokenize, and
//! control bytes count as whitespace the way most SQL engines skip them.

/// Lexing behavior selected for a byte. A closed enum dispatched by a single
/// `match` replaces the C-style function-pointer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Whitespace and control bytes; skipped, no token.
    White,
    /// `'` or `"`: quote-delimited string.
    Quote,
    /// `#`: MySQL line comment, ANSI operator.
    Hash,
    /// `$`: money literal or PostgreSQL dollar string.
    Money,
    /// Single-character operator (`%`, `+`, `^`, `~`).
    Op1,
    /// Possible two-character operator head (`!`, `&`, `*`, `<`, `=`, ...).
    Op2,
    /// Self-describing punctuation: `( ) , ; { }`.
    Punct,
    /// `-`: operator or `--` comment.
    Dash,
    /// ASCII digit or `.`: numeric literal.
    Digit,
    /// `/`: operator or `/* */` comment.
    Slash,
    /// `@`: variable.
    Var,
    /// Identifier/keyword character.
    Word,
    /// `b`/`B`: possible binary string `b'0101'`.
    BinPrefix,
    /// `e`/`E`: possible PostgreSQL escape string `e'...'`.
    EscPrefix,
    /// `n`/`N`: possible national string `N'...'`.
    NatPrefix,
    /// `q`/`Q`: possible Oracle q-string `q'(...)'`.
    QPrefix,
    /// `u`/`U`: possible unicode string `U&'...'`.
    UniPrefix,
    /// `x`/`X`: possible hex string `x'1f'`.
    HexPrefix,
    /// `[`: SQL Server bracketed word.
    BracketWord,
    /// `\`: backslash, or the MySQL `\N` NULL alias.
    Backslash,
    /// Backtick-quoted identifier.
    Tick,
    /// Anything else; becomes an `unknown` token.
    Other,
}

const fn build_class_map() -> [CharClass; 256] {
    use CharClass::*;
    let mut map = [Word; 256];
    let mut i = 0;
    while i <= 32 {
        map[i] = White;
        i += 1;
    }
    map[127] = White;
    map[160] = White; // non-breaking space, treated like the C table

    map[b'!' as usize] = Op2;
    map[b'"' as usize] = Quote;
    map[b'#' as usize] = Hash;
    map[b'$' as usize] = Money;
    map[b'%' as usize] = Op1;
    map[b'&' as usize] = Op2;
    map[b'\'' as usize] = Quote;
    map[b'(' as usize] = Punct;
    map[b')' as usize] = Punct;
    map[b'*' as usize] = Op2;
    map[b'+' as usize] = Op1;
    map[b',' as usize] = Punct;
    map[b'-' as usize] = Dash;
    map[b'.' as usize] = Digit;
    map[b'/' as usize] = Slash;

    let mut d = b'0' as usize;
    while d <= b'9' as usize {
        map[d] = Digit;
        d += 1;
    }

    map[b':' as usize] = Op2;
    map[b';' as usize] = Punct;
    map[b'<' as usize] = Op2;
    map[b'=' as usize] = Op2;
    map[b'>' as usize] = Op2;
    map[b'?' as usize] = Other;
    map[b'@' as usize] = Var;

    map[b'B' as usize] = BinPrefix;
    map[b'b' as usize] = BinPrefix;
    map[b'E' as usize] = EscPrefix;
    map[b'e' as usize] = EscPrefix;
    map[b'N' as usize] = NatPrefix;
    map[b'n' as usize] = NatPrefix;
    map[b'Q' as usize] = QPrefix;
    map[b'q' as usize] = QPrefix;
    map[b'U' as usize] = UniPrefix;
    map[b'u' as usize] = UniPrefix;
    map[b'X' as usize] = HexPrefix;
    map[b'x' as usize] = HexPrefix;

    map[b'[' as usize] = BracketWord;
    map[b'\\' as usize] = Backslash;
    map[b']' as usize] = Other;
    map[b'^' as usize] = Op1;
    map[b'`' as usize] = Tick;
    map[b'{' as usize] = Punct;
    map[b'|' as usize] = Op2;
    map[b'}' as usize] = Punct;
    map[b'~' as usize] = Op1;

    map
}

static CLASS_MAP: [CharClass; 256] = build_class_map();

/// Classify a single byte. Total over all 256 values, O(1), no state.
#[inline]
pub fn classify(byte: u8) -> CharClass {
    CLASS_MAP[byte as usize]
}

/// True when the byte lexes as whitespace.
#[inline]
pub fn is_white(byte: u8) -> bool {
    matches!(classify(byte), CharClass::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_has_a_class() {
        // Total function: indexing can never be out of range, and the map
        // assigns something other than the default to the interesting bytes.
        for b in 0u8..=255 {
            let _ = classify(b);
        }
        assert_eq!(classify(b' '), CharClass::White);
        assert_eq!(classify(b'\''), CharClass::Quote);
        assert_eq!(classify(b'7'), CharClass::Digit);
        assert_eq!(classify(b'S'), CharClass::Word);
        assert_eq!(classify(0xC3), CharClass::Word);
        assert_eq!(classify(0x00), CharClass::White);
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(classify(b'('), CharClass::Punct);
        assert_eq!(classify(b';'), CharClass::Punct);
        assert_eq!(classify(b'='), CharClass::Op2);
        assert_eq!(classify(b'+'), CharClass::Op1);
        assert_eq!(classify(b'-'), CharClass::Dash);
        assert_eq!(classify(b'/'), CharClass::Slash);
        assert_eq!(classify(b'#'), CharClass::Hash);
    }

    #[test]
    fn string_prefix_letters() {
        for (b, class) in [
            (b'x', CharClass::HexPrefix),
            (b'B', CharClass::BinPrefix),
            (b'q', CharClass::QPrefix),
            (b'N', CharClass::NatPrefix),
            (b'u', CharClass::UniPrefix),
            (b'E', CharClass::EscPrefix),
        ] {
            assert_eq!(classify(b), class);
        }
    }
}
