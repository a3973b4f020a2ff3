//! SQL lexer for untrusted fragments.
//!
//! The tokenizer never fails: unterminated strings and comments degrade to a
//! token that runs to the end of the buffer, unknown bytes become `Unknown`
//! tokens, and the position strictly advances on every step so malformed
//! input cannot loop.

use std::borrow::Cow;

use super::chars::{self, CharClass};
use super::keywords;
use super::SqliFlags;

/// Longest word considered for keyword lookup; anything longer is a bareword.
pub(crate) const MAX_KEYWORD_LEN: usize = 32;

/// Word-classification hook. Callers that tune the keyword table supply one
/// through [`SqliDetector::with_lookup`](crate::sqli::SqliDetector::with_lookup);
/// `None` means "not a keyword, treat as a bareword".
pub type LookupFn = dyn Fn(&str) -> Option<TokenKind>;

/// Closed set of lexical categories. Each carries the one-byte code used in
/// fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    None,
    Keyword,
    Union,
    Group,
    Expression,
    SqlType,
    Function,
    Bareword,
    Number,
    Variable,
    String,
    Operator,
    LogicOperator,
    Comment,
    Collate,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Tsql,
    Unknown,
    Evil,
    Backslash,
}

impl TokenKind {
    /// Fingerprint code byte for this kind.
    pub fn code(self) -> u8 {
        match self {
            TokenKind::None => 0,
            TokenKind::Keyword => b'k',
            TokenKind::Union => b'U',
            TokenKind::Group => b'B',
            TokenKind::Expression => b'E',
            TokenKind::SqlType => b't',
            TokenKind::Function => b'f',
            TokenKind::Bareword => b'n',
            TokenKind::Number => b'1',
            TokenKind::Variable => b'v',
            TokenKind::String => b's',
            TokenKind::Operator => b'o',
            TokenKind::LogicOperator => b'&',
            TokenKind::Comment => b'c',
            TokenKind::Collate => b'A',
            TokenKind::LeftParen => b'(',
            TokenKind::RightParen => b')',
            TokenKind::LeftBrace => b'{',
            TokenKind::RightBrace => b'}',
            TokenKind::Dot => b'.',
            TokenKind::Comma => b',',
            TokenKind::Colon => b':',
            TokenKind::Semicolon => b';',
            TokenKind::Tsql => b'T',
            TokenKind::Unknown => b'?',
            TokenKind::Evil => b'X',
            TokenKind::Backslash => b'\\',
        }
    }
}

/// A lexed span. `val` borrows from the source buffer; only tokens merged by
/// the folder own a normalized joined value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Byte offset of the value within the source buffer.
    pub pos: usize,
    pub val: Cow<'a, [u8]>,
    /// Opening string delimiter, 0 when none (or when the open quote was
    /// simulated by a quote-context flag).
    pub str_open: u8,
    /// Closing string delimiter, 0 when the string ran to end of buffer.
    pub str_close: u8,
    /// `@` count for variables.
    pub count: u8,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, pos: usize, val: &'a [u8]) -> Self {
        Token {
            kind,
            pos,
            val: Cow::Borrowed(val),
            str_open: 0,
            str_close: 0,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    /// Token value as UTF-8; lossy only for display, lookups go through the
    /// ASCII path.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.val).unwrap_or("")
    }
}

/// Comment-style counters gathered during one tokenization pass. The driver
/// uses them to decide whether an input deserves a MySQL re-parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentStats {
    /// `/* ... */` comments.
    pub c_style: u32,
    /// `--` followed by whitespace or end of input.
    pub dash_dash_white: u32,
    /// `--` followed by anything else; meaning differs between dialects.
    pub dash_dash_other: u32,
    /// `#` comments (MySQL only).
    pub hash: u32,
}

/// Per-call lexer state. Owned by exactly one tokenization pass and discarded
/// afterwards.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    flags: SqliFlags,
    lookup: Option<&'a LookupFn>,
    pub stats: CommentStats,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8], flags: SqliFlags) -> Self {
        Tokenizer {
            input,
            pos: 0,
            flags,
            lookup: None,
            stats: CommentStats::default(),
        }
    }

    /// Replace the static keyword table with a caller-supplied function.
    pub fn with_lookup_fn(mut self, lookup: &'a LookupFn) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub(crate) fn lookup_override(&self) -> Option<&'a LookupFn> {
        self.lookup
    }

    fn lookup_word(&self, word: &str) -> Option<TokenKind> {
        match self.lookup {
            Some(lookup) => lookup(word),
            None => keywords::lookup(word),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Produce the next token, or `None` at end of input. Whitespace is
    /// consumed silently; every other byte contributes to some token.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.pos == 0 && self.pos < self.input.len() {
            if let Some(delim) = self.flags.quote_context() {
                return Some(self.lex_open_string_context(delim));
            }
        }

        while self.pos < self.input.len() {
            let start = self.pos;
            let byte = self.input[self.pos];
            let token = match chars::classify(byte) {
                CharClass::White => {
                    self.pos += 1;
                    None
                }
                CharClass::Quote => Some(self.lex_string()),
                CharClass::Hash => self.lex_hash(),
                CharClass::Money => Some(self.lex_money()),
                CharClass::Op1 => Some(self.lex_op1()),
                CharClass::Op2 => Some(self.lex_op2()),
                CharClass::Punct => Some(self.lex_punct()),
                CharClass::Dash => self.lex_dash(),
                CharClass::Digit => Some(self.lex_number()),
                CharClass::Slash => Some(self.lex_slash()),
                CharClass::Var => Some(self.lex_variable()),
                CharClass::Word => Some(self.lex_word()),
                CharClass::BinPrefix => Some(self.lex_bin_string()),
                CharClass::EscPrefix => Some(self.lex_esc_string()),
                CharClass::NatPrefix => Some(self.lex_nat_string()),
                CharClass::QPrefix => Some(self.lex_q_string(0)),
                CharClass::UniPrefix => Some(self.lex_uni_string()),
                CharClass::HexPrefix => Some(self.lex_hex_string()),
                CharClass::BracketWord => Some(self.lex_bracket_word()),
                CharClass::Backslash => Some(self.lex_backslash()),
                CharClass::Tick => Some(self.lex_tick()),
                CharClass::Other => Some(self.lex_unknown()),
            };

            // Hard safety rule: a sub-lexer reporting no progress still costs
            // one byte, so tokenization always terminates.
            if self.pos <= start {
                self.pos = start + 1;
            }

            if let Some(token) = token {
                return Some(token);
            }
        }

        None
    }

    // --- string lexers -----------------------------------------------------

    /// First token under a quote-context flag: the input is treated as if it
    /// continued an already-open string.
    fn lex_open_string_context(&mut self, delim: u8) -> Token<'a> {
        let mut search = 0;
        let close = loop {
            match memchr(delim, &self.input[search..]) {
                Some(off) => {
                    let at = search + off;
                    if at > 0 && backslash_escaped(self.input, at - 1) {
                        search = at + 1;
                    } else if double_delim_at(self.input, at) {
                        search = at + 2;
                    } else {
                        break Some(at);
                    }
                }
                None => break None,
            }
        };

        let mut token = match close {
            Some(end) => {
                self.pos = end + 1;
                Token::new(TokenKind::String, 0, &self.input[..end])
            }
            None => {
                self.pos = self.input.len();
                Token::new(TokenKind::String, 0, self.input)
            }
        };
        // Simulated open quote: str_open stays 0.
        token.str_close = if close.is_some() { delim } else { 0 };
        token
    }

    fn lex_string(&mut self) -> Token<'a> {
        let delim = self.input[self.pos];
        self.lex_string_tail(self.pos, delim, 1)
    }

    /// String body starting at `start + offset`, delimited by `delim`.
    /// Unterminated strings run to end of buffer with `str_close == 0`.
    fn lex_string_tail(&mut self, start: usize, delim: u8, offset: usize) -> Token<'a> {
        let body = start + offset;
        let mut search = body;
        while search < self.input.len() {
            match memchr(delim, &self.input[search..]) {
                Some(off) => {
                    let at = search + off;
                    if at > 0 && backslash_escaped(self.input, at - 1) {
                        search = at + 1;
                    } else if double_delim_at(self.input, at) {
                        search = at + 2;
                    } else {
                        let mut token =
                            Token::new(TokenKind::String, body, &self.input[body..at]);
                        token.str_open = delim;
                        token.str_close = delim;
                        self.pos = at + 1;
                        return token;
                    }
                }
                None => break,
            }
        }

        let body = body.min(self.input.len());
        let mut token = Token::new(TokenKind::String, body, &self.input[body..]);
        token.str_open = delim;
        token.str_close = 0;
        self.pos = self.input.len();
        token
    }

    /// `e'...'` PostgreSQL escape string, else a plain word.
    fn lex_esc_string(&mut self) -> Token<'a> {
        if self.pos + 2 < self.input.len() && self.input[self.pos + 1] == b'\'' {
            self.lex_string_tail(self.pos, b'\'', 2)
        } else {
            self.lex_word()
        }
    }

    /// `N'...'` national string or `nq'...'`, else a word.
    fn lex_nat_string(&mut self) -> Token<'a> {
        if self.pos + 2 < self.input.len() && self.input[self.pos + 1] == b'\'' {
            return self.lex_string_tail(self.pos, b'\'', 2);
        }
        self.lex_q_string(1)
    }

    /// `U&'...'` unicode string, else a word.
    fn lex_uni_string(&mut self) -> Token<'a> {
        if self.pos + 2 < self.input.len()
            && self.input[self.pos + 1] == b'&'
            && self.input[self.pos + 2] == b'\''
        {
            self.pos += 2;
            let mut token = self.lex_string();
            token.str_open = b'u';
            if token.str_close == b'\'' {
                token.str_close = b'u';
            }
            token
        } else {
            self.lex_word()
        }
    }

    /// Oracle `q'<delim>body<delim>'` string; `offset` skips a leading `n`.
    fn lex_q_string(&mut self, offset: usize) -> Token<'a> {
        let start = self.pos + offset;
        let len = self.input.len();

        let is_q = start < len && (self.input[start] | 0x20) == b'q';
        if !is_q || start + 2 >= len || self.input[start + 1] != b'\'' {
            return self.lex_word();
        }
        let open = self.input[start + 2];
        if open < 33 {
            return self.lex_word();
        }
        let close = match open {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            b'<' => b'>',
            other => other,
        };

        let body = start + 3;
        let mut at = body;
        while at + 1 < len {
            if self.input[at] == close && self.input[at + 1] == b'\'' {
                let mut token = Token::new(TokenKind::String, body, &self.input[body..at]);
                token.str_open = b'q';
                token.str_close = b'q';
                self.pos = at + 2;
                return token;
            }
            at += 1;
        }

        let body = body.min(len);
        let mut token = Token::new(TokenKind::String, body, &self.input[body..]);
        token.str_open = b'q';
        token.str_close = 0;
        self.pos = len;
        token
    }

    /// `b'0101'` binary literal, lexed as a number; anything else is a word.
    fn lex_bin_string(&mut self) -> Token<'a> {
        self.lex_radix_string(|b| b == b'0' || b == b'1')
    }

    /// `x'1f'` hex literal, lexed as a number; anything else is a word.
    fn lex_hex_string(&mut self) -> Token<'a> {
        self.lex_radix_string(|b| b.is_ascii_hexdigit())
    }

    fn lex_radix_string(&mut self, digit: impl Fn(u8) -> bool) -> Token<'a> {
        let start = self.pos;
        let len = self.input.len();
        if start + 2 >= len || self.input[start + 1] != b'\'' {
            return self.lex_word();
        }
        let mut end = start + 2;
        while end < len && digit(self.input[end]) {
            end += 1;
        }
        if end >= len || self.input[end] != b'\'' {
            return self.lex_word();
        }
        let token = Token::new(TokenKind::Number, start, &self.input[start..=end]);
        self.pos = end + 1;
        token
    }

    // --- comments and operators --------------------------------------------

    /// `#`: comment in MySQL mode, a plain operator under ANSI.
    fn lex_hash(&mut self) -> Option<Token<'a>> {
        self.stats.hash += 1;
        if self.flags.contains(SqliFlags::SQL_MYSQL) {
            Some(self.lex_line_comment())
        } else {
            Some(self.single(TokenKind::Operator))
        }
    }

    fn lex_dash(&mut self) -> Option<Token<'a>> {
        let pos = self.pos;
        let len = self.input.len();
        if pos + 1 < len && self.input[pos + 1] == b'-' {
            if pos + 2 >= len || chars::is_white(self.input[pos + 2]) {
                self.stats.dash_dash_white += 1;
                return Some(self.lex_line_comment());
            }
            // "--x": ANSI still comments, MySQL sees two unary minuses.
            self.stats.dash_dash_other += 1;
            if self.flags.contains(SqliFlags::SQL_ANSI) {
                return Some(self.lex_line_comment());
            }
        }
        Some(self.single(TokenKind::Operator))
    }

    fn lex_line_comment(&mut self) -> Token<'a> {
        let start = self.pos;
        let end = memchr(b'\n', &self.input[start..])
            .map(|off| start + off)
            .unwrap_or(self.input.len());
        let token = Token::new(TokenKind::Comment, start, &self.input[start..end]);
        self.pos = (end + 1).min(self.input.len());
        token
    }

    fn lex_slash(&mut self) -> Token<'a> {
        let pos = self.pos;
        if pos + 1 >= self.input.len() || self.input[pos + 1] != b'*' {
            return self.single(TokenKind::Operator);
        }
        self.stats.c_style += 1;
        self.lex_block_comment()
    }

    /// `/* ... */`, running to end of buffer when unterminated. A nested
    /// `/*` opener or a MySQL `/*!` conditional marker makes the comment
    /// `Evil`: both change what a downstream SQL engine would execute.
    fn lex_block_comment(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self.input.len();
        let body = &self.input[(start + 2).min(len)..];

        let (end, closed) = match memchr2(body, b'*', b'/') {
            Some(off) => (start + 2 + off + 2, true),
            None => (len, false),
        };

        let mut kind = TokenKind::Comment;
        if closed {
            let inner = &self.input[start + 2..end - 2];
            if memchr2(inner, b'/', b'*').is_some() {
                kind = TokenKind::Evil;
            }
        }
        if start + 2 < len && self.input[start + 2] == b'!' {
            kind = TokenKind::Evil;
        }

        let token = Token::new(kind, start, &self.input[start..end]);
        self.pos = end;
        token
    }

    fn lex_op1(&mut self) -> Token<'a> {
        self.single(TokenKind::Operator)
    }

    /// Two-character operator with maximal munch; `<=>` is the single
    /// three-character case. Falls back to a one-character operator.
    fn lex_op2(&mut self) -> Token<'a> {
        let pos = self.pos;
        let len = self.input.len();

        if pos + 2 < len && &self.input[pos..pos + 3] == b"<=>" {
            let token = Token::new(TokenKind::Operator, pos, &self.input[pos..pos + 3]);
            self.pos = pos + 3;
            return token;
        }

        if pos + 1 < len {
            let pair = &self.input[pos..pos + 2];
            if let Ok(text) = std::str::from_utf8(pair) {
                if let Some(kind) = self.lookup_word(text) {
                    if matches!(kind, TokenKind::Operator | TokenKind::LogicOperator) {
                        let token = Token::new(kind, pos, pair);
                        self.pos = pos + 2;
                        return token;
                    }
                }
            }
        }

        if self.input[pos] == b':' {
            self.single(TokenKind::Colon)
        } else {
            self.single(TokenKind::Operator)
        }
    }

    /// `( ) , ; { }` et al.: the byte is its own token kind.
    fn lex_punct(&mut self) -> Token<'a> {
        let kind = match self.input[self.pos] {
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            _ => TokenKind::Unknown,
        };
        self.single(kind)
    }

    fn lex_backslash(&mut self) -> Token<'a> {
        let pos = self.pos;
        // MySQL's "\N" alias for NULL.
        if pos + 1 < self.input.len() && self.input[pos + 1] == b'N' {
            let token = Token::new(TokenKind::Number, pos, &self.input[pos..pos + 2]);
            self.pos = pos + 2;
            token
        } else {
            self.single(TokenKind::Backslash)
        }
    }

    fn lex_unknown(&mut self) -> Token<'a> {
        self.single(TokenKind::Unknown)
    }

    fn single(&mut self, kind: TokenKind) -> Token<'a> {
        let pos = self.pos;
        let token = Token::new(kind, pos, &self.input[pos..pos + 1]);
        self.pos = pos + 1;
        token
    }

    // --- words, numbers, variables -----------------------------------------

    fn lex_word(&mut self) -> Token<'a> {
        const BOUNDARY: &[u8] =
            b" []{}<>:\\?=@!#~+-*/&|^%(),';\t\n\x0B\x0C\r\"\xA0\x00";

        let start = self.pos;
        let len = self.input.len();
        let mut end = start;
        while end < len && !BOUNDARY.contains(&self.input[end]) {
            end += 1;
        }
        let word = &self.input[start..end];

        // A dotted or backticked name like `version.core` may begin with a
        // keyword; emit the keyword alone and resume after it.
        for (i, &b) in word.iter().enumerate() {
            if b == b'.' || b == b'`' {
                if let Ok(head) = std::str::from_utf8(&word[..i]) {
                    if let Some(kind) = self.lookup_word(head) {
                        if kind != TokenKind::Bareword {
                            let token = Token::new(kind, start, &word[..i]);
                            self.pos = start + i;
                            return token;
                        }
                    }
                }
            }
        }

        let mut kind = TokenKind::Bareword;
        if word.len() < MAX_KEYWORD_LEN {
            if let Ok(text) = std::str::from_utf8(word) {
                if let Some(found) = self.lookup_word(text) {
                    kind = found;
                }
            }
        }

        let token = Token::new(kind, start, word);
        self.pos = end;
        token
    }

    /// T-SQL `[name]` quoted identifier, brackets included in the value.
    fn lex_bracket_word(&mut self) -> Token<'a> {
        let start = self.pos;
        let end = memchr(b']', &self.input[start + 1..])
            .map(|off| start + 1 + off + 1)
            .unwrap_or(self.input.len());
        let token = Token::new(TokenKind::Bareword, start, &self.input[start..end]);
        self.pos = end;
        token
    }

    /// Backtick-quoted identifier; function names keep their kind, anything
    /// else is a bareword.
    fn lex_tick(&mut self) -> Token<'a> {
        let mut token = self.lex_string_tail(self.pos, b'`', 1);
        token.kind = match std::str::from_utf8(&token.val)
            .ok()
            .and_then(|word| self.lookup_word(word))
        {
            Some(TokenKind::Function) => TokenKind::Function,
            _ => TokenKind::Bareword,
        };
        token
    }

    fn lex_variable(&mut self) -> Token<'a> {
        const BOUNDARY: &[u8] = b" <>:?=@!#~+-*/&|^%(),;'\t\n\x0B\x0C\r`\"";

        let start = self.pos;
        let len = self.input.len();
        let mut at = start + 1;
        let mut count = 1u8;
        if at < len && self.input[at] == b'@' {
            at += 1;
            count = 2;
        }

        if at < len {
            match self.input[at] {
                b'`' => {
                    self.pos = at;
                    let mut token = self.lex_tick();
                    token.kind = TokenKind::Variable;
                    token.count = count;
                    return token;
                }
                b'\'' | b'"' => {
                    self.pos = at;
                    let mut token = self.lex_string();
                    token.kind = TokenKind::Variable;
                    token.count = count;
                    return token;
                }
                _ => {}
            }
        }

        let mut end = at;
        while end < len && !BOUNDARY.contains(&self.input[end]) {
            end += 1;
        }

        // Bare "@"/"@@" still lexes as a variable, symbols included.
        let mut token = Token::new(TokenKind::Variable, start, &self.input[start..end]);
        token.count = count;
        self.pos = end;
        token
    }

    fn lex_money(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self.input.len();
        if start + 1 == len {
            return self.single_as(TokenKind::Bareword);
        }

        // "$1,000.00"
        let mut end = start + 1;
        while end < len && matches!(self.input[end], b'0'..=b'9' | b'.' | b',') {
            end += 1;
        }
        if end > start + 1 {
            if end == start + 2 && self.input[start + 1] == b'.' {
                return self.lex_word();
            }
            let token = Token::new(TokenKind::Number, start, &self.input[start..end]);
            self.pos = end;
            return token;
        }

        // "$$body$$"
        if self.input[start + 1] == b'$' {
            return self.lex_dollar_string(start + 1);
        }

        // "$tag$body$tag$"
        let mut tag_end = start + 1;
        while tag_end < len && self.input[tag_end].is_ascii_alphabetic() {
            tag_end += 1;
        }
        if tag_end > start + 1 && tag_end < len && self.input[tag_end] == b'$' {
            return self.lex_dollar_string(tag_end);
        }

        self.single_as(TokenKind::Bareword)
    }

    /// Dollar-quoted string whose opening tag runs `self.pos ..= tag_end`.
    fn lex_dollar_string(&mut self, tag_end: usize) -> Token<'a> {
        let len = self.input.len();
        let tag = &self.input[self.pos..=tag_end];
        let body = tag_end + 1;

        let mut at = body;
        while at + tag.len() <= len {
            if &self.input[at..at + tag.len()] == tag {
                let mut token = Token::new(TokenKind::String, body, &self.input[body..at]);
                token.str_open = b'$';
                token.str_close = b'$';
                self.pos = at + tag.len();
                return token;
            }
            at += 1;
        }

        let body = body.min(len);
        let mut token = Token::new(TokenKind::String, body, &self.input[body..]);
        token.str_open = b'$';
        token.str_close = 0;
        self.pos = len;
        token
    }

    fn single_as(&mut self, kind: TokenKind) -> Token<'a> {
        self.single(kind)
    }

    fn lex_number(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self.input.len();

        // 0x/0b prefixed literals.
        if self.input[start] == b'0' && start + 1 < len {
            let radix = self.input[start + 1] | 0x20;
            if radix == b'x' || radix == b'b' {
                let mut end = start + 2;
                while end < len {
                    let ok = if radix == b'x' {
                        self.input[end].is_ascii_hexdigit()
                    } else {
                        self.input[end] == b'0' || self.input[end] == b'1'
                    };
                    if !ok {
                        break;
                    }
                    end += 1;
                }
                let kind = if end == start + 2 {
                    TokenKind::Bareword // "0x" with no digits
                } else {
                    TokenKind::Number
                };
                let token = Token::new(kind, start, &self.input[start..end.max(start + 2)]);
                self.pos = end.max(start + 2);
                return token;
            }
        }

        let mut end = start;
        while end < len && self.input[end].is_ascii_digit() {
            end += 1;
        }

        if end < len && self.input[end] == b'.' {
            end += 1;
            while end < len && self.input[end].is_ascii_digit() {
                end += 1;
            }
            if end - start == 1 {
                // A lone '.' is the dot token, not a number.
                return self.single_as(TokenKind::Dot);
            }
        }

        let mut have_e = false;
        let mut have_exp = false;
        if end < len && (self.input[end] | 0x20) == b'e' {
            have_e = true;
            end += 1;
            if end < len && (self.input[end] == b'+' || self.input[end] == b'-') {
                end += 1;
            }
            while end < len && self.input[end].is_ascii_digit() {
                have_exp = true;
                end += 1;
            }
        }

        // Oracle float suffix: "1f", "2.5d" -- only when followed by a
        // boundary or a UNION-style keyword continuation.
        if end < len && matches!(self.input[end] | 0x20, b'd' | b'f') {
            let next = end + 1;
            if next == len
                || chars::is_white(self.input[next])
                || self.input[next] == b';'
                || (self.input[next] | 0x20) == b'u'
            {
                end += 1;
            }
        }

        let kind = if have_e && !have_exp {
            TokenKind::Bareword // "1e" with no exponent digits
        } else {
            TokenKind::Number
        };
        let token = Token::new(kind, start, &self.input[start..end]);
        self.pos = end;
        token
    }
}

// --- byte helpers ----------------------------------------------------------

fn memchr(needle: u8, haystack: &[u8]) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

/// First offset where `c0` is immediately followed by `c1`.
fn memchr2(haystack: &[u8], c0: u8, c1: u8) -> Option<usize> {
    if haystack.len() < 2 {
        return None;
    }
    (0..haystack.len() - 1).find(|&i| haystack[i] == c0 && haystack[i + 1] == c1)
}

/// True when the byte at `pos` is escaped by an odd run of backslashes
/// ending there.
fn backslash_escaped(input: &[u8], pos: usize) -> bool {
    let mut count = 0usize;
    let mut at = pos;
    loop {
        if input.get(at) != Some(&b'\\') {
            break;
        }
        count += 1;
        if at == 0 {
            break;
        }
        at -= 1;
    }
    count % 2 == 1
}

/// Doubled-delimiter escape (`''` inside a single-quoted string).
fn double_delim_at(input: &[u8], pos: usize) -> bool {
    pos + 1 < input.len() && input[pos] == input[pos + 1]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn tokens(input: &[u8]) -> Vec<Token<'_>> {
        let mut tokenizer = Tokenizer::new(input, SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
        let mut out = Vec::new();
        while let Some(t) = tokenizer.next_token() {
            out.push(t);
        }
        out
    }

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        tokens(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn classic_tautology() {
        assert_eq!(
            kinds(b"1 OR 1=1"),
            vec![
                TokenKind::Number,
                TokenKind::LogicOperator,
                TokenKind::Number,
                TokenKind::Operator,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn select_statement() {
        let ts = tokens(b"SELECT * FROM users");
        assert_eq!(ts[0].kind, TokenKind::Expression);
        assert_eq!(ts[1].kind, TokenKind::Operator);
        assert_eq!(ts[2].kind, TokenKind::Keyword);
        assert_eq!(ts[3].kind, TokenKind::Bareword);
        assert_eq!(ts[3].as_str(), "users");
    }

    #[test]
    fn strings_and_escapes() {
        let ts = tokens(b"'abc' 'a''b' 'x\\'y'");
        assert_eq!(ts.len(), 3);
        assert!(ts.iter().all(|t| t.kind == TokenKind::String));
        assert_eq!(ts[0].as_str(), "abc");
        assert_eq!(ts[1].as_str(), "a''b");
        assert_eq!(ts[2].as_str(), "x\\'y");
    }

    #[test]
    fn unterminated_string_reaches_end() {
        let ts = tokens(b"'unterminated");
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].kind, TokenKind::String);
        assert_eq!(ts[0].str_open, b'\'');
        assert_eq!(ts[0].str_close, 0);
        assert_eq!(ts[0].as_str(), "unterminated");
    }

    #[test]
    fn comments() {
        let ts = tokens(b"1 -- gone");
        assert_eq!(ts[1].kind, TokenKind::Comment);

        let ts = tokens(b"1 /* x */ 2");
        assert_eq!(ts[1].kind, TokenKind::Comment);
        assert_eq!(ts[2].kind, TokenKind::Number);

        // Unterminated block comment degrades, never hangs.
        let ts = tokens(b"1 /* open");
        assert_eq!(ts[1].kind, TokenKind::Comment);
    }

    #[test]
    fn evil_comments() {
        let ts = tokens(b"1 /*! mysql */ 2");
        assert_eq!(ts[1].kind, TokenKind::Evil);

        let ts = tokens(b"a /* x /* y */ b");
        assert_eq!(ts[1].kind, TokenKind::Evil);
    }

    #[test]
    fn dialect_dash_dash() {
        let ansi = SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI;
        let mysql = SqliFlags::QUOTE_NONE | SqliFlags::SQL_MYSQL;

        let mut t = Tokenizer::new(b"1--x", ansi);
        t.next_token();
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Comment);

        let mut t = Tokenizer::new(b"1--x", mysql);
        t.next_token();
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Operator);
        assert_eq!(t.stats.dash_dash_other, 1);
    }

    #[test]
    fn hash_dialects() {
        let mut t = Tokenizer::new(b"#x", SqliFlags::QUOTE_NONE | SqliFlags::SQL_MYSQL);
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Comment);
        assert_eq!(t.stats.hash, 1);

        let mut t = Tokenizer::new(b"#x", SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Operator);
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds(b"42"), vec![TokenKind::Number]);
        assert_eq!(kinds(b"3.14"), vec![TokenKind::Number]);
        assert_eq!(kinds(b"1e10"), vec![TokenKind::Number]);
        assert_eq!(kinds(b"0xdead"), vec![TokenKind::Number]);
        assert_eq!(kinds(b"0b101"), vec![TokenKind::Number]);
        // Broken exponent is a bareword, not a number.
        assert_eq!(kinds(b"1e"), vec![TokenKind::Bareword]);
    }

    #[test]
    fn variables_keep_at_signs() {
        for (input, expect) in [
            ("@", "@"),
            ("@@", "@@"),
            ("@version", "@version"),
            ("@@version", "@@version"),
        ] {
            let ts = tokens(input.as_bytes());
            assert_eq!(ts.len(), 1, "input {input:?}");
            assert_eq!(ts[0].kind, TokenKind::Variable);
            assert_eq!(ts[0].as_str(), expect);
        }
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(kinds(b"<>"), vec![TokenKind::Operator]);
        assert_eq!(kinds(b"<=>"), vec![TokenKind::Operator]);
        assert_eq!(kinds(b"||"), vec![TokenKind::LogicOperator]);
        assert_eq!(
            kinds(b"a:=1"),
            vec![TokenKind::Bareword, TokenKind::Operator, TokenKind::Number]
        );
    }

    #[test]
    fn quote_context_opens_string() {
        let mut t = Tokenizer::new(b"abc' OR 'x", SqliFlags::QUOTE_SINGLE | SqliFlags::SQL_ANSI);
        let first = t.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::String);
        assert_eq!(first.as_str(), "abc");
        assert_eq!(first.str_open, 0);
        assert_eq!(first.str_close, b'\'');
        assert_eq!(t.next_token().unwrap().kind, TokenKind::LogicOperator);
    }

    #[test]
    fn quote_context_backslash_before_doubling() {
        // In "\''" the first quote is backslash-escaped; the second one
        // closes the simulated string. Same precedence as inline strings.
        let mut t = Tokenizer::new(b"\\'' OR 1", SqliFlags::QUOTE_SINGLE | SqliFlags::SQL_ANSI);
        let first = t.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::String);
        assert_eq!(first.as_str(), "\\'");
        assert_eq!(first.str_close, b'\'');
        assert_eq!(t.next_token().unwrap().kind, TokenKind::LogicOperator);
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn lookup_override_reclassifies_words() {
        let lookup = |word: &str| {
            if word.eq_ignore_ascii_case("FROB") {
                Some(TokenKind::Function)
            } else {
                None
            }
        };
        let mut t = Tokenizer::new(b"FROB select", SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI)
            .with_lookup_fn(&lookup);
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Function);
        // The override replaces the static table entirely.
        assert_eq!(t.next_token().unwrap().kind, TokenKind::Bareword);
    }

    #[test]
    fn dollar_strings() {
        let ts = tokens(b"$$body$$");
        assert_eq!(ts[0].kind, TokenKind::String);
        assert_eq!(ts[0].as_str(), "body");

        let ts = tokens(b"$tag$body$tag$");
        assert_eq!(ts[0].kind, TokenKind::String);
        assert_eq!(ts[0].as_str(), "body");

        let ts = tokens(b"$3.50");
        assert_eq!(ts[0].kind, TokenKind::Number);
    }

    #[test]
    fn bracket_words_and_backslash() {
        let ts = tokens(b"[user name]");
        assert_eq!(ts[0].kind, TokenKind::Bareword);

        let ts = tokens(b"\\N");
        assert_eq!(ts[0].kind, TokenKind::Number);

        let ts = tokens(b"\\x");
        assert_eq!(ts[0].kind, TokenKind::Backslash);
    }

    #[test]
    fn every_input_terminates_with_full_coverage() {
        // Tokens never overlap and the cursor only moves forward.
        let nasty: &[&[u8]] = &[
            b"'''''''",
            b"/*/*/*/*",
            b"\x00\xFF\x80\x01",
            b"q'(",
            b"$tag$never closed",
            b"@@@@@@",
            b"0x 0b 1e :::",
        ];
        for input in nasty {
            let mut t = Tokenizer::new(input, SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
            let mut last_end = 0usize;
            let mut steps = 0usize;
            while let Some(token) = t.next_token() {
                assert!(token.pos >= last_end || token.is_empty());
                last_end = token.pos + token.len();
                steps += 1;
                assert!(steps <= input.len() + 1, "too many tokens for {input:?}");
            }
            assert!(t.position() <= input.len());
        }
    }

    #[test]
    fn bracket_word_unterminated() {
        let ts = tokens(b"[abc");
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].kind, TokenKind::Bareword);
    }
}
