//! Permissive HTML5 tokenizer.
//!
//! Follows the WHATWG tokenizer states loosely, with the browser quirks that
//! matter for injection detection kept on purpose: NUL bytes inside tag
//! names are skipped, `<%` opens an IE/old-Safari comment, backtick counts
//! as an attribute-value quote, and unterminated constructs run to end of
//! input instead of failing.

/// Where the scanned fragment is assumed to land in the surrounding markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlContext {
    /// Between tags.
    Data,
    /// Inside an unquoted attribute value.
    ValueNoQuote,
    /// Inside a single-quoted attribute value.
    ValueSingleQuote,
    /// Inside a double-quoted attribute value.
    ValueDoubleQuote,
    /// Inside a backtick-quoted attribute value (IE).
    ValueBackQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTokenType {
    DataText,
    TagNameOpen,
    TagNameClose,
    TagNameSelfClose,
    TagClose,
    AttrName,
    AttrValue,
    TagComment,
    Doctype,
}

type StateFn<'a> = fn(&mut Html5Tokenizer<'a>) -> bool;

/// Pull tokenizer. `next()` advances to the next token and returns false at
/// end of input; the current token is exposed through `token_type` and
/// `token()`.
pub struct Html5Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    state: StateFn<'a>,
    /// Active attribute-value delimiter while in a quoted-value state.
    quote: u8,
    is_close: bool,
    pub token_type: HtmlTokenType,
    token_start: usize,
    token_len: usize,
}

const EOF: i16 = -1;

impl<'a> Html5Tokenizer<'a> {
    pub fn new(input: &'a [u8], context: HtmlContext) -> Self {
        let (state, quote): (StateFn<'a>, u8) = match context {
            HtmlContext::Data => (Self::state_data, 0),
            HtmlContext::ValueNoQuote => (Self::state_before_attr_name, 0),
            HtmlContext::ValueSingleQuote => (Self::state_attr_value_quoted, b'\''),
            HtmlContext::ValueDoubleQuote => (Self::state_attr_value_quoted, b'"'),
            HtmlContext::ValueBackQuote => (Self::state_attr_value_quoted, b'`'),
        };
        Html5Tokenizer {
            input,
            pos: 0,
            state,
            quote,
            is_close: false,
            token_type: HtmlTokenType::DataText,
            token_start: 0,
            token_len: 0,
        }
    }

    pub fn next(&mut self) -> bool {
        (self.state)(self)
    }

    /// Bytes of the current token.
    pub fn token(&self) -> &'a [u8] {
        let end = (self.token_start + self.token_len).min(self.input.len());
        &self.input[self.token_start.min(end)..end]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn emit(&mut self, token_type: HtmlTokenType, start: usize, len: usize) {
        self.token_type = token_type;
        self.token_start = start;
        self.token_len = len;
    }

    fn byte(&self, at: usize) -> Option<u8> {
        self.input.get(at).copied()
    }

    fn find(&self, needle: u8, from: usize) -> Option<usize> {
        self.input[from.min(self.input.len())..]
            .iter()
            .position(|&b| b == needle)
            .map(|off| from + off)
    }

    /// HTML whitespace plus NUL, which old IE releases also skip. Returns
    /// the next significant byte as a signed value, EOF at end.
    fn skip_white(&mut self) -> i16 {
        while let Some(b) = self.byte(self.pos) {
            match b {
                0x00 | b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r' => self.pos += 1,
                other => return i16::from(other),
            }
        }
        EOF
    }

    fn is_white(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
    }

    fn is_ascii_alpha(b: u8) -> bool {
        b.is_ascii_alphabetic()
    }

    fn state_eof(&mut self) -> bool {
        false
    }

    fn state_data(&mut self) -> bool {
        let start = self.pos;
        match self.find(b'<', self.pos) {
            Some(lt) if lt > start => {
                self.emit(HtmlTokenType::DataText, start, lt - start);
                self.pos = lt;
                true
            }
            Some(lt) => {
                self.pos = lt + 1;
                self.state = Self::state_tag_open;
                self.next()
            }
            None => {
                if self.input.len() > start {
                    self.emit(HtmlTokenType::DataText, start, self.input.len() - start);
                    self.pos = self.input.len();
                    self.state = Self::state_eof;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn state_tag_open(&mut self) -> bool {
        let Some(b) = self.byte(self.pos) else {
            return false;
        };
        match b {
            b'!' => {
                self.pos += 1;
                self.state = Self::state_markup_declaration;
                self.next()
            }
            b'/' => {
                self.pos += 1;
                self.is_close = true;
                self.state = Self::state_end_tag_open;
                self.next()
            }
            b'?' => {
                self.pos += 1;
                self.state = Self::state_bogus_comment;
                self.next()
            }
            b'%' => {
                // IE <= 9 and old Safari treat <% ... %> as a comment.
                self.pos += 1;
                self.state = Self::state_percent_comment;
                self.next()
            }
            b if Self::is_ascii_alpha(b) || b == 0 => {
                // NUL in tag position is an IE-ism, treated as a name byte.
                self.state = Self::state_tag_name;
                self.next()
            }
            _ => {
                if self.pos == 0 {
                    self.state = Self::state_data;
                    return self.next();
                }
                // Stray '<' becomes text on its own.
                self.emit(HtmlTokenType::DataText, self.pos - 1, 1);
                self.state = Self::state_data;
                true
            }
        }
    }

    fn state_end_tag_open(&mut self) -> bool {
        let Some(b) = self.byte(self.pos) else {
            return false;
        };
        match b {
            b'>' => {
                self.state = Self::state_data;
                self.next()
            }
            b if Self::is_ascii_alpha(b) => {
                self.state = Self::state_tag_name;
                self.next()
            }
            _ => {
                self.is_close = false;
                self.state = Self::state_bogus_comment;
                self.next()
            }
        }
    }

    fn state_tag_name(&mut self) -> bool {
        let start = self.pos;
        while let Some(b) = self.byte(self.pos) {
            if b == 0 {
                // Embedded NULs stay inside the name; the matcher strips
                // them during comparison.
                self.pos += 1;
            } else if Self::is_white(b) {
                self.emit(HtmlTokenType::TagNameOpen, start, self.pos - start);
                self.pos += 1;
                self.state = Self::state_before_attr_name;
                return true;
            } else if b == b'/' {
                self.emit(HtmlTokenType::TagNameOpen, start, self.pos - start);
                self.pos += 1;
                self.state = Self::state_self_closing;
                return true;
            } else if b == b'>' {
                self.emit(HtmlTokenType::TagNameOpen, start, self.pos - start);
                if self.is_close {
                    self.pos += 1;
                    self.is_close = false;
                    self.token_type = HtmlTokenType::TagClose;
                    self.state = Self::state_data;
                } else {
                    self.state = Self::state_tag_close_char;
                }
                return true;
            } else {
                self.pos += 1;
            }
        }
        self.emit(HtmlTokenType::TagNameOpen, start, self.input.len() - start);
        self.state = Self::state_eof;
        true
    }

    /// Emit the '>' that ends an open tag as its own token.
    fn state_tag_close_char(&mut self) -> bool {
        self.is_close = false;
        self.emit(HtmlTokenType::TagNameClose, self.pos, 1);
        self.pos += 1;
        self.state = if self.pos < self.input.len() {
            Self::state_data
        } else {
            Self::state_eof
        };
        true
    }

    fn state_self_closing(&mut self) -> bool {
        let Some(b) = self.byte(self.pos) else {
            return false;
        };
        if b == b'>' && self.pos > 0 {
            self.emit(HtmlTokenType::TagNameSelfClose, self.pos - 1, 2);
            self.pos += 1;
            self.state = Self::state_data;
            true
        } else {
            self.state = Self::state_before_attr_name;
            self.next()
        }
    }

    fn state_before_attr_name(&mut self) -> bool {
        loop {
            match self.skip_white() {
                EOF => return false,
                0x2F => {
                    // '/': another slash before '>' just gets skipped.
                    self.pos += 1;
                    if self.byte(self.pos) != Some(b'>') && self.pos < self.input.len() {
                        continue;
                    }
                    return self.state_self_closing();
                }
                0x3E => {
                    // '>'
                    self.emit(HtmlTokenType::TagNameClose, self.pos, 1);
                    self.pos += 1;
                    self.state = Self::state_data;
                    return true;
                }
                _ => {
                    self.state = Self::state_attr_name;
                    return self.next();
                }
            }
        }
    }

    fn state_attr_name(&mut self) -> bool {
        let start = self.pos;
        let mut at = self.pos + 1;
        while let Some(b) = self.byte(at) {
            if Self::is_white(b) {
                self.emit(HtmlTokenType::AttrName, start, at - start);
                self.state = Self::state_after_attr_name;
                self.pos = at + 1;
                return true;
            } else if b == b'/' {
                self.emit(HtmlTokenType::AttrName, start, at - start);
                self.state = Self::state_self_closing;
                self.pos = at + 1;
                return true;
            } else if b == b'=' {
                self.emit(HtmlTokenType::AttrName, start, at - start);
                self.state = Self::state_before_attr_value;
                self.pos = at + 1;
                return true;
            } else if b == b'>' {
                self.emit(HtmlTokenType::AttrName, start, at - start);
                self.state = Self::state_tag_close_char;
                self.pos = at;
                return true;
            }
            at += 1;
        }
        self.emit(HtmlTokenType::AttrName, start, self.input.len() - start);
        self.pos = self.input.len();
        self.state = Self::state_eof;
        true
    }

    fn state_after_attr_name(&mut self) -> bool {
        match self.skip_white() {
            EOF => false,
            0x2F => {
                self.pos += 1;
                self.state_self_closing()
            }
            0x3D => {
                // '='
                self.pos += 1;
                self.state_before_attr_value()
            }
            0x3E => self.state_tag_close_char(),
            _ => self.state_attr_name(),
        }
    }

    fn state_before_attr_value(&mut self) -> bool {
        match self.skip_white() {
            EOF => {
                self.state = Self::state_eof;
                false
            }
            0x22 => {
                self.quote = b'"';
                self.state_attr_value_quoted()
            }
            0x27 => {
                self.quote = b'\'';
                self.state_attr_value_quoted()
            }
            0x60 => {
                self.quote = b'`';
                self.state_attr_value_quoted()
            }
            _ => self.state_attr_value_no_quote(),
        }
    }

    /// Value delimited by `self.quote`. When entered at position zero the
    /// opening quote is simulated by the scan context and is not consumed.
    fn state_attr_value_quoted(&mut self) -> bool {
        if self.pos > 0 {
            self.pos += 1;
        }
        let start = self.pos;
        match self.find(self.quote, self.pos) {
            Some(close) => {
                self.emit(HtmlTokenType::AttrValue, start, close - start);
                self.pos = close + 1;
                self.state = Self::state_after_quoted_value;
            }
            None => {
                self.emit(HtmlTokenType::AttrValue, start, self.input.len() - start);
                self.pos = self.input.len();
                self.state = Self::state_eof;
            }
        }
        true
    }

    fn state_attr_value_no_quote(&mut self) -> bool {
        let start = self.pos;
        while let Some(b) = self.byte(self.pos) {
            if Self::is_white(b) {
                self.emit(HtmlTokenType::AttrValue, start, self.pos - start);
                self.pos += 1;
                self.state = Self::state_before_attr_name;
                return true;
            } else if b == b'>' {
                self.emit(HtmlTokenType::AttrValue, start, self.pos - start);
                self.state = Self::state_tag_close_char;
                return true;
            }
            self.pos += 1;
        }
        self.emit(HtmlTokenType::AttrValue, start, self.input.len() - start);
        self.state = Self::state_eof;
        true
    }

    fn state_after_quoted_value(&mut self) -> bool {
        let Some(b) = self.byte(self.pos) else {
            return false;
        };
        if Self::is_white(b) {
            self.pos += 1;
            self.state_before_attr_name()
        } else if b == b'/' {
            self.pos += 1;
            self.state_self_closing()
        } else if b == b'>' {
            self.emit(HtmlTokenType::TagNameClose, self.pos, 1);
            self.pos += 1;
            self.state = Self::state_data;
            true
        } else {
            self.state_before_attr_name()
        }
    }

    fn state_markup_declaration(&mut self) -> bool {
        if self.byte(self.pos) == Some(b'-') && self.byte(self.pos + 1) == Some(b'-') {
            self.pos += 2;
            self.state = Self::state_comment;
            return self.next();
        }
        if self.pos + 7 <= self.input.len() {
            let head = &self.input[self.pos..self.pos + 7];
            if head.eq_ignore_ascii_case(b"DOCTYPE") {
                self.state = Self::state_doctype;
                return self.next();
            }
            if head == b"[CDATA[" {
                self.pos += 7;
                self.state = Self::state_cdata;
                return self.next();
            }
        }
        self.state = Self::state_bogus_comment;
        self.next()
    }

    fn state_doctype(&mut self) -> bool {
        let start = self.pos;
        match self.find(b'>', self.pos) {
            Some(gt) => {
                self.emit(HtmlTokenType::Doctype, start, gt - start);
                self.pos = gt + 1;
                self.state = Self::state_data;
            }
            None => {
                self.emit(HtmlTokenType::Doctype, start, self.input.len() - start);
                self.pos = self.input.len();
                self.state = Self::state_eof;
            }
        }
        true
    }

    /// `<!-- ... -->`, accepting the IE variants `--!>` and NULs between the
    /// closing dashes.
    fn state_comment(&mut self) -> bool {
        let start = self.pos;
        match self.find_comment_end(self.pos) {
            Some((end, skip)) => {
                self.emit(HtmlTokenType::TagComment, start, end - start);
                self.pos = end + skip;
                self.state = Self::state_data;
            }
            None => {
                self.emit(HtmlTokenType::TagComment, start, self.input.len() - start);
                self.pos = self.input.len();
                self.state = Self::state_eof;
            }
        }
        true
    }

    fn find_comment_end(&self, from: usize) -> Option<(usize, usize)> {
        let len = self.input.len();
        let mut at = from;
        while at + 2 < len {
            let Some(dash) = self.find(b'-', at) else {
                return None;
            };
            if dash + 2 >= len {
                return None;
            }
            let mut offset = 1;
            while dash + offset < len && self.input[dash + offset] == 0 {
                offset += 1;
            }
            if dash + offset >= len {
                return None;
            }
            let second = self.input[dash + offset];
            if second != b'-' && second != b'!' {
                at = dash + 1;
                continue;
            }
            offset += 1;
            if dash + offset >= len {
                return None;
            }
            if self.input[dash + offset] == b'>' {
                return Some((dash, offset + 1));
            }
            at = dash + 1;
        }
        None
    }

    fn state_bogus_comment(&mut self) -> bool {
        let start = self.pos;
        match self.find(b'>', self.pos) {
            Some(gt) => {
                self.emit(HtmlTokenType::TagComment, start, gt - start);
                self.pos = gt + 1;
                self.state = Self::state_data;
            }
            None => {
                self.emit(HtmlTokenType::TagComment, start, self.input.len() - start);
                self.pos = self.input.len();
                self.state = Self::state_eof;
            }
        }
        true
    }

    /// `<% ... %>`.
    fn state_percent_comment(&mut self) -> bool {
        let start = self.pos;
        let mut at = self.pos;
        while let Some(percent) = self.find(b'%', at) {
            if self.byte(percent + 1) == Some(b'>') {
                self.emit(HtmlTokenType::TagComment, start, percent - start);
                self.pos = percent + 2;
                self.state = Self::state_data;
                return true;
            }
            at = percent + 1;
        }
        self.emit(HtmlTokenType::TagComment, start, self.input.len() - start);
        self.pos = self.input.len();
        self.state = Self::state_eof;
        true
    }

    fn state_cdata(&mut self) -> bool {
        let start = self.pos;
        let len = self.input.len();
        let mut end = None;
        if len >= 3 {
            for i in start..len - 2 {
                if &self.input[i..i + 3] == b"]]>" {
                    end = Some(i);
                    break;
                }
            }
        }
        match end {
            Some(i) => {
                self.emit(HtmlTokenType::DataText, start, i - start);
                self.pos = i + 3;
                self.state = Self::state_data;
            }
            None => {
                self.emit(HtmlTokenType::DataText, start, len - start);
                self.pos = len;
                self.state = Self::state_eof;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn all_tokens(input: &[u8], context: HtmlContext) -> Vec<(HtmlTokenType, Vec<u8>)> {
        let mut t = Html5Tokenizer::new(input, context);
        let mut out = Vec::new();
        while t.next() {
            out.push((t.token_type, t.token().to_vec()));
        }
        out
    }

    #[test]
    fn plain_tag() {
        let tokens = all_tokens(b"<script>alert(1)</script>", HtmlContext::Data);
        assert_eq!(tokens[0], (HtmlTokenType::TagNameOpen, b"script".to_vec()));
        assert_eq!(tokens[1].0, HtmlTokenType::TagNameClose);
        assert_eq!(tokens[2], (HtmlTokenType::DataText, b"alert(1)".to_vec()));
        assert_eq!(tokens[3], (HtmlTokenType::TagClose, b"script".to_vec()));
    }

    #[test]
    fn attributes() {
        let tokens = all_tokens(b"<a href='x' onclick=go>", HtmlContext::Data);
        let kinds: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                HtmlTokenType::TagNameOpen,
                HtmlTokenType::AttrName,
                HtmlTokenType::AttrValue,
                HtmlTokenType::AttrName,
                HtmlTokenType::AttrValue,
                HtmlTokenType::TagNameClose,
            ]
        );
        assert_eq!(tokens[1].1, b"href");
        assert_eq!(tokens[2].1, b"x");
        assert_eq!(tokens[3].1, b"onclick");
        assert_eq!(tokens[4].1, b"go");
    }

    #[test]
    fn quoted_value_context_opens_mid_value() {
        // The fragment continues an attribute value that was opened by the
        // surrounding document.
        let tokens = all_tokens(b"x' onerror='alert(1)", HtmlContext::ValueSingleQuote);
        assert_eq!(tokens[0], (HtmlTokenType::AttrValue, b"x".to_vec()));
        assert!(tokens
            .iter()
            .any(|(k, v)| *k == HtmlTokenType::AttrName && v == b"onerror"));
    }

    #[test]
    fn comments() {
        let tokens = all_tokens(b"<!-- hi -->after", HtmlContext::Data);
        assert_eq!(tokens[0].0, HtmlTokenType::TagComment);
        assert_eq!(tokens[1], (HtmlTokenType::DataText, b"after".to_vec()));

        let tokens = all_tokens(b"<?php echo ?>x", HtmlContext::Data);
        assert_eq!(tokens[0].0, HtmlTokenType::TagComment);

        let tokens = all_tokens(b"<% asp %>x", HtmlContext::Data);
        assert_eq!(tokens[0].0, HtmlTokenType::TagComment);
    }

    #[test]
    fn doctype_token() {
        let tokens = all_tokens(b"<!DOCTYPE html>", HtmlContext::Data);
        assert_eq!(tokens[0].0, HtmlTokenType::Doctype);
    }

    #[test]
    fn cdata_is_text() {
        let tokens = all_tokens(b"<![CDATA[<script>]]>", HtmlContext::Data);
        assert_eq!(tokens[0], (HtmlTokenType::DataText, b"<script>".to_vec()));
    }

    #[test]
    fn nul_in_tag_name_kept() {
        let tokens = all_tokens(b"<scr\x00ipt>", HtmlContext::Data);
        assert_eq!(tokens[0].0, HtmlTokenType::TagNameOpen);
        assert_eq!(tokens[0].1, b"scr\x00ipt");
    }

    #[test]
    fn unterminated_constructs() {
        let inputs: [&[u8]; 5] = [
            b"<script",
            b"<!-- never closed",
            b"<a href='x",
            b"<![CDATA[ open",
            b"<!DOCTYPE",
        ];
        for input in inputs {
            let mut t = Html5Tokenizer::new(input, HtmlContext::Data);
            let mut steps = 0;
            while t.next() {
                steps += 1;
                assert!(steps < 100);
            }
        }
    }

    #[test]
    fn stray_lt_is_text() {
        let tokens = all_tokens(b"a < b", HtmlContext::Data);
        assert!(tokens
            .iter()
            .all(|(k, _)| *k == HtmlTokenType::DataText));
    }
}
