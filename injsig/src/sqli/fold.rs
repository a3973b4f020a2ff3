//! Token folding: collapse a token stream into at most five tokens that
//! preserve the syntactic shape attackers cannot avoid.
//!
//! The folder pulls tokens lazily, keeps a small working window, and applies
//! two- and three-token rewrite rules until the window stabilizes. A step
//! ceiling bounds the loop independently of input pathology.

use smallvec::SmallVec;
use std::borrow::Cow;

use super::keywords;
use super::tokenizer::{LookupFn, Token, TokenKind, Tokenizer};

/// Window size; also the maximum fingerprint length.
pub const MAX_TOKENS: usize = 5;

/// Upper bound on fold-loop iterations. Generous: each iteration either
/// consumes input or shrinks the window.
const MAX_FOLD_STEPS: usize = 4096;

/// Output of one fold pass.
pub struct Folded<'a> {
    pub tokens: SmallVec<[Token<'a>; 8]>,
    /// Raw tokens produced by the lexer before folding, comments included.
    pub total_tokens: u32,
    pub folds: u32,
}

/// `+`, `-`, `!`, `~`, `!!`, and word-form `NOT`.
pub fn is_unary_operator(token: &Token<'_>) -> bool {
    if token.kind != TokenKind::Operator {
        return false;
    }
    match token.val.as_ref() {
        [b'+'] | [b'-'] | [b'!'] | [b'~'] => true,
        [b'!', b'!'] => true,
        word => word.eq_ignore_ascii_case(b"NOT"),
    }
}

fn is_word_like(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword
            | TokenKind::Bareword
            | TokenKind::Operator
            | TokenKind::Union
            | TokenKind::Function
            | TokenKind::Expression
            | TokenKind::Tsql
            | TokenKind::SqlType
    )
}

fn is_value_like(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Bareword | TokenKind::Number | TokenKind::String | TokenKind::Variable
    )
}

/// Merge two adjacent word tokens when their joined spelling is itself a
/// known phrase ("UNION ALL", "ORDER BY", "NOT LIKE"). The merged token owns
/// a normalized value: the two spellings joined by a single space.
fn merge_words<'a>(
    lookup: Option<&LookupFn>,
    a: &Token<'a>,
    b: &Token<'a>,
) -> Option<Token<'a>> {
    if !is_word_like(a.kind) || !is_word_like(b.kind) {
        return None;
    }
    let key = format!(
        "{} {}",
        a.as_str().to_ascii_uppercase(),
        b.as_str().to_ascii_uppercase()
    );
    let kind = match lookup {
        Some(lookup) => lookup(&key),
        None => keywords::lookup(&key),
    }?;

    let mut joined = Vec::with_capacity(a.len() + 1 + b.len());
    joined.extend_from_slice(&a.val);
    joined.push(b' ');
    joined.extend_from_slice(&b.val);

    Some(Token {
        kind,
        pos: a.pos,
        val: Cow::Owned(joined),
        str_open: 0,
        str_close: 0,
        count: 0,
    })
}

/// Run the lexer to exhaustion, folding as tokens arrive. Always terminates.
pub fn fold<'a>(tokenizer: &mut Tokenizer<'a>) -> Folded<'a> {
    let lookup = tokenizer.lookup_override();
    let mut vec: SmallVec<[Token<'a>; 8]> = SmallVec::new();
    let mut total: u32 = 0;
    let mut folds: u32 = 0;
    let mut last_comment: Option<Token<'a>> = None;

    let mut next = |total: &mut u32| -> Option<Token<'a>> {
        let token = tokenizer.next_token()?;
        *total += 1;
        Some(token)
    };

    let store = |vec: &mut SmallVec<[Token<'a>; 8]>, at: usize, token: Token<'a>| {
        if at < vec.len() {
            vec[at] = token;
        } else {
            vec.push(token);
        }
    };

    // Skip leading comments, left-parens, sql types, and unary operators:
    // none of them change what the rest of the input can be.
    let mut more = true;
    loop {
        match next(&mut total) {
            Some(token) => {
                let skip = matches!(
                    token.kind,
                    TokenKind::Comment | TokenKind::LeftParen | TokenKind::SqlType
                ) || is_unary_operator(&token);
                if !skip {
                    store(&mut vec, 0, token);
                    break;
                }
            }
            None => {
                more = false;
                break;
            }
        }
    }
    if !more {
        return Folded {
            tokens: SmallVec::new(),
            total_tokens: total,
            folds,
        };
    }

    let mut pos: usize = 1;
    let mut left: usize = 0;

    for _ in 0..MAX_FOLD_STEPS {
        // A full window of five tokens occasionally matches a shape that is
        // pure repetition, e.g. "1,(1,(1,(1,(1,(". Reset the window so the
        // fingerprint reflects the repeating unit rather than the prefix.
        if pos >= MAX_TOKENS && vec.len() >= MAX_TOKENS {
            let k = |i: usize| vec[i].kind;
            let repetitive = (k(0) == TokenKind::Number
                && (k(1) == TokenKind::Operator || k(1) == TokenKind::Comma)
                && k(2) == TokenKind::LeftParen
                && k(3) == TokenKind::Number
                && (k(4) == TokenKind::Operator || k(4) == TokenKind::Comma))
                || (k(0) == TokenKind::Bareword
                    && k(1) == TokenKind::Operator
                    && k(2) == TokenKind::LeftParen
                    && (k(3) == TokenKind::Bareword || k(3) == TokenKind::Number))
                || (k(0) == TokenKind::Number
                    && k(1) == TokenKind::RightParen
                    && k(2) == TokenKind::Comma
                    && k(3) == TokenKind::LeftParen
                    && k(4) == TokenKind::Number)
                || (k(0) == TokenKind::Bareword
                    && k(1) == TokenKind::RightParen
                    && k(2) == TokenKind::Operator
                    && k(3) == TokenKind::LeftParen
                    && k(4) == TokenKind::Bareword);
            if repetitive {
                if pos > MAX_TOKENS {
                    let tail = vec[MAX_TOKENS].clone();
                    vec[1] = tail;
                    pos = 2;
                } else {
                    pos = 1;
                }
                left = 0;
            }
        }

        if !more || left >= MAX_TOKENS {
            break;
        }

        // Pull tokens until two sit to the right of `left`. Comments do not
        // enter the window; the last one is remembered and re-appended.
        while more && pos <= MAX_TOKENS && pos - left < 2 {
            match next(&mut total) {
                Some(token) => {
                    if token.kind == TokenKind::Comment {
                        last_comment = Some(token);
                    } else {
                        last_comment = None;
                        store(&mut vec, pos, token);
                        pos += 1;
                    }
                }
                None => more = false,
            }
        }

        if pos - left < 2 {
            left = pos;
            continue;
        }

        // Two-token rules.
        let (k1, k2) = (vec[left].kind, vec[left + 1].kind);
        if k1 == TokenKind::String && k2 == TokenKind::String {
            pos -= 1;
            folds += 1;
            continue;
        } else if k1 == TokenKind::Semicolon && k2 == TokenKind::Semicolon {
            pos -= 1;
            folds += 1;
            continue;
        } else if matches!(k1, TokenKind::Operator | TokenKind::LogicOperator)
            && (is_unary_operator(&vec[left + 1]) || k2 == TokenKind::SqlType)
        {
            pos -= 1;
            folds += 1;
            left = 0;
            continue;
        } else if k1 == TokenKind::LeftParen && is_unary_operator(&vec[left + 1]) {
            pos -= 1;
            folds += 1;
            if left > 0 {
                left -= 1;
            }
            continue;
        } else if let Some(merged) = merge_words(lookup, &vec[left], &vec[left + 1]) {
            vec[left] = merged;
            pos -= 1;
            folds += 1;
            if left > 0 {
                left -= 1;
            }
            continue;
        } else if k1 == TokenKind::Semicolon
            && k2 == TokenKind::Function
            && vec[left + 1].val.eq_ignore_ascii_case(b"IF")
        {
            // "; IF(...)" reads like a T-SQL control statement.
            vec[left + 1].kind = TokenKind::Tsql;
            continue;
        }

        // Pull a third token.
        while more && pos <= MAX_TOKENS && pos - left < 3 {
            match next(&mut total) {
                Some(token) => {
                    if token.kind == TokenKind::Comment {
                        last_comment = Some(token);
                    } else {
                        last_comment = None;
                        store(&mut vec, pos, token);
                        pos += 1;
                    }
                }
                None => more = false,
            }
        }
        if pos - left < 3 {
            left = pos;
            continue;
        }

        // Three-token rules.
        let (k1, k2, k3) = (vec[left].kind, vec[left + 1].kind, vec[left + 2].kind);
        if k1 == TokenKind::Number && k2 == TokenKind::Operator && k3 == TokenKind::Number {
            pos -= 2;
            left = 0;
            folds += 1;
            continue;
        } else if k1 == TokenKind::Operator
            && k2 != TokenKind::LeftParen
            && k3 == TokenKind::Operator
        {
            pos -= 2;
            left = 0;
            folds += 1;
            continue;
        } else if k1 == TokenKind::LogicOperator && k3 == TokenKind::LogicOperator {
            pos -= 2;
            left = 0;
            folds += 1;
            continue;
        } else if is_value_like(k1) && k2 == TokenKind::Comma && is_value_like(k3) {
            pos -= 2;
            left = 0;
            folds += 1;
            continue;
        }

        left += 1;
    }

    vec.truncate(pos.min(MAX_TOKENS).min(vec.len()));

    // A trailing comment is part of the shape: "1=1 --" must fingerprint
    // differently from "1=1".
    if let Some(comment) = last_comment {
        if vec.len() < MAX_TOKENS {
            vec.push(comment);
        }
    }

    Folded {
        tokens: vec,
        total_tokens: total,
        folds,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::sqli::SqliFlags;

    fn fold_codes(input: &[u8]) -> String {
        let mut t = Tokenizer::new(input, SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
        let folded = fold(&mut t);
        folded
            .tokens
            .iter()
            .map(|tok| tok.kind.code() as char)
            .collect()
    }

    #[test]
    fn tautology_folds_comparison() {
        // "1=1" collapses to a single number.
        assert_eq!(fold_codes(b"1 OR 1=1"), "1&1");
        assert_eq!(fold_codes(b"2 OR 2=2"), "1&1");
    }

    #[test]
    fn string_tautology() {
        assert_eq!(fold_codes(b"'a' OR 'a'='a'"), "s&sos");
    }

    #[test]
    fn adjacent_strings_merge() {
        assert_eq!(fold_codes(b"'a' 'b' 'c'"), "s");
    }

    #[test]
    fn union_all_merges() {
        assert_eq!(fold_codes(b"1 UNION ALL SELECT"), "1UE");
        assert_eq!(fold_codes(b"1 ORDER BY 2"), "1B1");
    }

    #[test]
    fn leading_noise_skipped() {
        assert_eq!(fold_codes(b"-1 UNION SELECT"), "1UE");
        assert_eq!(fold_codes(b"(((1"), "1");
    }

    #[test]
    fn trailing_comment_kept() {
        assert_eq!(fold_codes(b"1 OR 1=1 -- x"), "1&1c");
        assert_eq!(fold_codes(b"hello -- bye"), "nc");
    }

    #[test]
    fn value_lists_collapse() {
        assert_eq!(fold_codes(b"1,2,3,4,5"), "1");
    }

    #[test]
    fn unary_after_operator_dropped() {
        assert_eq!(fold_codes(b"1 + -1"), "1");
    }

    #[test]
    fn fold_count_reported() {
        let mut t = Tokenizer::new(b"1 OR 1=1", SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
        let folded = fold(&mut t);
        assert_eq!(folded.total_tokens, 5);
        assert!(folded.folds >= 1);
    }

    #[test]
    fn benign_word_pair() {
        assert_eq!(fold_codes(b"hello world"), "nn");
        assert_eq!(fold_codes(b"sexy and 17"), "n&1");
    }

    #[test]
    fn folding_reaches_a_fixed_point() {
        // Rebuilding an input from the folded tokens and folding again
        // must not reduce any further.
        let inputs: &[&[u8]] = &[
            b"1 OR 1=1",
            b"1 UNION ALL SELECT",
            b"1,2,3,4,5",
            b"a = b AND c",
            b"1 + -1",
            b"SELECT name FROM users WHERE id",
            b"1 OR 1=1 -- tail",
        ];
        for input in inputs {
            let mut t = Tokenizer::new(input, SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
            let first = fold(&mut t);

            let mut rebuilt: Vec<u8> = Vec::new();
            for token in &first.tokens {
                if !rebuilt.is_empty() {
                    rebuilt.push(b' ');
                }
                rebuilt.extend_from_slice(&token.val);
            }

            let mut t = Tokenizer::new(&rebuilt, SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI);
            let second = fold(&mut t);
            let codes = |folded: &Folded<'_>| -> String {
                folded
                    .tokens
                    .iter()
                    .map(|tok| tok.kind.code() as char)
                    .collect()
            };
            assert_eq!(codes(&first), codes(&second), "input {input:?}");
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(fold_codes(b""), "");
        assert_eq!(fold_codes(b"   "), "");
    }
}
