//! Keyword, operator, and built-in function classification.
//!
//! One flat table maps uppercase SQL words (and a few two-word phrases the
//! folder merges) to token kinds. Anything absent lexes as a bareword.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::tokenizer::TokenKind;

static KEYWORDS: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();

#[rustfmt::skip]
static ENTRIES: &[(&str, TokenKind)] = &[
    // Statement starters and expression heads.
    ("SELECT", TokenKind::Expression),
    ("INSERT", TokenKind::Expression),
    ("UPDATE", TokenKind::Expression),
    ("DELETE", TokenKind::Expression),
    ("DROP", TokenKind::Expression),
    ("CREATE", TokenKind::Expression),
    ("ALTER", TokenKind::Expression),
    ("TRUNCATE", TokenKind::Expression),
    ("REPLACE", TokenKind::Expression),
    ("MERGE", TokenKind::Expression),
    ("SET", TokenKind::Expression),
    ("CASE", TokenKind::Expression),
    ("GRANT", TokenKind::Expression),
    ("REVOKE", TokenKind::Expression),
    ("SHUTDOWN", TokenKind::Expression),
    ("RENAME", TokenKind::Expression),
    ("CALL", TokenKind::Expression),
    ("DO", TokenKind::Expression),
    ("HANDLER", TokenKind::Expression),
    ("LOAD", TokenKind::Expression),

    // Set operations.
    ("UNION", TokenKind::Union),
    ("UNION ALL", TokenKind::Union),
    ("UNION DISTINCT", TokenKind::Union),
    ("INTERSECT", TokenKind::Union),
    ("EXCEPT", TokenKind::Union),
    ("MINUS", TokenKind::Union),

    // Clause groupers.
    ("GROUP BY", TokenKind::Group),
    ("ORDER BY", TokenKind::Group),
    ("OWN3D BY", TokenKind::Group),
    ("PARTITION BY", TokenKind::Group),

    // Logic connectives.
    ("AND", TokenKind::LogicOperator),
    ("OR", TokenKind::LogicOperator),
    ("XOR", TokenKind::LogicOperator),
    ("&&", TokenKind::LogicOperator),
    ("||", TokenKind::LogicOperator),

    // Word-form operators and merged phrases.
    ("NOT", TokenKind::Operator),
    ("LIKE", TokenKind::Operator),
    ("RLIKE", TokenKind::Operator),
    ("REGEXP", TokenKind::Operator),
    ("ILIKE", TokenKind::Operator),
    ("IS", TokenKind::Operator),
    ("IN", TokenKind::Operator),
    ("MOD", TokenKind::Operator),
    ("DIV", TokenKind::Operator),
    ("BETWEEN", TokenKind::Operator),
    ("ESCAPE", TokenKind::Operator),
    ("SIMILAR", TokenKind::Operator),
    ("SIMILAR TO", TokenKind::Operator),
    ("IS NOT", TokenKind::Operator),
    ("NOT IN", TokenKind::Operator),
    ("NOT LIKE", TokenKind::Operator),
    ("NOT BETWEEN", TokenKind::Operator),
    ("NOT SIMILAR", TokenKind::Operator),
    ("SOUNDS", TokenKind::Operator),
    ("SOUNDS LIKE", TokenKind::Operator),

    // Symbolic two-character operators; the lexer consults this table for
    // maximal munch.
    ("!=", TokenKind::Operator),
    ("<>", TokenKind::Operator),
    ("<=", TokenKind::Operator),
    (">=", TokenKind::Operator),
    ("==", TokenKind::Operator),
    (":=", TokenKind::Operator),
    ("<<", TokenKind::Operator),
    (">>", TokenKind::Operator),
    ("!<", TokenKind::Operator),
    ("!>", TokenKind::Operator),
    ("!!", TokenKind::Operator),
    ("|=", TokenKind::Operator),
    ("&=", TokenKind::Operator),
    ("^=", TokenKind::Operator),
    ("*=", TokenKind::Operator),
    ("+=", TokenKind::Operator),
    ("-=", TokenKind::Operator),
    ("/=", TokenKind::Operator),
    ("%=", TokenKind::Operator),

    // Generic keywords.
    ("FROM", TokenKind::Keyword),
    ("WHERE", TokenKind::Keyword),
    ("TABLE", TokenKind::Keyword),
    ("INTO", TokenKind::Keyword),
    ("VALUES", TokenKind::Keyword),
    ("HAVING", TokenKind::Keyword),
    ("LIMIT", TokenKind::Keyword),
    ("OFFSET", TokenKind::Keyword),
    ("JOIN", TokenKind::Keyword),
    ("INNER", TokenKind::Keyword),
    ("OUTER", TokenKind::Keyword),
    ("LEFT", TokenKind::Keyword),
    ("RIGHT", TokenKind::Keyword),
    ("CROSS", TokenKind::Keyword),
    ("NATURAL", TokenKind::Keyword),
    ("ON", TokenKind::Keyword),
    ("USING", TokenKind::Keyword),
    ("AS", TokenKind::Keyword),
    ("ALL", TokenKind::Keyword),
    ("ANY", TokenKind::Keyword),
    ("SOME", TokenKind::Keyword),
    ("DISTINCT", TokenKind::Keyword),
    ("TOP", TokenKind::Keyword),
    ("BY", TokenKind::Keyword),
    ("ORDER", TokenKind::Keyword),
    ("GROUP", TokenKind::Keyword),
    ("ASC", TokenKind::Keyword),
    ("DESC", TokenKind::Keyword),
    ("EXISTS", TokenKind::Keyword),
    ("WHEN", TokenKind::Keyword),
    ("THEN", TokenKind::Keyword),
    ("ELSE", TokenKind::Keyword),
    ("END", TokenKind::Keyword),
    ("BEGIN", TokenKind::Keyword),
    ("PROCEDURE", TokenKind::Keyword),
    ("FUNCTION", TokenKind::Keyword),
    ("RETURNS", TokenKind::Keyword),
    ("DEFAULT", TokenKind::Keyword),
    ("PRIMARY", TokenKind::Keyword),
    ("KEY", TokenKind::Keyword),
    ("INDEX", TokenKind::Keyword),
    ("CONSTRAINT", TokenKind::Keyword),
    ("FOREIGN", TokenKind::Keyword),
    ("REFERENCES", TokenKind::Keyword),
    ("CASCADE", TokenKind::Keyword),
    ("OUTFILE", TokenKind::Keyword),
    ("DUMPFILE", TokenKind::Keyword),
    ("INFILE", TokenKind::Keyword),
    ("INTO OUTFILE", TokenKind::Keyword),
    ("INTO DUMPFILE", TokenKind::Keyword),
    ("DATA", TokenKind::Keyword),
    ("FETCH", TokenKind::Keyword),
    ("FOR", TokenKind::Keyword),
    ("LOCK", TokenKind::Keyword),
    ("READ", TokenKind::Keyword),
    ("WRITE", TokenKind::Keyword),
    ("TO", TokenKind::Keyword),
    ("WITH", TokenKind::Keyword),
    ("RECURSIVE", TokenKind::Keyword),
    ("RETURNING", TokenKind::Keyword),
    ("IF EXISTS", TokenKind::Keyword),
    ("IF NOT", TokenKind::Keyword),
    ("PROCEDURE ANALYSE", TokenKind::Keyword),

    // Merged statement heads stay expression-typed.
    ("DROP TABLE", TokenKind::Expression),
    ("DROP DATABASE", TokenKind::Expression),
    ("ALTER TABLE", TokenKind::Expression),
    ("CREATE TABLE", TokenKind::Expression),
    ("DELETE FROM", TokenKind::Expression),
    ("INSERT INTO", TokenKind::Expression),
    ("SELECT DISTINCT", TokenKind::Expression),
    ("SELECT ALL", TokenKind::Expression),
    ("SELECT TOP", TokenKind::Expression),
    ("LOAD DATA", TokenKind::Expression),

    // T-SQL batch and procedural words.
    ("WAITFOR", TokenKind::Tsql),
    ("DECLARE", TokenKind::Tsql),
    ("EXEC", TokenKind::Tsql),
    ("EXECUTE", TokenKind::Tsql),
    ("GOTO", TokenKind::Tsql),
    ("PRINT", TokenKind::Tsql),
    ("USE", TokenKind::Tsql),
    ("BULK", TokenKind::Tsql),
    ("OPENQUERY", TokenKind::Tsql),
    ("OPENROWSET", TokenKind::Tsql),
    ("XP_CMDSHELL", TokenKind::Tsql),
    ("XP_EXECRESULTSET", TokenKind::Tsql),
    ("SP_EXECUTESQL", TokenKind::Tsql),
    ("SP_PASSWORD", TokenKind::Tsql),
    ("SP_HELP", TokenKind::Tsql),
    ("DBCC", TokenKind::Tsql),

    ("COLLATE", TokenKind::Collate),

    // SQL types. Mostly matter for fold rules that drop a leading type.
    ("INT", TokenKind::SqlType),
    ("INTEGER", TokenKind::SqlType),
    ("TINYINT", TokenKind::SqlType),
    ("SMALLINT", TokenKind::SqlType),
    ("MEDIUMINT", TokenKind::SqlType),
    ("BIGINT", TokenKind::SqlType),
    ("DECIMAL", TokenKind::SqlType),
    ("NUMERIC", TokenKind::SqlType),
    ("FLOAT", TokenKind::SqlType),
    ("DOUBLE", TokenKind::SqlType),
    ("REAL", TokenKind::SqlType),
    ("BIT", TokenKind::SqlType),
    ("BOOLEAN", TokenKind::SqlType),
    ("CHAR", TokenKind::SqlType),
    ("VARCHAR", TokenKind::SqlType),
    ("NCHAR", TokenKind::SqlType),
    ("NVARCHAR", TokenKind::SqlType),
    ("TEXT", TokenKind::SqlType),
    ("BLOB", TokenKind::SqlType),
    ("BINARY", TokenKind::SqlType),
    ("VARBINARY", TokenKind::SqlType),
    ("DATE", TokenKind::SqlType),
    ("DATETIME", TokenKind::SqlType),
    ("TIMESTAMP", TokenKind::SqlType),
    ("TIME", TokenKind::SqlType),
    ("YEAR", TokenKind::SqlType),
    ("ENUM", TokenKind::SqlType),
    ("UNSIGNED", TokenKind::SqlType),
    ("SIGNED", TokenKind::SqlType),
    ("ZEROFILL", TokenKind::SqlType),

    // Literals that behave like numbers.
    ("NULL", TokenKind::Number),
    ("TRUE", TokenKind::Number),
    ("FALSE", TokenKind::Number),
    ("CURRENT_DATE", TokenKind::Number),
    ("CURRENT_TIME", TokenKind::Number),
    ("CURRENT_TIMESTAMP", TokenKind::Number),
    ("CURRENT_USER", TokenKind::Number),
    ("LOCALTIME", TokenKind::Number),
    ("LOCALTIMESTAMP", TokenKind::Number),
    ("SESSION_USER", TokenKind::Number),
    ("SYSTEM_USER", TokenKind::Number),

    // Built-in functions commonly seen in probes.
    ("IF", TokenKind::Function),
    ("IFNULL", TokenKind::Function),
    ("NULLIF", TokenKind::Function),
    ("COALESCE", TokenKind::Function),
    ("CAST", TokenKind::Function),
    ("CONVERT", TokenKind::Function),
    ("CONCAT", TokenKind::Function),
    ("CONCAT_WS", TokenKind::Function),
    ("GROUP_CONCAT", TokenKind::Function),
    ("SUBSTR", TokenKind::Function),
    ("SUBSTRING", TokenKind::Function),
    ("MID", TokenKind::Function),
    ("ASCII", TokenKind::Function),
    ("ORD", TokenKind::Function),
    ("CHR", TokenKind::Function),
    ("HEX", TokenKind::Function),
    ("UNHEX", TokenKind::Function),
    ("LENGTH", TokenKind::Function),
    ("CHAR_LENGTH", TokenKind::Function),
    ("LOWER", TokenKind::Function),
    ("UPPER", TokenKind::Function),
    ("TRIM", TokenKind::Function),
    ("LTRIM", TokenKind::Function),
    ("RTRIM", TokenKind::Function),
    ("LPAD", TokenKind::Function),
    ("RPAD", TokenKind::Function),
    ("COUNT", TokenKind::Function),
    ("SUM", TokenKind::Function),
    ("AVG", TokenKind::Function),
    ("MIN", TokenKind::Function),
    ("MAX", TokenKind::Function),
    ("ABS", TokenKind::Function),
    ("CEIL", TokenKind::Function),
    ("FLOOR", TokenKind::Function),
    ("ROUND", TokenKind::Function),
    ("RAND", TokenKind::Function),
    ("PI", TokenKind::Function),
    ("POW", TokenKind::Function),
    ("POWER", TokenKind::Function),
    ("SQRT", TokenKind::Function),
    ("EXP", TokenKind::Function),
    ("LN", TokenKind::Function),
    ("LOG", TokenKind::Function),
    ("SLEEP", TokenKind::Function),
    ("BENCHMARK", TokenKind::Function),
    ("PG_SLEEP", TokenKind::Function),
    ("WAITFOR DELAY", TokenKind::Tsql),
    ("LOAD_FILE", TokenKind::Function),
    ("VERSION", TokenKind::Function),
    ("DATABASE", TokenKind::Function),
    ("SCHEMA", TokenKind::Function),
    ("USER", TokenKind::Function),
    ("UUID", TokenKind::Function),
    ("MD5", TokenKind::Function),
    ("SHA1", TokenKind::Function),
    ("SHA2", TokenKind::Function),
    ("CRC32", TokenKind::Function),
    ("COMPRESS", TokenKind::Function),
    ("UNCOMPRESS", TokenKind::Function),
    ("ENCODE", TokenKind::Function),
    ("DECODE", TokenKind::Function),
    ("AES_ENCRYPT", TokenKind::Function),
    ("AES_DECRYPT", TokenKind::Function),
    ("DES_ENCRYPT", TokenKind::Function),
    ("PASSWORD", TokenKind::Function),
    ("OLD_PASSWORD", TokenKind::Function),
    ("ENCRYPT", TokenKind::Function),
    ("EXTRACTVALUE", TokenKind::Function),
    ("UPDATEXML", TokenKind::Function),
    ("XMLTYPE", TokenKind::Function),
    ("UTL_HTTP", TokenKind::Function),
    ("UTL_INADDR", TokenKind::Function),
    ("DBMS_PIPE", TokenKind::Function),
    ("CTXSYS", TokenKind::Function),
    ("FOUND_ROWS", TokenKind::Function),
    ("ROW_COUNT", TokenKind::Function),
    ("LAST_INSERT_ID", TokenKind::Function),
    ("CONNECTION_ID", TokenKind::Function),
    ("GET_LOCK", TokenKind::Function),
    ("RELEASE_LOCK", TokenKind::Function),
    ("IS_FREE_LOCK", TokenKind::Function),
    ("INET_ATON", TokenKind::Function),
    ("INET_NTOA", TokenKind::Function),
    ("NOW", TokenKind::Function),
    ("SYSDATE", TokenKind::Function),
    ("CURDATE", TokenKind::Function),
    ("CURTIME", TokenKind::Function),
    ("DATEDIFF", TokenKind::Function),
    ("DATE_ADD", TokenKind::Function),
    ("DATE_SUB", TokenKind::Function),
    ("UNIX_TIMESTAMP", TokenKind::Function),
    ("FROM_UNIXTIME", TokenKind::Function),
    ("GREATEST", TokenKind::Function),
    ("LEAST", TokenKind::Function),
    ("STRCMP", TokenKind::Function),
    ("FIELD", TokenKind::Function),
    ("ELT", TokenKind::Function),
    ("MAKE_SET", TokenKind::Function),
    ("FIND_IN_SET", TokenKind::Function),
    ("INSTR", TokenKind::Function),
    ("LOCATE", TokenKind::Function),
    ("POSITION", TokenKind::Function),
    ("REVERSE", TokenKind::Function),
    ("REPEAT", TokenKind::Function),
    ("SPACE", TokenKind::Function),
    ("BIN", TokenKind::Function),
    ("OCT", TokenKind::Function),
    ("CONV", TokenKind::Function),
    ("RANDOMBLOB", TokenKind::Function),
    ("ZEROBLOB", TokenKind::Function),
    ("SQLITE_VERSION", TokenKind::Function),
    ("LOAD_EXTENSION", TokenKind::Function),
];

fn table() -> &'static HashMap<&'static str, TokenKind> {
    KEYWORDS.get_or_init(|| ENTRIES.iter().copied().collect())
}

/// Case-insensitive classification of a word or operator spelling.
/// Returns `None` for barewords.
pub fn lookup(word: &str) -> Option<TokenKind> {
    if word.is_empty() || word.len() >= super::tokenizer::MAX_KEYWORD_LEN {
        return None;
    }
    let upper = word.to_ascii_uppercase();
    table().get(upper.as_str()).copied()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn classification() {
        assert_eq!(lookup("select"), Some(TokenKind::Expression));
        assert_eq!(lookup("UNION"), Some(TokenKind::Union));
        assert_eq!(lookup("Or"), Some(TokenKind::LogicOperator));
        assert_eq!(lookup("sleep"), Some(TokenKind::Function));
        assert_eq!(lookup("varchar"), Some(TokenKind::SqlType));
        assert_eq!(lookup("null"), Some(TokenKind::Number));
        assert_eq!(lookup("xp_cmdshell"), Some(TokenKind::Tsql));
        assert_eq!(lookup("users"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn merged_phrases() {
        assert_eq!(lookup("UNION ALL"), Some(TokenKind::Union));
        assert_eq!(lookup("GROUP BY"), Some(TokenKind::Group));
        assert_eq!(lookup("NOT LIKE"), Some(TokenKind::Operator));
    }

    #[test]
    fn no_duplicate_entries() {
        let mut seen = std::collections::HashSet::new();
        for (word, _) in ENTRIES {
            assert!(seen.insert(*word), "duplicate entry {word}");
        }
    }
}
