use serde::{Deserialize, Serialize};

/// Keywords that can never be used as an unquoted identifier.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "ALL",
    "AND",
    "ANY",
    "ARRAY",
    "AS",
    "ASC",
    "ASSERT_ROWS_MODIFIED",
    "AT",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "COLLATE",
    "CONTAINS",
    "CREATE",
    "CROSS",
    "CUBE",
    "CURRENT",
    "DEFAULT",
    "DEFINE",
    "DESC",
    "DISTINCT",
    "ELSE",
    "END",
    "ENUM",
    "ESCAPE",
    "EXCEPT",
    "EXCLUDE",
    "EXISTS",
    "EXTRACT",
    "FALSE",
    "FETCH",
    "FOLLOWING",
    "FOR",
    "FROM",
    "FULL",
    "GROUP",
    "GROUPING",
    "GROUPS",
    "HASH",
    "HAVING",
    "IF",
    "IGNORE",
    "IN",
    "INNER",
    "INTERSECT",
    "INTERVAL",
    "INTO",
    "IS",
    "JOIN",
    "LATERAL",
    "LEFT",
    "LIKE",
    "LIMIT",
    "LOOKUP",
    "MERGE",
    "NATURAL",
    "NEW",
    "NO",
    "NOT",
    "NULL",
    "NULLS",
    "OF",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "OVER",
    "PARTITION",
    "PRECEDING",
    "PROTO",
    "QUALIFY",
    "RANGE",
    "RECURSIVE",
    "RESPECT",
    "RIGHT",
    "ROLLUP",
    "ROWS",
    "SELECT",
    "SET",
    "SOME",
    "STRUCT",
    "TABLESAMPLE",
    "THEN",
    "TO",
    "TREAT",
    "TRUE",
    "UNBOUNDED",
    "UNION",
    "UNNEST",
    "USING",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
    "WITHIN",
];

/// One lexeme with its 1-based source position.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub literal: String,
}

impl Token {
    pub fn new(line: usize, column: usize, literal: impl Into<String>) -> Self {
        Self {
            line,
            column,
            literal: literal.into(),
        }
    }

    /// Sentinel closing a token stream. It sorts after every real position.
    pub fn eof() -> Self {
        Self {
            line: usize::MAX,
            column: usize::MAX,
            literal: String::new(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.line == usize::MAX
    }

    /// Case-insensitive comparison with a keyword or symbol.
    pub fn is(&self, literal: &str) -> bool {
        self.literal.eq_ignore_ascii_case(literal)
    }

    pub fn in_(&self, literals: &[&str]) -> bool {
        literals.iter().any(|l| self.is(l))
    }

    pub fn is_reserved_keyword(&self) -> bool {
        self.in_(RESERVED_KEYWORDS)
    }

    fn quoted_by(&self, ch: char) -> bool {
        self.literal.chars().count() >= 2
            && self.literal.starts_with(ch)
            && self.literal.ends_with(ch)
    }

    pub fn is_string(&self) -> bool {
        self.quoted_by('\'') || self.quoted_by('"')
    }

    pub fn is_backquoted(&self) -> bool {
        self.quoted_by('`')
    }

    pub fn is_identifier(&self) -> bool {
        if self.is_backquoted() {
            return true;
        }
        if self.is_reserved_keyword() {
            return false;
        }
        let mut chars = self.literal.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// `1`, `1.5`, `.5`, `1e10`, `1.5E-3`, `0x1F`
    pub fn is_numeric(&self) -> bool {
        let s = self.literal.as_str();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
        }
        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };
        let all_digits = |t: &str| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit());
        let mantissa_ok = match mantissa.split_once('.') {
            Some((int, frac)) => (int.is_empty() || all_digits(int)) && all_digits(frac),
            None => all_digits(mantissa),
        };
        let exponent_ok = exponent.is_none_or(|e| {
            all_digits(e.strip_prefix(['+', '-']).unwrap_or(e))
        });
        mantissa_ok && exponent_ok
    }

    pub fn is_boolean(&self) -> bool {
        self.in_(&["TRUE", "FALSE"])
    }

    pub fn is_null(&self) -> bool {
        self.is("NULL")
    }

    pub fn is_parameter(&self) -> bool {
        self.literal == "?" || (self.literal.starts_with('@') && self.literal.len() > 1)
    }

    pub fn is_comment(&self) -> bool {
        self.literal.starts_with('#')
            || self.literal.starts_with("--")
            || self.literal.starts_with("/*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(literal: &str) -> Token {
        Token::new(1, 1, literal)
    }

    #[test]
    fn identifiers() {
        assert!(tok("col").is_identifier());
        assert!(tok("_col1").is_identifier());
        assert!(tok("`project.dataset.table`").is_identifier());
        assert!(tok("`select`").is_identifier());
        assert!(!tok("select").is_identifier());
        assert!(!tok("Qualify").is_identifier());
        assert!(!tok("1col").is_identifier());
        assert!(!tok("(").is_identifier());
        assert!(!tok("").is_identifier());
    }

    #[test]
    fn numerics() {
        for n in ["1", "1.5", ".5", "1e10", "1.5E-3", "2e+1", "0x1F", "0XAb"] {
            assert!(tok(n).is_numeric(), "{n} should be numeric");
        }
        for n in ["1.", "e10", "1e", "1.5.2", "abc", ".", "0x", "0xG1"] {
            assert!(!tok(n).is_numeric(), "{n} should not be numeric");
        }
    }

    #[test]
    fn other_predicates() {
        assert!(tok("'abc'").is_string());
        assert!(tok("\"\"\"abc\"\"\"").is_string());
        assert!(!tok("'").is_string());
        assert!(tok("@param").is_parameter());
        assert!(tok("@@error.message").is_parameter());
        assert!(tok("?").is_parameter());
        assert!(!tok("@").is_parameter());
        assert!(tok("-- c").is_comment());
        assert!(tok("# c").is_comment());
        assert!(tok("/* c */").is_comment());
        assert!(!tok("-").is_comment());
        assert!(tok("true").is_boolean());
        assert!(tok("Null").is_null());
        assert!(Token::eof().is_eof());
    }
}
