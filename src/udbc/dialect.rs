use std::fmt;
use std::str::FromStr;

use crate::error::DbError;

/// The SQL convention a rewritten query targets.
///
/// - `Positional`: `?` placeholders and backtick-quoted identifiers (MySQL, SQLite).
/// - `Named`: `@pN` placeholders and bracket-quoted identifiers (SQL Server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Positional,
    Named,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Positional => "positional",
            Dialect::Named => "named",
        }
    }

    /// Quotes an identifier, doubling any embedded closing delimiter.
    pub fn escape(&self, ident: &str) -> String {
        let (open, close) = match self {
            Dialect::Positional => ('`', '`'),
            Dialect::Named => ('[', ']'),
        };
        let mut out = String::with_capacity(ident.len() + 2);
        out.push(open);
        for c in ident.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }

    /// Generates the placeholder for the parameter at `param_seq` (starting from 1).
    pub fn placeholder(&self, param_seq: usize) -> String {
        match self {
            Dialect::Positional => "?".to_string(),
            Dialect::Named => format!("@p{}", param_seq),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" | "mysql" | "sqlite" => Ok(Dialect::Positional),
            "named" | "mssql" | "sqlserver" => Ok(Dialect::Named),
            other => Err(DbError::UnknownDialect(other.to_string())),
        }
    }
}
