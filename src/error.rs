use thiserror::Error;

use crate::tpl::macros::Arity;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("unknown macro {name}!")]
    UnknownMacro { name: String },
    #[error("wrong argument count for {name}! (expected {expected}, got {got} instead)")]
    MacroArity {
        name: String,
        expected: Arity,
        got: usize,
    },
    #[error("unclosed argument list for macro {name}!")]
    UnclosedMacro { name: String },
    #[error("macro expansion did not terminate after {limit} substitutions")]
    MacroExpansionLimit { limit: usize },
    #[error("parameter @p{index} is out of range ({len} arguments bound)")]
    ParameterRange { index: usize, len: usize },
    #[error("unmatched types (got {source_type}, expected {target_type})")]
    TypeMismatch {
        source_type: &'static str,
        target_type: &'static str,
    },
    #[error("on field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<DbError>,
    },
    #[error("empty result")]
    EmptyResult,
    #[error("Registry Error: {0}")]
    Registry(String),
    #[error("Serialization Error: {0}")]
    Serialization(String),
    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),
    #[error("Invalid Database Url: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Database Error: {0}")]
    Database(String),
    #[cfg(feature = "sqlite")]
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[cfg(feature = "mysql")]
    #[error("Mysql Error: {0}")]
    Mysql(#[from] mysql_async::Error),
}

impl DbError {
    pub(crate) fn mismatch<T: ?Sized>(source_type: &'static str) -> Self {
        DbError::TypeMismatch {
            source_type,
            target_type: std::any::type_name::<T>(),
        }
    }
}

impl serde::ser::Error for DbError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        DbError::Serialization(msg.to_string())
    }
}
