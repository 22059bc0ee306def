extern crate self as dorm;

pub mod error;
pub mod executor;
pub mod registry;
pub mod scan;
pub mod tpl;
pub mod udbc;

pub use dorm_macros::{Model, Record};
pub use error::DbError;
pub use executor::Session;
pub use registry::{EngineOptions, FieldInfo, Model, ModelInfo, Registry, RegistryBuilder};
pub use scan::coerce::{FromCell, coerce};
pub use scan::record::Record;
pub use tpl::engine::{Prepared, prepare, rebind, render};
pub use udbc::column::ColumnMeta;
pub use udbc::dialect::Dialect;
pub use udbc::value::{ToValue, Value};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Builds a positional argument list from heterogeneous values.
///
/// ```
/// use dorm::{params, Value};
/// let args = params![1i32, "alice", None::<i64>];
/// assert_eq!(args, vec![Value::I32(1), Value::Str("alice".into()), Value::Null]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::udbc::value::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::udbc::value::ToValue::to_value(&$arg)),+]
    };
}
