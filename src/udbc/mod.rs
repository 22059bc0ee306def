pub mod column;
pub mod connection;
pub mod dialect;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod serializer;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod value;
