pub mod connection;
pub mod value_codec;

pub use connection::SqliteConnection;
