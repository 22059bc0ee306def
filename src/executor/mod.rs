pub mod exec;
pub mod session;

pub use session::Session;
