pub mod engine;
pub mod ident;
pub mod macros;
mod parser;
pub mod placeholder;
