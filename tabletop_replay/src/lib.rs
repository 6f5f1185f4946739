mod config;
mod script;
pub use config::*;
pub use script::*;
