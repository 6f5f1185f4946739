pub use board::*;
pub use direction::*;
pub use errors::*;
pub use history::*;
pub use token::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod direction;
mod errors;
mod history;
pub mod label;
mod token;
mod visualization;
