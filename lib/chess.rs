/// The legality filter and terminal-state detector.
pub mod arbiter;
/// Pseudo-legal move generation.
pub mod generate;

mod castles;
mod color;
mod file;
mod r#move;
mod outcome;
mod piece;
mod position;
mod promotion;
mod rank;
mod role;
mod square;

pub use castles::*;
pub use color::*;
pub use file::*;
pub use outcome::*;
pub use piece::*;
pub use position::*;
pub use promotion::*;
pub use r#move::*;
pub use rank::*;
pub use role::*;
pub use square::*;
