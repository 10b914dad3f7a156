/// Chess domain types and the rules arbiter.
pub mod chess;
/// The game state machine and its adapters.
pub mod game;
