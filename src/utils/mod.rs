//! Text helpers shared across the engine.

pub mod tokens;

pub use tokens::tokenize;
