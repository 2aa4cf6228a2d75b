//! Core module: pure game logic with no UI or I/O dependencies.

pub mod board;
pub mod controller;
pub mod engine;
pub mod factory;
pub mod pieces;
pub mod scoring;
pub mod snapshot;

pub use board::Board;
pub use controller::Controller;
pub use engine::{Engine, EngineConfig};
pub use factory::{PieceFactory, SimpleRng};
pub use pieces::{shape, Tetromino};
pub use snapshot::{GameSnapshot, PieceState, SnapshotError};
