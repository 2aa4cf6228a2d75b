//! Console Tetris.
//!
//! `core` holds the game engine (board, pieces, engine state machine,
//! snapshots); `input`, `term` and `persist` are the terminal and file
//! collaborators around it; `types` is shared pure data.

pub mod core;
pub mod input;
pub mod persist;
pub mod term;
pub mod types;
