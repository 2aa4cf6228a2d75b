//! Terminal input: key events to discrete input actions.

pub mod handler;

pub use handler::{map_key, InputHandler};
