//! Controller: maps discrete input actions onto engine commands.
//!
//! Holds no game state beyond the soft-drop-active flag. `Quit` is left to
//! the caller; everything else routes to exactly one engine operation.

use crate::core::engine::Engine;
use crate::types::InputAction;

#[derive(Debug, Clone, Copy, Default)]
pub struct Controller {
    soft_drop_active: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn soft_drop_active(&self) -> bool {
        self.soft_drop_active
    }

    /// Dispatch one action. Returns whether the engine accepted it; a
    /// rejected move/rotate is normal gameplay, not an error.
    pub fn apply(&mut self, engine: &mut Engine, action: InputAction) -> bool {
        match action {
            InputAction::MoveLeft => engine.move_left(),
            InputAction::MoveRight => engine.move_right(),
            InputAction::RotateCw => engine.rotate(true),
            InputAction::RotateCcw => engine.rotate(false),
            InputAction::SoftDropStart => {
                self.soft_drop_active = true;
                engine.set_soft_drop(true);
                true
            }
            InputAction::SoftDropEnd => {
                self.soft_drop_active = false;
                engine.set_soft_drop(false);
                true
            }
            InputAction::HardDrop => {
                engine.hard_drop();
                true
            }
            InputAction::Pause => engine.toggle_pause(),
            InputAction::Quit => false,
        }
    }

    /// Drop any held state, e.g. when a session ends.
    pub fn reset(&mut self, engine: &mut Engine) {
        self.soft_drop_active = false;
        engine.set_soft_drop(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::{Engine, EngineConfig};

    #[test]
    fn soft_drop_flag_tracks_start_and_end() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.start();
        let mut controller = Controller::new();

        assert!(!controller.soft_drop_active());
        controller.apply(&mut engine, InputAction::SoftDropStart);
        assert!(controller.soft_drop_active());
        assert!(engine.is_soft_dropping());

        controller.apply(&mut engine, InputAction::SoftDropEnd);
        assert!(!controller.soft_drop_active());
        assert!(!engine.is_soft_dropping());
    }

    #[test]
    fn pause_routes_to_engine() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.start();
        let mut controller = Controller::new();

        assert!(controller.apply(&mut engine, InputAction::Pause));
        assert_eq!(engine.phase(), crate::types::GamePhase::Paused);
        assert!(controller.apply(&mut engine, InputAction::Pause));
        assert_eq!(engine.phase(), crate::types::GamePhase::Running);
    }

    #[test]
    fn quit_is_not_handled_here() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.start();
        let mut controller = Controller::new();
        assert!(!controller.apply(&mut engine, InputAction::Quit));
        assert_eq!(engine.phase(), crate::types::GamePhase::Running);
    }
}
