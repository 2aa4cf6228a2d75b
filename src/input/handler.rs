//! Key handling for terminal environments.
//!
//! Maps crossterm key events to [`InputAction`]s and adds held-key repeat for
//! horizontal movement. Terminals that never emit key-release events are
//! handled with a timeout: a key with no recent press is treated as released,
//! which also ends soft drop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use arrayvec::ArrayVec;

use crate::types::{InputAction, MOVE_REPEAT_DELAY_MS, MOVE_REPEAT_RATE_MS};

/// One-shot mapping for keys without held-state semantics.
pub fn map_key(key: KeyEvent) -> Option<InputAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputAction::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('x') | KeyCode::Char('w') => Some(InputAction::RotateCw),
        KeyCode::Char('z') => Some(InputAction::RotateCcw),
        KeyCode::Char(' ') => Some(InputAction::HardDrop),
        KeyCode::Char('p') => Some(InputAction::Pause),
        KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldDirection {
    Left,
    Right,
    None,
}

// Without key-release events, a short timeout keeps a single tap from
// becoming a sustained hold.
const KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Tracks held keys: horizontal repeat and the soft-drop hold.
#[derive(Debug, Clone)]
pub struct InputHandler {
    horizontal: HeldDirection,
    down_held: bool,
    last_key_time: std::time::Instant,
    repeat_delay_timer: u32,
    repeat_accumulator: u32,
    repeat_delay: u32,
    repeat_rate: u32,
    release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_config(MOVE_REPEAT_DELAY_MS, MOVE_REPEAT_RATE_MS)
    }

    pub fn with_config(repeat_delay: u32, repeat_rate: u32) -> Self {
        Self {
            horizontal: HeldDirection::None,
            down_held: false,
            last_key_time: std::time::Instant::now(),
            repeat_delay_timer: 0,
            repeat_accumulator: 0,
            repeat_delay,
            repeat_rate,
            release_timeout_ms: KEY_RELEASE_TIMEOUT_MS,
        }
    }

    #[cfg(test)]
    pub fn with_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.release_timeout_ms = timeout_ms;
        self
    }

    /// Handle a key press for the held-state keys. Returns the immediate
    /// action, if any; one-shot keys go through [`map_key`] instead.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<InputAction> {
        match code {
            KeyCode::Left | KeyCode::Char('a') => {
                self.last_key_time = std::time::Instant::now();
                if self.horizontal == HeldDirection::Left {
                    None
                } else {
                    self.horizontal = HeldDirection::Left;
                    self.repeat_delay_timer = 0;
                    self.repeat_accumulator = 0;
                    Some(InputAction::MoveLeft)
                }
            }
            KeyCode::Right | KeyCode::Char('d') => {
                self.last_key_time = std::time::Instant::now();
                if self.horizontal == HeldDirection::Right {
                    None
                } else {
                    self.horizontal = HeldDirection::Right;
                    self.repeat_delay_timer = 0;
                    self.repeat_accumulator = 0;
                    Some(InputAction::MoveRight)
                }
            }
            KeyCode::Down | KeyCode::Char('s') => {
                self.last_key_time = std::time::Instant::now();
                if self.down_held {
                    None
                } else {
                    self.down_held = true;
                    Some(InputAction::SoftDropStart)
                }
            }
            _ => None,
        }
    }

    /// Handle a key release (terminals that emit them).
    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<InputAction> {
        match code {
            KeyCode::Left | KeyCode::Char('a') => {
                if self.horizontal == HeldDirection::Left {
                    self.stop_horizontal();
                }
                None
            }
            KeyCode::Right | KeyCode::Char('d') => {
                if self.horizontal == HeldDirection::Right {
                    self.stop_horizontal();
                }
                None
            }
            KeyCode::Down | KeyCode::Char('s') => {
                if self.down_held {
                    self.down_held = false;
                    Some(InputAction::SoftDropEnd)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Advance the repeat timers. Returns the actions generated this tick,
    /// including a `SoftDropEnd` when the hold times out.
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<InputAction, 16> {
        let mut actions = ArrayVec::<InputAction, 16>::new();

        let since_last_key = self.last_key_time.elapsed().as_millis() as u32;
        if since_last_key > self.release_timeout_ms {
            if self.horizontal != HeldDirection::None {
                self.stop_horizontal();
            }
            if self.down_held {
                self.down_held = false;
                let _ = actions.try_push(InputAction::SoftDropEnd);
            }
        }

        match self.horizontal {
            HeldDirection::Left | HeldDirection::Right => {
                let prev = self.repeat_delay_timer;
                self.repeat_delay_timer += elapsed_ms;

                if self.repeat_delay_timer >= self.repeat_delay {
                    let excess = if prev < self.repeat_delay {
                        self.repeat_delay_timer - self.repeat_delay
                    } else {
                        elapsed_ms
                    };
                    self.repeat_accumulator += excess;
                    while self.repeat_accumulator >= self.repeat_rate {
                        let action = match self.horizontal {
                            HeldDirection::Left => InputAction::MoveLeft,
                            HeldDirection::Right => InputAction::MoveRight,
                            HeldDirection::None => break,
                        };
                        let _ = actions.try_push(action);
                        self.repeat_accumulator -= self.repeat_rate;
                    }
                }
            }
            HeldDirection::None => {
                self.repeat_delay_timer = 0;
                self.repeat_accumulator = 0;
            }
        }

        actions
    }

    fn stop_horizontal(&mut self) {
        self.horizontal = HeldDirection::None;
        self.repeat_delay_timer = 0;
        self.repeat_accumulator = 0;
    }

    pub fn reset(&mut self) {
        self.horizontal = HeldDirection::None;
        self.down_held = false;
        self.last_key_time = std::time::Instant::now();
        self.repeat_delay_timer = 0;
        self.repeat_accumulator = 0;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
