//! Core types shared across the application.
//! Pure data with no dependencies beyond serde derives for the persisted enums.

use serde::{Deserialize, Serialize};

/// Board dimensions.
pub const BOARD_WIDTH: u8 = 10;
pub const BOARD_HEIGHT: u8 = 20;

/// Fixed loop tick (milliseconds).
pub const TICK_MS: u32 = 16;

/// Gravity intervals by level index (milliseconds). Levels past the end of
/// the table use the floor value.
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Fixed gravity interval while soft drop is held.
pub const SOFT_DROP_INTERVAL_MS: u32 = 50;

/// Rows required per level-up.
pub const ROWS_PER_LEVEL: u32 = 10;

/// Clear scores indexed by rows cleared at once (1..=4).
pub const CLEAR_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Mode defaults.
pub const DEFAULT_TIMED_DURATION_MS: u32 = 120_000;
pub const DEFAULT_CHALLENGE_TARGET_ROWS: u32 = 40;

/// Held-key repeat timing for horizontal movement (milliseconds).
pub const MOVE_REPEAT_DELAY_MS: u32 = 150;
pub const MOVE_REPEAT_RATE_MS: u32 = 50;

/// Tetromino piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Non-zero cell code used in serialized grids (0 = empty).
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Inverse of [`PieceKind::code`]; rejects 0 and unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Rotation states (North = spawn orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }
}

/// Cell on the board (None = empty, Some = filled with piece kind).
pub type Cell = Option<PieceKind>;

/// Discrete input actions fed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    SoftDropStart,
    SoftDropEnd,
    HardDrop,
    Pause,
    Quit,
}

/// Game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Classic,
    Timed,
    Challenge,
}

impl GameMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "timed" => Some(GameMode::Timed),
            "challenge" => Some(GameMode::Challenge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Timed => "timed",
            GameMode::Challenge => "challenge",
        }
    }
}

/// Difficulty affects the starting gravity speed and the clear score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Clear-score multiplier in percent.
    pub fn score_percent(&self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Normal => 150,
            Difficulty::Hard => 200,
        }
    }

    /// Offset into the gravity interval table, so harder games start faster.
    pub fn speed_offset(&self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 2,
            Difficulty::Hard => 4,
        }
    }
}

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Idle,
    Running,
    Paused,
    GameOver,
    Won,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    BoardFull,
    NoSpaceForNewPiece,
    PlayerEnded,
}

/// Final tallies reported with GameOver/GameWon events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u32,
    pub level: u32,
    pub rows: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub tetrises: u32,
    pub reason: Option<GameOverReason>,
}

/// State-change notifications, queued by the engine and drained by the UI
/// loop once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u32),
    LevelIncreased(u32),
    RowsCleared { rows: u32, score_delta: u32 },
    RemainingTimeChanged(u32),
    GameOver(GameSummary),
    GameWon(GameSummary),
}
