//! Session snapshots: serializable game state for save/resume.
//!
//! A snapshot captures everything needed to reproduce a session exactly:
//! grid, piece states, counters, mode parameters and the RNG state. Restoring
//! validates the data first and rejects anything inconsistent, leaving the
//! caller's existing session untouched.

use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::engine::{Engine, EngineConfig};
use crate::core::pieces::Tetromino;
use crate::types::{
    Difficulty, GameMode, GameOverReason, GamePhase, PieceKind, Rotation, BOARD_HEIGHT,
    BOARD_WIDTH,
};

/// Why a snapshot was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum SnapshotError {
    #[error("unknown cell code {code} at ({x}, {y})")]
    UnknownCellCode { x: usize, y: usize, code: u8 },
    #[error("piece extends outside the board")]
    PieceOutOfBounds,
    #[error("piece overlaps occupied cells")]
    PieceOverlap,
    #[error("per-size clear counters do not add up to the row total")]
    CounterMismatch,
    #[error("elapsed time exceeds the timed-mode duration")]
    ElapsedOutOfRange,
    #[error("terminal phase is missing a reason, or a live phase carries one")]
    PhaseReasonConflict,
    #[error("running session has no current piece")]
    MissingCurrentPiece,
}

/// Serialized piece state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceState {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl From<Tetromino> for PieceState {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

impl From<PieceState> for Tetromino {
    fn from(value: PieceState) -> Self {
        Tetromino::at(value.kind, value.rotation, value.x, value.y)
    }
}

/// Complete serializable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub current: Option<PieceState>,
    pub next: PieceKind,
    pub rng_state: u32,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub timed_duration_ms: u32,
    pub challenge_target_rows: u32,
    pub phase: GamePhase,
    pub over_reason: Option<GameOverReason>,
    pub score: u32,
    pub rows: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub tetrises: u32,
    pub elapsed_ms: u32,
}

impl GameSnapshot {
    /// Check internal consistency without building anything.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (y, row) in self.board.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                if code != 0 && PieceKind::from_code(code).is_none() {
                    return Err(SnapshotError::UnknownCellCode { x, y, code });
                }
            }
        }

        let counted = self.singles as u64
            + self.doubles as u64 * 2
            + self.triples as u64 * 3
            + self.tetrises as u64 * 4;
        if counted != self.rows as u64 {
            return Err(SnapshotError::CounterMismatch);
        }

        if self.mode == GameMode::Timed && self.elapsed_ms > self.timed_duration_ms {
            return Err(SnapshotError::ElapsedOutOfRange);
        }

        let terminal = matches!(self.phase, GamePhase::GameOver);
        if terminal != self.over_reason.is_some() {
            return Err(SnapshotError::PhaseReasonConflict);
        }

        if matches!(self.phase, GamePhase::Running | GamePhase::Paused)
            && self.current.is_none()
        {
            return Err(SnapshotError::MissingCurrentPiece);
        }

        // A terminal snapshot may legitimately hold a colliding piece (the
        // spawn that ended the game), so placement is only vetted for live
        // sessions.
        let live = matches!(
            self.phase,
            GamePhase::Idle | GamePhase::Running | GamePhase::Paused
        );
        if let (true, Some(piece)) = (live, self.current) {
            let tetromino = Tetromino::from(piece);
            for (x, y) in tetromino.cells() {
                if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
                    return Err(SnapshotError::PieceOutOfBounds);
                }
                if self.board[y as usize][x as usize] != 0 {
                    return Err(SnapshotError::PieceOverlap);
                }
            }
        }

        Ok(())
    }
}

impl Engine {
    /// Capture the session as a serializable snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        let parts = self.parts();
        let mut board = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        parts.board.write_codes(&mut board);

        GameSnapshot {
            board,
            current: parts.current.map(PieceState::from),
            next: parts.next,
            rng_state: parts.factory_state,
            mode: parts.config.mode,
            difficulty: parts.config.difficulty,
            timed_duration_ms: parts.config.timed_duration_ms,
            challenge_target_rows: parts.config.challenge_target_rows,
            phase: parts.phase,
            over_reason: parts.over_reason,
            score: parts.score,
            rows: parts.rows,
            singles: parts.singles,
            doubles: parts.doubles,
            triples: parts.triples,
            tetrises: parts.tetrises,
            elapsed_ms: parts.elapsed_ms,
        }
    }

    /// Rebuild an engine from a snapshot. Rejection leaves any session the
    /// caller already holds untouched; the caller falls back to a new game.
    pub fn restore(snapshot: &GameSnapshot) -> Result<Engine, SnapshotError> {
        snapshot.validate()?;

        // validate() already vetted every cell code.
        let board = Board::from_codes(&snapshot.board).ok_or(
            SnapshotError::UnknownCellCode {
                x: 0,
                y: 0,
                code: 0,
            },
        )?;

        let config = EngineConfig {
            mode: snapshot.mode,
            difficulty: snapshot.difficulty,
            timed_duration_ms: snapshot.timed_duration_ms,
            challenge_target_rows: snapshot.challenge_target_rows,
            seed: snapshot.rng_state,
        };

        Ok(Engine::from_parts(
            board,
            snapshot.current.map(Tetromino::from),
            snapshot.next,
            snapshot.rng_state,
            config,
            snapshot.phase,
            snapshot.over_reason,
            snapshot.score,
            snapshot.rows,
            (
                snapshot.singles,
                snapshot.doubles,
                snapshot.triples,
                snapshot.tetrises,
            ),
            snapshot.elapsed_ms,
        ))
    }
}
