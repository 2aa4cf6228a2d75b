//! Engine: the falling-piece state machine.
//!
//! Owns the board, the current and next piece, score/level/row counters and
//! the mode clock. Player commands validate against the board and silently
//! no-op on collision; the only terminal transitions are game over (with a
//! reason) and the mode-specific wins. State-change notifications are queued
//! and drained by the caller once per frame, so nothing reenters the engine
//! mid-mutation.

use crate::core::board::Board;
use crate::core::factory::PieceFactory;
use crate::core::pieces::Tetromino;
use crate::core::scoring::{clear_score, drop_interval_ms, level_for_rows};
use crate::types::{
    Difficulty, GameEvent, GameMode, GameOverReason, GamePhase, GameSummary, PieceKind,
    DEFAULT_CHALLENGE_TARGET_ROWS, DEFAULT_TIMED_DURATION_MS, SOFT_DROP_INTERVAL_MS,
};

/// Per-session configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Session length for Timed mode (ignored elsewhere).
    pub timed_duration_ms: u32,
    /// Row target for Challenge mode (ignored elsewhere).
    pub challenge_target_rows: u32,
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            difficulty: Difficulty::Normal,
            timed_duration_ms: DEFAULT_TIMED_DURATION_MS,
            challenge_target_rows: DEFAULT_CHALLENGE_TARGET_ROWS,
            seed: 1,
        }
    }
}

/// The game engine.
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    current: Option<Tetromino>,
    next: PieceKind,
    factory: PieceFactory,
    config: EngineConfig,
    phase: GamePhase,
    over_reason: Option<GameOverReason>,
    score: u32,
    level: u32,
    rows: u32,
    singles: u32,
    doubles: u32,
    triples: u32,
    tetrises: u32,
    elapsed_ms: u32,
    drop_timer_ms: u32,
    soft_drop: bool,
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut factory = PieceFactory::new(config.seed);
        let next = factory.next_kind();
        Self {
            board: Board::new(),
            current: None,
            next,
            factory,
            config,
            phase: GamePhase::Idle,
            over_reason: None,
            score: 0,
            level: 1,
            rows: 0,
            singles: 0,
            doubles: 0,
            triples: 0,
            tetrises: 0,
            elapsed_ms: 0,
            drop_timer_ms: 0,
            soft_drop: false,
            events: Vec::new(),
        }
    }

    /// Start the session and spawn the first piece.
    pub fn start(&mut self) {
        if self.phase != GamePhase::Idle {
            return;
        }
        self.phase = GamePhase::Running;
        self.spawn();
    }

    // Read-only accessors for the UI and persistence collaborators.

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<Tetromino> {
        self.current
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Per-size clear counters (singles, doubles, triples, tetrises).
    pub fn clear_counters(&self) -> (u32, u32, u32, u32) {
        (self.singles, self.doubles, self.triples, self.tetrises)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn over_reason(&self) -> Option<GameOverReason> {
        self.over_reason
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn is_soft_dropping(&self) -> bool {
        self.soft_drop
    }

    /// Milliseconds left in a Timed session; `None` for other modes.
    pub fn remaining_ms(&self) -> Option<u32> {
        match self.config.mode {
            GameMode::Timed => Some(self.config.timed_duration_ms.saturating_sub(self.elapsed_ms)),
            _ => None,
        }
    }

    /// Final tallies for game-over/win reporting.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.score,
            level: self.level,
            rows: self.rows,
            singles: self.singles,
            doubles: self.doubles,
            triples: self.triples,
            tetrises: self.tetrises,
            reason: self.over_reason,
        }
    }

    /// Drain queued notifications. Called once per UI frame.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Gravity interval currently in effect.
    pub fn drop_interval(&self) -> u32 {
        if self.soft_drop {
            SOFT_DROP_INTERVAL_MS
        } else {
            drop_interval_ms(self.level, self.config.difficulty)
        }
    }

    /// Advance the cooperative clock. Gravity and the mode timer only
    /// accumulate while Running, so paused time never produces a drop burst
    /// on resume.
    pub fn update(&mut self, elapsed_ms: u32) {
        if self.phase != GamePhase::Running {
            return;
        }

        if self.config.mode == GameMode::Timed {
            let before = self.elapsed_ms / 1000;
            self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
            let remaining = self
                .config
                .timed_duration_ms
                .saturating_sub(self.elapsed_ms);
            if self.elapsed_ms / 1000 != before {
                self.events.push(GameEvent::RemainingTimeChanged(remaining));
            }
            if self.elapsed_ms >= self.config.timed_duration_ms {
                self.win();
                return;
            }
        } else {
            self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        }

        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        let interval = self.drop_interval();
        if self.drop_timer_ms >= interval {
            self.drop_timer_ms = 0;
            self.gravity_step();
        }
    }

    /// One forced downward step: move or lock.
    fn gravity_step(&mut self) {
        if !self.try_shift(0, 1) {
            self.lock_and_continue();
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.phase == GamePhase::Running && self.try_shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.phase == GamePhase::Running && self.try_shift(1, 0)
    }

    /// Rotate the current piece. A colliding rotation is rejected and the
    /// piece keeps its rotation state and position.
    pub fn rotate(&mut self, clockwise: bool) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        let Some(current) = self.current else {
            return false;
        };
        let candidate = current.rotated(clockwise);
        if self.board.can_place(&candidate.cells()) {
            self.current = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Toggle the fast gravity interval. Resets the drop timer so the new
    /// interval applies immediately.
    pub fn set_soft_drop(&mut self, active: bool) {
        if self.soft_drop != active {
            self.soft_drop = active;
            self.drop_timer_ms = 0;
        }
    }

    /// Drop straight down and lock immediately. Returns cells descended.
    pub fn hard_drop(&mut self) -> u32 {
        if self.phase != GamePhase::Running {
            return 0;
        }
        let mut distance = 0u32;
        while self.try_shift(0, 1) {
            distance += 1;
        }
        self.lock_and_continue();
        distance
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                true
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                true
            }
            _ => false,
        }
    }

    /// Player abandons the session: a terminal transition, not an error.
    pub fn end_by_player(&mut self) {
        if matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            self.over_reason = Some(GameOverReason::PlayerEnded);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver(self.summary()));
        }
    }

    /// Where the current piece would land if hard-dropped. Computed against a
    /// cloned board so preview work never touches the authoritative grid.
    pub fn ghost_cells(&self) -> Option<[(i8, i8); 4]> {
        let current = self.current?;
        let preview = self.board.clone();
        let mut ghost = current;
        while preview.can_place(&ghost.shifted(0, 1).cells()) {
            ghost = ghost.shifted(0, 1);
        }
        Some(ghost.cells())
    }

    fn try_shift(&mut self, dx: i8, dy: i8) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let candidate = current.shifted(dx, dy);
        if self.board.can_place(&candidate.cells()) {
            self.current = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Take the next piece as current and draw a fresh next. A spawn that
    /// collides ends the game without mutating the board.
    fn spawn(&mut self) {
        let piece = Tetromino::new(self.next);
        self.next = self.factory.next_kind();
        self.current = Some(piece);
        self.drop_timer_ms = 0;

        if !self.board.can_place(&piece.cells()) {
            self.over_reason = Some(GameOverReason::NoSpaceForNewPiece);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver(self.summary()));
        }
    }

    /// Lock the current piece, run the clear pass, then check for the
    /// terminal conditions before spawning the successor.
    fn lock_and_continue(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        self.board.place(&current.cells(), current.kind);

        let full_rows = self.board.find_full_rows();
        if !full_rows.is_empty() {
            let cleared = self.board.clear_rows(&full_rows);
            self.apply_clear(cleared);
        }

        if self.board.is_top_row_occupied() {
            self.over_reason = Some(GameOverReason::BoardFull);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver(self.summary()));
            return;
        }

        if self.config.mode == GameMode::Challenge
            && self.rows >= self.config.challenge_target_rows
        {
            self.win();
            return;
        }

        self.spawn();
    }

    /// Score a clear with the level in effect when the rows completed, then
    /// recompute the level from the new row total.
    fn apply_clear(&mut self, cleared: usize) {
        let delta = clear_score(cleared, self.level, self.config.difficulty);
        self.score = self.score.saturating_add(delta);

        match cleared {
            1 => self.singles += 1,
            2 => self.doubles += 1,
            3 => self.triples += 1,
            4 => self.tetrises += 1,
            _ => {}
        }
        self.rows += cleared as u32;

        self.events.push(GameEvent::RowsCleared {
            rows: cleared as u32,
            score_delta: delta,
        });
        self.events.push(GameEvent::ScoreChanged(self.score));

        let new_level = level_for_rows(self.rows);
        if new_level > self.level {
            self.level = new_level;
            self.events.push(GameEvent::LevelIncreased(new_level));
        }
    }

    fn win(&mut self) {
        self.phase = GamePhase::Won;
        self.events.push(GameEvent::GameWon(self.summary()));
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

// Crate-private access for the snapshot layer.
pub(crate) struct EngineParts<'a> {
    pub board: &'a Board,
    pub current: Option<Tetromino>,
    pub next: PieceKind,
    pub factory_state: u32,
    pub config: EngineConfig,
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

impl Engine {
    pub(crate) fn parts(&self) -> EngineParts<'_> {
        EngineParts {
            board: &self.board,
            current: self.current,
            next: self.next,
            factory_state: self.factory.state(),
            config: self.config,
            phase: self.phase,
            over_reason: self.over_reason,
            score: self.score,
            rows: self.rows,
            singles: self.singles,
            doubles: self.doubles,
            triples: self.triples,
            tetrises: self.tetrises,
            elapsed_ms: self.elapsed_ms,
        }
    }

    pub(crate) fn from_parts(
        board: Board,
        current: Option<Tetromino>,
        next: PieceKind,
        factory_state: u32,
        config: EngineConfig,
        phase: GamePhase,
        over_reason: Option<GameOverReason>,
        score: u32,
        rows: u32,
        counters: (u32, u32, u32, u32),
        elapsed_ms: u32,
    ) -> Self {
        Self {
            board,
            current,
            next,
            factory: PieceFactory::new(factory_state),
            config,
            phase,
            over_reason,
            score,
            level: level_for_rows(rows),
            rows,
            singles: counters.0,
            doubles: counters.1,
            triples: counters.2,
            tetrises: counters.3,
            elapsed_ms,
            drop_timer_ms: 0,
            soft_drop: false,
            events: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub fn set_current(&mut self, piece: Tetromino) {
        self.current = Some(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rotation;

    fn easy_classic(seed: u32) -> Engine {
        Engine::new(EngineConfig {
            difficulty: Difficulty::Easy,
            seed,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn new_engine_is_idle() {
        let engine = Engine::default();
        assert_eq!(engine.phase(), GamePhase::Idle);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.level(), 1);
        assert!(engine.current().is_none());
    }

    #[test]
    fn start_spawns_at_top_center() {
        let mut engine = easy_classic(1);
        engine.start();
        assert_eq!(engine.phase(), GamePhase::Running);
        let piece = engine.current().unwrap();
        assert_eq!((piece.x, piece.y), (3, 0));
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn update_does_nothing_while_paused() {
        let mut engine = easy_classic(1);
        engine.start();
        let before = engine.current().unwrap();

        engine.toggle_pause();
        for _ in 0..1000 {
            engine.update(16);
        }
        assert_eq!(engine.current().unwrap(), before);
        assert_eq!(engine.elapsed_ms(), 0);

        engine.toggle_pause();
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn gravity_moves_piece_down_after_interval() {
        let mut engine = easy_classic(1);
        engine.start();
        let y0 = engine.current().unwrap().y;

        engine.update(engine.drop_interval());
        assert_eq!(engine.current().unwrap().y, y0 + 1);
    }

    #[test]
    fn soft_drop_shortens_the_interval() {
        let mut engine = easy_classic(1);
        engine.start();
        engine.set_soft_drop(true);
        assert_eq!(engine.drop_interval(), SOFT_DROP_INTERVAL_MS);
        engine.set_soft_drop(false);
        assert_eq!(
            engine.drop_interval(),
            drop_interval_ms(1, Difficulty::Easy)
        );
    }

    #[test]
    fn rejected_rotation_leaves_piece_unchanged() {
        let mut engine = easy_classic(1);
        engine.start();
        // Box the piece in so the rotated footprint collides.
        let piece = Tetromino::at(PieceKind::I, Rotation::North, 3, 0);
        engine.set_current(piece);
        for x in 0..10 {
            for y in 1..4 {
                if !(3..7).contains(&x) || y != 1 {
                    engine.board_mut().set(x, y, Some(PieceKind::O));
                }
            }
        }
        let before = engine.current().unwrap();
        assert!(!engine.rotate(true));
        assert_eq!(engine.current().unwrap(), before);
    }

    #[test]
    fn hard_drop_locks_and_spawns() {
        let mut engine = easy_classic(1);
        engine.start();
        let distance = engine.hard_drop();
        assert!(distance > 0);
        // A fresh piece is live at the spawn anchor.
        let piece = engine.current().unwrap();
        assert_eq!(piece.y, 0);
    }

    #[test]
    fn ghost_matches_hard_drop_landing() {
        let mut engine = easy_classic(1);
        engine.start();
        let ghost = engine.ghost_cells().unwrap();
        engine.hard_drop();
        for (x, y) in ghost {
            assert_eq!(engine.board().get(x, y), Some(Some(ghost_kind(&engine))));
        }
    }

    fn ghost_kind(engine: &Engine) -> PieceKind {
        // The locked cells carry the kind that was current before hard_drop;
        // recover it from any occupied cell the ghost covered.
        engine
            .board()
            .cells()
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap()
    }
}
