//! Engine tests: spawn, gravity, commands, locking, scoring and game over.
//!
//! Board setups go through the snapshot API: craft a snapshot, restore it,
//! then drive the engine through its public commands.

use console_tetris::core::{Engine, EngineConfig, GameSnapshot, PieceState};
use console_tetris::types::{
    Difficulty, GameEvent, GameMode, GameOverReason, GamePhase, PieceKind, Rotation,
};

fn easy_config() -> EngineConfig {
    EngineConfig {
        difficulty: Difficulty::Easy,
        seed: 1,
        ..EngineConfig::default()
    }
}

/// A running snapshot with an empty board, ready to be customized.
fn running_snapshot(config: EngineConfig) -> GameSnapshot {
    let mut engine = Engine::new(config);
    engine.start();
    engine.snapshot()
}

/// Fill a snapshot row, optionally leaving one column open.
fn fill_snapshot_row(snapshot: &mut GameSnapshot, y: usize, gap_x: Option<usize>) {
    for x in 0..10 {
        if Some(x) != gap_x {
            snapshot.board[y][x] = PieceKind::T.code();
        }
    }
}

#[test]
fn single_row_clear_scores_and_counts() {
    let mut snapshot = running_snapshot(easy_config());
    // Row 19 complete except the rightmost column; a vertical I drops in.
    fill_snapshot_row(&mut snapshot, 19, Some(9));
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 7,
        y: 16,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    engine.hard_drop();

    assert_eq!(engine.rows(), 1);
    assert_eq!(engine.clear_counters(), (1, 0, 0, 0));
    assert_eq!(engine.score(), 100);
    assert_eq!(engine.level(), 1);

    let events = engine.take_events();
    assert!(events.contains(&GameEvent::RowsCleared {
        rows: 1,
        score_delta: 100
    }));
    assert!(events.contains(&GameEvent::ScoreChanged(100)));

    // The surviving I cells compacted down one row onto column 9.
    for y in [17, 18, 19] {
        assert_eq!(engine.board().get(9, y), Some(Some(PieceKind::I)));
    }
}

#[test]
fn four_rows_at_once_is_a_tetris() {
    let mut snapshot = running_snapshot(easy_config());
    for y in 16..20 {
        fill_snapshot_row(&mut snapshot, y, Some(9));
    }
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 7,
        y: 16,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    engine.hard_drop();

    assert_eq!(engine.rows(), 4);
    assert_eq!(engine.clear_counters(), (0, 0, 0, 1));
    assert_eq!(engine.score(), 800);

    let summary = engine.summary();
    assert_eq!(summary.tetrises, 1);
    assert_eq!(summary.score, 800);
}

#[test]
fn clear_score_uses_level_in_effect_before_the_update() {
    let mut snapshot = running_snapshot(easy_config());
    // 9 rows already cleared: the next single both scores at level 1 and
    // crosses the level-up threshold.
    snapshot.rows = 9;
    snapshot.singles = 9;
    fill_snapshot_row(&mut snapshot, 19, Some(9));
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 7,
        y: 16,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    assert_eq!(engine.level(), 1);
    engine.hard_drop();

    assert_eq!(engine.rows(), 10);
    assert_eq!(engine.score(), 100);
    assert_eq!(engine.level(), 2);
    assert!(engine
        .take_events()
        .contains(&GameEvent::LevelIncreased(2)));
}

#[test]
fn difficulty_scales_the_clear_score() {
    let mut snapshot = running_snapshot(EngineConfig {
        difficulty: Difficulty::Hard,
        seed: 1,
        ..EngineConfig::default()
    });
    fill_snapshot_row(&mut snapshot, 19, Some(9));
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 7,
        y: 16,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    engine.hard_drop();
    assert_eq!(engine.score(), 200);
}

#[test]
fn blocked_spawn_ends_the_game_without_touching_the_board() {
    let mut snapshot = running_snapshot(easy_config());
    // Row 1 columns 3..=6 blocked: every kind's spawn footprint collides,
    // while the top row stays clear.
    for x in 3..=6 {
        snapshot.board[1][x] = PieceKind::S.code();
    }
    snapshot.current = Some(PieceState {
        kind: PieceKind::O,
        rotation: Rotation::North,
        x: 0,
        y: 18,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    engine.hard_drop();

    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(
        engine.over_reason(),
        Some(GameOverReason::NoSpaceForNewPiece)
    );

    // Spawn area unchanged: the blockers are still there, nothing was placed.
    for x in 3..=6 {
        assert_eq!(engine.board().get(x as i8, 1), Some(Some(PieceKind::S)));
    }
    for x in 0..10 {
        assert_eq!(engine.board().get(x, 0), Some(None));
    }

    let events = engine.take_events();
    assert!(matches!(events.last(), Some(GameEvent::GameOver(_))));
}

#[test]
fn locking_into_the_top_row_is_board_full() {
    let mut snapshot = running_snapshot(easy_config());
    // Column 0 solid from row 4 down; a vertical I resting on it reaches row 0.
    for y in 4..20 {
        snapshot.board[y][0] = PieceKind::L.code();
    }
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::West,
        x: -1,
        y: 0,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    engine.hard_drop();

    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(engine.over_reason(), Some(GameOverReason::BoardFull));
    assert!(engine.board().is_top_row_occupied());
}

#[test]
fn rejected_rotation_is_byte_for_byte_idempotent() {
    let mut snapshot = running_snapshot(easy_config());
    // Vertical I hugging the right wall: both rotations need column 10.
    snapshot.current = Some(PieceState {
        kind: PieceKind::I,
        rotation: Rotation::East,
        x: 7,
        y: 0,
    });

    let mut engine = Engine::restore(&snapshot).unwrap();
    let before = engine.current().unwrap();

    assert!(!engine.rotate(true));
    assert_eq!(engine.current().unwrap(), before);
    assert!(!engine.rotate(false));
    assert_eq!(engine.current().unwrap(), before);
}

#[test]
fn moves_into_walls_are_silently_rejected() {
    let mut engine = Engine::new(easy_config());
    engine.start();

    // Walk to the left wall; the last attempts must no-op.
    while engine.move_left() {}
    let stuck = engine.current().unwrap();
    assert!(!engine.move_left());
    assert_eq!(engine.current().unwrap(), stuck);
    assert_eq!(engine.phase(), GamePhase::Running);
}

#[test]
fn gravity_locks_a_blocked_piece_and_spawns_the_next() {
    let mut engine = Engine::new(easy_config());
    engine.start();
    let first_kind = engine.current().unwrap().kind;

    // Run the clock until the first piece has locked.
    let mut guard = 0;
    while engine.board().cells().iter().all(|c| c.is_none()) {
        engine.update(engine.drop_interval());
        guard += 1;
        assert!(guard < 100, "piece never locked");
    }

    let locked = engine
        .board()
        .cells()
        .iter()
        .filter(|c| **c == Some(first_kind))
        .count();
    assert_eq!(locked, 4);
    assert!(engine.current().is_some());
}

#[test]
fn pause_freezes_gravity_and_commands() {
    let mut engine = Engine::new(easy_config());
    engine.start();
    let before = engine.current().unwrap();

    engine.toggle_pause();
    assert_eq!(engine.phase(), GamePhase::Paused);

    for _ in 0..500 {
        engine.update(16);
    }
    assert!(!engine.move_left());
    assert!(!engine.rotate(true));
    assert_eq!(engine.current().unwrap(), before);

    engine.toggle_pause();
    assert_eq!(engine.phase(), GamePhase::Running);
    // Gravity resumes from a clean timer: one small step does not drop.
    engine.update(1);
    assert_eq!(engine.current().unwrap(), before);
}

#[test]
fn player_can_end_the_session() {
    let mut engine = Engine::new(easy_config());
    engine.start();
    engine.end_by_player();

    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(engine.over_reason(), Some(GameOverReason::PlayerEnded));

    // Terminal state: commands and gravity are inert.
    assert!(!engine.move_left());
    assert!(!engine.toggle_pause());
    engine.update(10_000);
    assert_eq!(engine.phase(), GamePhase::GameOver);
}

#[test]
fn hard_drop_reports_descent_and_locks() {
    let mut engine = Engine::new(easy_config());
    engine.start();
    let distance = engine.hard_drop();
    assert!(distance > 0);
    assert_eq!(
        engine
            .board()
            .cells()
            .iter()
            .filter(|c| c.is_some())
            .count(),
        4
    );
}

#[test]
fn classic_mode_has_no_remaining_time() {
    let mut engine = Engine::new(easy_config());
    engine.start();
    assert_eq!(engine.remaining_ms(), None);
    assert_eq!(engine.mode(), GameMode::Classic);
}
