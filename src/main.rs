//! Terminal Tetris runner.
//!
//! One cooperative loop drives rendering, input and the engine clock. The
//! engine is the only mutable state; rendering reads it and never writes.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use console_tetris::core::{Controller, Engine, EngineConfig};
use console_tetris::input::{map_key, InputHandler};
use console_tetris::persist::{self, Settings, Statistics, SAVE_FILE, SETTINGS_FILE, STATS_FILE};
use console_tetris::term::{GameView, TerminalRenderer, Viewport};
use console_tetris::types::{GameEvent, GamePhase, InputAction, TICK_MS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CliOptions {
    mode: Option<console_tetris::types::GameMode>,
    difficulty: Option<console_tetris::types::Difficulty>,
    seed: Option<u32>,
    duration_secs: Option<u32>,
    target_rows: Option<u32>,
    resume: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                i += 1;
                let v = args.get(i).ok_or_else(|| anyhow!("missing value for --mode"))?;
                options.mode = Some(
                    console_tetris::types::GameMode::from_str(v)
                        .ok_or_else(|| anyhow!("unknown mode: {}", v))?,
                );
            }
            "--difficulty" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --difficulty"))?;
                options.difficulty = Some(
                    console_tetris::types::Difficulty::from_str(v)
                        .ok_or_else(|| anyhow!("unknown difficulty: {}", v))?,
                );
            }
            "--seed" => {
                i += 1;
                let v = args.get(i).ok_or_else(|| anyhow!("missing value for --seed"))?;
                options.seed = Some(v.parse().map_err(|_| anyhow!("invalid --seed: {}", v))?);
            }
            "--duration" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --duration"))?;
                options.duration_secs =
                    Some(v.parse().map_err(|_| anyhow!("invalid --duration: {}", v))?);
            }
            "--target" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --target"))?;
                options.target_rows =
                    Some(v.parse().map_err(|_| anyhow!("invalid --target: {}", v))?);
            }
            "--resume" => options.resume = true,
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(options)
}

fn entropy_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}

fn build_engine(options: &CliOptions, settings: &Settings) -> Result<Engine> {
    if options.resume {
        return persist::load_game(Path::new(SAVE_FILE));
    }
    let config = EngineConfig {
        mode: options.mode.unwrap_or(settings.mode),
        difficulty: options.difficulty.unwrap_or(settings.difficulty),
        timed_duration_ms: options
            .duration_secs
            .map(|s| s * 1000)
            .unwrap_or(settings.timed_duration_ms),
        challenge_target_rows: options.target_rows.unwrap_or(settings.challenge_target_rows),
        seed: options.seed.unwrap_or_else(entropy_seed),
    };
    Ok(Engine::new(config))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let settings = persist::load_settings(Path::new(SETTINGS_FILE));
    let mut stats = persist::load_statistics(Path::new(STATS_FILE));

    let mut engine = match build_engine(&options, &settings) {
        Ok(engine) => engine,
        Err(err) if options.resume => {
            eprintln!("cannot resume: {err:#}; starting a new game");
            persist::discard_save(Path::new(SAVE_FILE));
            build_engine(&CliOptions::default(), &settings)?
        }
        Err(err) => return Err(err),
    };
    engine.start();

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, &mut engine, &mut stats);
    let _ = term.exit();

    let _ = persist::save_statistics(Path::new(STATS_FILE), &stats);
    let _ = persist::save_settings(Path::new(SETTINGS_FILE), &settings);
    result
}

fn run(term: &mut TerminalRenderer, engine: &mut Engine, stats: &mut Statistics) -> Result<()> {
    let view = GameView::default();
    let mut controller = Controller::new();
    let mut input_handler = InputHandler::new();

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let fb = view.render(engine, Viewport::new(w, h));
        term.draw(&fb)?;

        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if let Some(action) = input_handler.handle_key_press(key.code) {
                            controller.apply(engine, action);
                        } else if let Some(action) = map_key(key) {
                            match action {
                                InputAction::Quit => {
                                    // A live session is saved for --resume.
                                    if matches!(
                                        engine.phase(),
                                        GamePhase::Running | GamePhase::Paused
                                    ) {
                                        persist::save_game(Path::new(SAVE_FILE), engine)?;
                                    }
                                    return Ok(());
                                }
                                _ => {
                                    controller.apply(engine, action);
                                }
                            }
                        } else if key.code == KeyCode::Char('e') {
                            engine.end_by_player();
                        } else if key.code == KeyCode::Char('r')
                            && matches!(engine.phase(), GamePhase::GameOver | GamePhase::Won)
                        {
                            let config = EngineConfig {
                                seed: entropy_seed(),
                                ..engine.config()
                            };
                            *engine = Engine::new(config);
                            engine.start();
                            controller.reset(engine);
                            input_handler.reset();
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(action) = input_handler.handle_key_release(key.code) {
                            controller.apply(engine, action);
                        }
                    }
                    KeyEventKind::Repeat => {
                        // Held keys are repeated by the input handler.
                    }
                },
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            for action in input_handler.update(TICK_MS) {
                controller.apply(engine, action);
            }
            engine.update(TICK_MS);

            for event in engine.take_events() {
                match event {
                    GameEvent::GameOver(summary) => {
                        stats.record(&summary, false);
                        persist::discard_save(Path::new(SAVE_FILE));
                    }
                    GameEvent::GameWon(summary) => {
                        stats.record(&summary, true);
                        persist::discard_save(Path::new(SAVE_FILE));
                    }
                    GameEvent::ScoreChanged(_)
                    | GameEvent::LevelIncreased(_)
                    | GameEvent::RowsCleared { .. }
                    | GameEvent::RemainingTimeChanged(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_tetris::types::{Difficulty, GameMode};

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_args_full_set() {
        let options = parse_args(&strings(&[
            "--mode",
            "timed",
            "--difficulty",
            "hard",
            "--seed",
            "99",
            "--duration",
            "90",
        ]))
        .unwrap();
        assert_eq!(options.mode, Some(GameMode::Timed));
        assert_eq!(options.difficulty, Some(Difficulty::Hard));
        assert_eq!(options.seed, Some(99));
        assert_eq!(options.duration_secs, Some(90));
        assert!(!options.resume);
    }

    #[test]
    fn parse_args_rejects_unknown_flag() {
        assert!(parse_args(&strings(&["--nope"])).is_err());
        assert!(parse_args(&strings(&["--mode", "arcade"])).is_err());
        assert!(parse_args(&strings(&["--seed"])).is_err());
    }

    #[test]
    fn cli_overrides_win_over_settings() {
        let settings = Settings::default();
        let options = parse_args(&strings(&["--mode", "challenge", "--target", "15"])).unwrap();
        let engine = build_engine(&options, &settings).unwrap();
        assert_eq!(engine.mode(), GameMode::Challenge);
        assert_eq!(engine.config().challenge_target_rows, 15);
    }
}
