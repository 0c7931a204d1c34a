//! Brickwave entry point
//!
//! Headless native shell: drives the deterministic engine at 60 Hz with a
//! small autopilot, persists high scores when the engine asks, and builds
//! the draw list each frame the way a real renderer backend would consume
//! it. Useful for soak runs and replay debugging; a graphical frontend
//! plugs into the same seams.

use std::error::Error;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use brickwave::consts::*;
use brickwave::sim::{GameEvent, GamePhase, GameState, PowerUpKind, TickInput, tick};
use brickwave::{HighScoreStore, Settings, render, settings};

fn main() {
    env_logger::init();
    log::info!("Brickwave starting...");
    if let Err(err) = run() {
        log::error!("Unexpected error during the game run: {err}");
        std::process::exit(1);
    }
}

struct Options {
    seed: u64,
    frames: u64,
    /// Skip the frame governor (soak/CI runs)
    fast: bool,
}

fn parse_args() -> Result<Options, Box<dyn Error>> {
    let mut seed = None;
    let mut frames = 7200;
    let mut fast = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed requires a value")?;
                seed = Some(value.parse()?);
            }
            "--frames" => {
                let value = args.next().ok_or("--frames requires a value")?;
                frames = value.parse()?;
            }
            "--fast" => fast = true,
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });

    Ok(Options { seed, frames, fast })
}

fn run() -> Result<(), Box<dyn Error>> {
    let options = parse_args()?;
    let settings = Settings::load_from(settings::SETTINGS_FILE);
    let store = HighScoreStore::default();

    let mut state = GameState::new(options.seed);
    state.high_score = store.load();
    log::info!(
        "Run seed {}, {} frames, high score {}",
        options.seed,
        options.frames,
        state.high_score
    );

    let tick_duration = Duration::from_secs(1) / TICKS_PER_SECOND;

    for frame in 0..options.frames {
        let frame_start = Instant::now();

        let input = autopilot(&state);
        tick(&mut state, &input);

        for event in state.take_events() {
            match event {
                GameEvent::Sound(sound) => {
                    // The audio collaborator would synthesize these; the
                    // headless shell just names them.
                    log::debug!("sound: {sound:?} (vol {:.2})", settings.effective_volume());
                }
                GameEvent::HighScore(score) => store.save(score),
                GameEvent::MultiBallRefused => {}
            }
        }

        let scene = render::build_scene(&state);
        if settings.show_fps && frame % u64::from(TICKS_PER_SECOND) == 0 {
            log::debug!("frame {frame}: {} draw commands", scene.len());
        }

        if state.phase == GamePhase::GameOver {
            log::info!(
                "Run ended at level {} with score {} ({})",
                state.level,
                state.score,
                if state.win { "win" } else { "loss" }
            );
        }

        if !options.fast {
            let elapsed = frame_start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }
    }

    log::info!(
        "Finished after {} frames: score {}, level {}, lives {}",
        options.frames,
        state.score,
        state.level,
        state.lives
    );
    println!("final score: {} (high score: {})", state.score, state.high_score);
    Ok(())
}

/// Minimal demo pilot: serves and restarts automatically, chases the
/// lowest ball with the paddle, and fires the laser whenever it can.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    match state.phase {
        GamePhase::LevelIntro => input.start = true,
        GamePhase::GameOver => input.restart = true,
        GamePhase::Playing => {
            if let Some(ball) = state.balls.iter().max_by_key(|b| b.rect.center_y()) {
                let paddle_x = state.paddle.rect().center_x();
                let target = ball.rect.center_x();
                if target < paddle_x - 4 {
                    input.left = true;
                } else if target > paddle_x + 4 {
                    input.right = true;
                }
            }
            input.fire =
                state.paddle.has(PowerUpKind::LaserPaddle) && state.lasers.is_empty();
        }
    }
    input
}
