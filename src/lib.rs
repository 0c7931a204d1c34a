//! Brickwave - a block-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `render`: Platform-free draw descriptors for a renderer backend
//! - `highscores`: Single-integer high score persistence
//! - `settings`: Player preferences

pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScoreStore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (pixels)
    pub const SCREEN_WIDTH: i32 = 800;
    pub const SCREEN_HEIGHT: i32 = 600;

    /// Simulation rate: one tick per frame at 60 Hz
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Canonical ball speed: every ball's velocity is renormalized to
    /// `BALL_SPEED * speed_multiplier` after any directional change.
    pub const BALL_SPEED: f32 = 6.0;
    pub const BALL_RADIUS: i32 = 10;
    /// Hard cap on concurrently live balls
    pub const MAX_BALLS: usize = 10;

    /// Paddle defaults
    pub const PADDLE_WIDTH: i32 = 100;
    pub const PADDLE_HEIGHT: i32 = 20;
    pub const PADDLE_SPEED: f32 = 7.0;
    /// Gap between the paddle bottom and the screen bottom
    pub const PADDLE_BOTTOM_MARGIN: i32 = 30;
    pub const EXPANDED_WIDTH: i32 = 150;
    pub const SHRUNK_WIDTH: i32 = 70;
    /// Paddle width stays within [PADDLE_MIN_WIDTH, SCREEN_WIDTH - PADDLE_WIDTH_MARGIN]
    pub const PADDLE_MIN_WIDTH: i32 = 50;
    pub const PADDLE_WIDTH_MARGIN: i32 = 20;
    /// Fraction of BALL_SPEED given to the horizontal component when the
    /// ball strikes the paddle's edge (hit position ±1)
    pub const PADDLE_DEFLECT_FACTOR: f32 = 0.8;
    /// Flat horizontal nudge added when the paddle is moving at contact
    pub const PADDLE_SPIN_NUDGE: f32 = 1.0;

    /// Timed power-up duration in ticks (5 seconds)
    pub const POWERUP_DURATION: u32 = 300;
    /// Chance that a destroyed brick drops a power-up
    pub const POWERUP_DROP_CHANCE: f64 = 0.2;
    pub const POWERUP_SIZE: i32 = 20;
    pub const POWERUP_FALL_SPEED: i32 = 3;
    /// Velocity multiplier while the slow effect is active
    pub const SLOW_MULTIPLIER: f32 = 0.7;
    /// Angular deviation of the two multi-ball spawns (degrees)
    pub const MULTI_BALL_DEVIATION_DEG: f32 = 15.0;
    /// One-shot post-spawn speed boost per level index
    pub const LEVEL_SPEED_INCREMENT: f32 = 0.1;

    /// Brick layout
    pub const BRICK_WIDTH: i32 = 60;
    pub const BRICK_HEIGHT: i32 = 20;
    pub const BRICK_PADDING: i32 = 5;
    pub const BRICK_TOP_OFFSET: i32 = 60;
    pub const BRICK_COLS: u32 = 10;

    /// Laser projectile
    pub const LASER_WIDTH: i32 = 4;
    pub const LASER_HEIGHT: i32 = 20;
    pub const LASER_RISE_SPEED: i32 = 10;

    /// Explosion blast
    pub const EXPLOSION_MAX_RADIUS: f32 = 100.0;
    pub const EXPLOSION_DURATION: u32 = 30;

    /// Floating message lifetime in ticks
    pub const MESSAGE_DURATION: u32 = 60;

    /// Session rules
    pub const MAX_LEVELS: u32 = 5;
    pub const STARTING_LIVES: u32 = 3;
    pub const SCORE_BRICK: u32 = 10;
    pub const SCORE_BLAST: u32 = 10;
    pub const SCORE_LASER: u32 = 15;
    pub const SCORE_LEVEL_CLEAR: u32 = 100;
}

/// Heading of a velocity vector in degrees, with y flipped so that "up"
/// reads positive (screen coordinates grow downward). Rounded to two
/// decimals for log output.
#[inline]
pub fn heading_degrees(vel: Vec2) -> f32 {
    let deg = (-vel.y).atan2(vel.x).to_degrees();
    (deg * 100.0).round() / 100.0
}
