//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by `GameState`)
//! - No rendering or platform dependencies

pub mod collision;
pub mod rect;
pub mod state;
pub mod tick;

pub use rect::Rect;
pub use state::{
    Ball, Brick, Explosion, FloatingMessage, GameEvent, GamePhase, GameState, Laser, Paddle,
    PowerUp, PowerUpKind, Sound,
};
pub use tick::{TickInput, generate_layout, tick};
