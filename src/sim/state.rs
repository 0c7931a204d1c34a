//! Game state and core simulation types
//!
//! All state that must be persisted for replay/determinism lives here.
//! The session state is a single owned struct; nothing in the engine is
//! ambient or global.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level label shown, waiting for the start action
    LevelIntro,
    /// Active gameplay
    Playing,
    /// Run ended; `GameState::win` distinguishes victory from defeat
    GameOver,
}

/// Named sound triggers consumed by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Paddle,
    Brick,
    Wall,
    GameOver,
    PowerUp,
    Laser,
    Explosion,
}

/// Events emitted by the simulation for the platform shell.
///
/// External I/O (sound playback, high-score persistence) is fire-and-forget:
/// the shell drains these after each tick and failures never feed back into
/// engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(Sound),
    /// The in-run score exceeded the known high score; persist it
    HighScore(u32),
    /// Multi-ball was collected at the ball cap and refused
    MultiBallRefused,
}

/// Power-up kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PowerUpKind {
    ExpandPaddle,
    ShrinkPaddle,
    ExtraLife,
    MultiBall,
    SlowBall,
    LaserPaddle,
    ExplosiveBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::ExpandPaddle,
        PowerUpKind::ShrinkPaddle,
        PowerUpKind::ExtraLife,
        PowerUpKind::MultiBall,
        PowerUpKind::SlowBall,
        PowerUpKind::LaserPaddle,
        PowerUpKind::ExplosiveBall,
    ];

    /// Instant power-ups apply immediately and do not clear active timed
    /// effects; everything else is mutually exclusive with running timers.
    pub fn is_instant(self) -> bool {
        matches!(self, PowerUpKind::ExtraLife | PowerUpKind::MultiBall)
    }

    /// Pickup announcement text
    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::ExpandPaddle => "Expanded Paddle!",
            PowerUpKind::ShrinkPaddle => "Shrunk Paddle!",
            PowerUpKind::ExtraLife => "Extra Life!",
            PowerUpKind::MultiBall => "Multi-Ball!",
            PowerUpKind::SlowBall => "Slowed Ball!",
            PowerUpKind::LaserPaddle => "Laser Paddle!",
            PowerUpKind::ExplosiveBall => "Explosive Ball!",
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Center x as float; the rect is derived each access
    pub x: f32,
    pub width: i32,
    pub height: i32,
    pub speed: f32,
    /// Active timed power-ups mapped to remaining ticks
    pub active: BTreeMap<PowerUpKind, u32>,
    /// Movement flags, derived from input each tick (used for spin)
    pub moving_left: bool,
    pub moving_right: bool,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: SCREEN_WIDTH as f32 / 2.0,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            active: BTreeMap::new(),
            moving_left: false,
            moving_right: false,
        }
    }
}

impl Paddle {
    /// Hitbox anchored to the bottom of the play field
    pub fn rect(&self) -> Rect {
        let top = SCREEN_HEIGHT - PADDLE_BOTTOM_MARGIN - self.height;
        Rect::new(self.x.round() as i32 - self.width / 2, top, self.width, self.height)
    }

    /// Apply one tick of movement input and advance power-up timers.
    /// Returns the kinds that expired this tick (already deactivated).
    pub fn update(&mut self, left: bool, right: bool) -> Vec<PowerUpKind> {
        self.moving_left = left;
        self.moving_right = right;

        if self.moving_left {
            self.x -= self.speed;
        }
        if self.moving_right {
            self.x += self.speed;
        }

        // Keep the paddle within the screen
        let half = self.width as f32 / 2.0;
        self.x = self.x.clamp(half, SCREEN_WIDTH as f32 - half);

        let mut expired = Vec::new();
        for (kind, timer) in self.active.iter_mut() {
            *timer = timer.saturating_sub(1);
            if *timer == 0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.deactivate(*kind);
        }
        expired
    }

    /// Start (or restart) a timed power-up on this paddle.
    pub fn activate(&mut self, kind: PowerUpKind) {
        log::info!("Activating power-up: {kind:?}");
        self.active.insert(kind, POWERUP_DURATION);
        match kind {
            PowerUpKind::ExpandPaddle => {
                self.width = EXPANDED_WIDTH.min(SCREEN_WIDTH - PADDLE_WIDTH_MARGIN);
                log::debug!("Paddle expanded to width {}", self.width);
            }
            PowerUpKind::ShrinkPaddle => {
                self.width = SHRUNK_WIDTH.max(PADDLE_MIN_WIDTH);
                log::debug!("Paddle shrunk to width {}", self.width);
            }
            _ => {}
        }
    }

    /// Remove one active power-up, restoring paddle geometry.
    pub fn deactivate(&mut self, kind: PowerUpKind) {
        log::info!("Deactivating power-up: {kind:?}");
        self.active.remove(&kind);
        if matches!(kind, PowerUpKind::ExpandPaddle | PowerUpKind::ShrinkPaddle) {
            self.width = PADDLE_WIDTH;
            log::debug!("Paddle restored to original width {}", self.width);
        }
    }

    /// Clear every active timed power-up at once.
    pub fn clear_active(&mut self) {
        for kind in self.active.keys().copied().collect::<Vec<_>>() {
            self.deactivate(kind);
        }
    }

    pub fn has(&self, kind: PowerUpKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn recenter(&mut self) {
        self.x = SCREEN_WIDTH as f32 / 2.0;
        log::debug!("Paddle centered at x={}", self.x);
    }
}

/// A ball entity
///
/// The float position (top-left) is authoritative; the hitbox rect is
/// derived by rounding on each move. After collision repositioning of the
/// rect, the float position is re-synced from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: i32,
    pub rect: Rect,
    /// Rect as of the previous tick, for swept collision-side inference
    pub prev_rect: Rect,
    /// Destroys nearby bricks on its next brick impact
    pub explosive: bool,
    pub slow: bool,
    pub speed_multiplier: f32,
    /// One-shot post-spawn boost, applied exactly once
    pub speed_increment: f32,
    pub speed_increment_applied: bool,
    /// At most one paddle/brick resolution per tick
    pub collided: bool,
}

impl Ball {
    /// Ball launched from `center` in a random diagonal direction (up,
    /// left or right chosen by the session RNG).
    pub fn new(center: Vec2, speed_increment: f32, rng: &mut Pcg32) -> Self {
        let diag = BALL_SPEED / std::f32::consts::SQRT_2;
        let speed_x = if rng.random_bool(0.5) { diag } else { -diag };
        Self::with_velocity(center, Vec2::new(speed_x, -diag), speed_increment)
    }

    /// Ball with an explicit velocity (multi-ball spawns).
    pub fn with_velocity(center: Vec2, vel: Vec2, speed_increment: f32) -> Self {
        let rect = Rect::from_center(
            center.x.round() as i32,
            center.y.round() as i32,
            BALL_RADIUS * 2,
            BALL_RADIUS * 2,
        );
        let mut ball = Self {
            pos: Vec2::new(rect.x as f32, rect.y as f32),
            vel,
            radius: BALL_RADIUS,
            rect,
            prev_rect: rect,
            explosive: false,
            slow: false,
            speed_multiplier: 1.0,
            speed_increment,
            speed_increment_applied: false,
            collided: false,
        };
        ball.normalize_speed();
        log::debug!(
            "Ball initialized at ({}, {}) with speed ({:.2}, {:.2})",
            ball.pos.x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y
        );
        ball
    }

    /// Rescale velocity to the canonical magnitude, preserving direction.
    /// Guards against a degenerate zero vector.
    pub fn normalize_speed(&mut self) {
        let speed = self.vel.length();
        if speed != 0.0 {
            self.vel = self.vel / speed * BALL_SPEED * self.speed_multiplier;
        }
    }

    /// Re-sync the authoritative float position from the hitbox after the
    /// resolver has repositioned it.
    pub fn sync_pos_from_rect(&mut self) {
        self.pos.x = self.rect.x as f32;
        self.pos.y = self.rect.y as f32;
    }

    /// One tick of motion: pending spawn boost, slow multiplier, position
    /// integration, and the three static wall bounces. The bottom edge has
    /// no wall; leaving it is the out-of-bounds condition handled by the
    /// session controller.
    pub fn advance(&mut self, events: &mut Vec<GameEvent>) {
        if self.speed_increment != 0.0 && !self.speed_increment_applied {
            let angle = self.vel.y.atan2(self.vel.x);
            let boosted = BALL_SPEED * (1.0 + self.speed_increment);
            self.vel = Vec2::new(angle.cos(), angle.sin()) * boosted;
            self.speed_increment_applied = true;
            self.normalize_speed();
            log::debug!(
                "Ball speed incremented to ({:.2}, {:.2})",
                self.vel.x,
                self.vel.y
            );
        }

        if self.slow {
            self.speed_multiplier = SLOW_MULTIPLIER;
            self.normalize_speed();
        }

        self.prev_rect = self.rect;
        self.pos += self.vel;
        self.rect.x = self.pos.x.round() as i32;
        self.rect.y = self.pos.y.round() as i32;

        if self.rect.left() <= 0 {
            events.push(GameEvent::Sound(Sound::Wall));
            self.rect.set_left(0);
            self.vel.x = self.vel.x.abs();
            self.pos.x = (self.rect.x + 1) as f32;
            self.normalize_speed();
            log::info!(
                "Ball bounced off left wall. New speed: ({:.2}, {:.2})",
                self.vel.x,
                self.vel.y
            );
        }

        if self.rect.right() >= SCREEN_WIDTH {
            events.push(GameEvent::Sound(Sound::Wall));
            self.rect.set_right(SCREEN_WIDTH);
            self.vel.x = -self.vel.x.abs();
            self.pos.x = (self.rect.x - 1) as f32;
            self.normalize_speed();
            log::info!(
                "Ball bounced off right wall. New speed: ({:.2}, {:.2})",
                self.vel.x,
                self.vel.y
            );
        }

        if self.rect.top() <= 0 {
            events.push(GameEvent::Sound(Sound::Wall));
            self.rect.set_top(0);
            self.vel.y = self.vel.y.abs();
            self.pos.y = (self.rect.y + 1) as f32;
            self.normalize_speed();
            log::info!(
                "Ball bounced off top wall. New speed: ({:.2}, {:.2})",
                self.vel.x,
                self.vel.y
            );
        }
    }

    pub fn apply_slow(&mut self) {
        if !self.slow {
            log::info!("Applying slow ball effect");
            self.slow = true;
            self.speed_multiplier = SLOW_MULTIPLIER;
            self.normalize_speed();
        }
    }

    pub fn remove_slow(&mut self) {
        if self.slow {
            log::info!("Removing slow ball effect");
            self.slow = false;
            self.speed_multiplier = 1.0;
            self.normalize_speed();
        }
    }

    pub fn make_explosive(&mut self) {
        if !self.explosive {
            self.explosive = true;
            log::debug!("Ball is now explosive");
        }
    }

    pub fn revert_to_regular(&mut self) {
        if self.explosive {
            self.explosive = false;
            log::debug!("Ball reverted to regular state");
        }
    }
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub hits: u32,
    pub max_hits: u32,
    /// Layout row, used by the renderer for the undamaged palette
    pub row: u32,
}

impl Brick {
    pub fn new(x: i32, y: i32, hits: u32, row: u32) -> Self {
        Self {
            rect: Rect::new(x, y, BRICK_WIDTH, BRICK_HEIGHT),
            hits,
            max_hits: hits,
            row,
        }
    }

    /// Apply one point of damage. Returns true when the brick is depleted;
    /// the controller owns removal, scoring, and the drop roll.
    pub fn hit(&mut self) -> bool {
        self.hits = self.hits.saturating_sub(1);
        log::info!(
            "Brick at ({}, {}) was hit. Remaining hits: {}",
            self.rect.x,
            self.rect.y,
            self.hits
        );
        self.hits == 0
    }
}

/// A falling power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub rect: Rect,
}

impl PowerUp {
    pub fn new(center_x: i32, center_y: i32, kind: PowerUpKind) -> Self {
        log::debug!("PowerUp {kind:?} created at ({center_x}, {center_y})");
        Self {
            kind,
            rect: Rect::from_center(center_x, center_y, POWERUP_SIZE, POWERUP_SIZE),
        }
    }

    /// One tick of falling. Returns false once the pickup left the field.
    pub fn fall(&mut self) -> bool {
        self.rect.y += POWERUP_FALL_SPEED;
        if self.rect.top() > SCREEN_HEIGHT {
            log::debug!("PowerUp {:?} removed for moving out of screen", self.kind);
            return false;
        }
        true
    }
}

/// A rising laser projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub rect: Rect,
}

impl Laser {
    pub fn new(center_x: i32, bottom: i32) -> Self {
        let mut rect = Rect::from_center(center_x, 0, LASER_WIDTH, LASER_HEIGHT);
        rect.set_bottom(bottom);
        log::debug!("Laser created at ({center_x}, {bottom})");
        Self { rect }
    }

    /// One tick of rising. Returns false once the laser left the field.
    pub fn rise(&mut self) -> bool {
        self.rect.y -= LASER_RISE_SPEED;
        self.rect.bottom() >= 0
    }
}

/// An expanding blast-radius animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub current_radius: f32,
    pub max_radius: f32,
    pub frame: u32,
    pub duration: u32,
}

impl Explosion {
    pub fn new(center: Vec2) -> Self {
        log::debug!("Explosion created at ({}, {})", center.x, center.y);
        Self {
            center,
            current_radius: 10.0,
            max_radius: EXPLOSION_MAX_RADIUS,
            frame: 0,
            duration: EXPLOSION_DURATION,
        }
    }

    /// Grow toward the target radius over the remaining frames. Returns
    /// false once the animation has elapsed.
    pub fn tick(&mut self) -> bool {
        if self.frame >= self.duration {
            return false;
        }
        let remaining = (self.duration - self.frame) as f32;
        self.current_radius += (self.max_radius - self.current_radius) / remaining;
        self.frame += 1;
        true
    }

    /// Fade from opaque to transparent over the duration.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.frame as f32 / self.duration as f32).clamp(0.0, 1.0)
    }
}

/// A floating "power-up collected" announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingMessage {
    pub text: String,
    pub pos: Vec2,
    pub frame: u32,
    pub duration: u32,
}

impl FloatingMessage {
    pub fn new(text: impl Into<String>, pos: Vec2) -> Self {
        Self {
            text: text.into(),
            pos,
            frame: 0,
            duration: MESSAGE_DURATION,
        }
    }

    /// Drift downward and age. Returns false once fully faded.
    pub fn tick(&mut self) -> bool {
        if self.frame >= self.duration {
            return false;
        }
        self.pos.y += 1.0;
        self.frame += 1;
        true
    }

    pub fn alpha(&self) -> f32 {
        (1.0 - self.frame as f32 / self.duration as f32).clamp(0.0, 1.0)
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The single seedable randomness source for the whole engine
    pub rng: Pcg32,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Best score known from the external store; updated in-run
    pub high_score: u32,
    pub win: bool,
    /// Suspends simulation ticks without altering state
    pub paused: bool,
    pub phase: GamePhase,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub powerups: Vec<PowerUp>,
    pub lasers: Vec<Laser>,
    pub explosions: Vec<Explosion>,
    pub messages: Vec<FloatingMessage>,
    /// Outbound events, drained by the shell after each tick
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh session at level 1, waiting in the level intro.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            high_score: 0,
            win: false,
            paused: false,
            phase: GamePhase::LevelIntro,
            paddle: Paddle::default(),
            balls: Vec::new(),
            bricks: Vec::new(),
            powerups: Vec::new(),
            lasers: Vec::new(),
            explosions: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Center of the play field, where fresh balls spawn.
    pub fn field_center() -> Vec2 {
        Vec2::new(SCREEN_WIDTH as f32 / 2.0, SCREEN_HEIGHT as f32 / 2.0)
    }

    /// Spawn a single ball at the field center with the given one-shot
    /// speed boost.
    pub fn spawn_ball(&mut self, speed_increment: f32) {
        let ball = Ball::new(Self::field_center(), speed_increment, &mut self.rng);
        self.balls.push(ball);
    }

    /// Restart action from the game-over screen: back to level 1 with
    /// score/lives reset and a fresh paddle. The RNG stream and the known
    /// high score carry over.
    pub fn reset(&mut self) {
        log::info!("Resetting game");
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = 1;
        self.win = false;
        self.paused = false;
        self.phase = GamePhase::LevelIntro;
        self.paddle = Paddle::default();
        self.balls.clear();
        self.bricks.clear();
        self.powerups.clear();
        self.lasers.clear();
        self.explosions.clear();
        self.messages.clear();
    }
}
