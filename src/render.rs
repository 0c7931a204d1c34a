//! Draw-descriptor generation
//!
//! The engine never touches a real graphics API. Each frame the shell asks
//! for a flat list of primitives (filled rects, alpha-blended circles, text
//! labels) and hands them to whatever renderer it has. All presentation
//! decisions — palettes, damage tinting, HUD layout, overlays — live here
//! so the simulation stays free of them.

use glam::Vec2;

use crate::consts::*;
use crate::sim::{GamePhase, GameState, PowerUpKind, Rect};

/// An RGB color (alpha is carried per-primitive where it matters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 255, 0);
pub const YELLOW: Color = Color::rgb(255, 255, 0);
pub const ORANGE: Color = Color::rgb(255, 165, 0);
pub const PURPLE: Color = Color::rgb(160, 32, 240);
pub const EXPLOSION_COLOR: Color = Color::rgb(255, 100, 0);
pub const SHRINK_COLOR: Color = Color::rgb(0, 255, 255);
pub const SLOW_COLOR: Color = Color::rgb(255, 192, 203);
pub const LASER_COLOR: Color = Color::rgb(255, 0, 255);

/// Undamaged brick palette, cycled by layout row
const ROW_PALETTE: [Color; 5] = [RED, GREEN, YELLOW, ORANGE, PURPLE];

/// Background colors, cycled by level
const LEVEL_BACKGROUNDS: [Color; 6] = [
    BLACK,
    Color::rgb(10, 10, 50),
    Color::rgb(50, 10, 10),
    Color::rgb(10, 50, 10),
    Color::rgb(50, 50, 10),
    Color::rgb(10, 50, 50),
];

/// A single draw request for the renderer collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FilledRect {
        rect: Rect,
        color: Color,
    },
    FilledCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        /// 0.0 transparent .. 1.0 opaque
        alpha: f32,
    },
    Label {
        text: String,
        center: Vec2,
        color: Color,
        large: bool,
        alpha: f32,
    },
}

/// Clear color for the current level
pub fn background(level: u32) -> Color {
    LEVEL_BACKGROUNDS[level as usize % LEVEL_BACKGROUNDS.len()]
}

/// Brick fill color: row palette while pristine, then a red→blue lerp by
/// remaining-hit fraction as it takes damage.
pub fn brick_color(hits: u32, max_hits: u32, row: u32) -> Color {
    if hits >= max_hits {
        return ROW_PALETTE[row as usize % ROW_PALETTE.len()];
    }
    let intensity = (255 * hits / max_hits.max(1)) as u8;
    Color::rgb(intensity, 0, 255 - intensity)
}

/// Paddle tint for the active power-up, if any
fn paddle_color(state: &GameState) -> Color {
    if state.paddle.has(PowerUpKind::ExpandPaddle) {
        ORANGE
    } else if state.paddle.has(PowerUpKind::ShrinkPaddle) {
        SHRINK_COLOR
    } else if state.paddle.has(PowerUpKind::LaserPaddle) {
        LASER_COLOR
    } else {
        BLUE
    }
}

fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::ExpandPaddle => ORANGE,
        PowerUpKind::ExtraLife => PURPLE,
        PowerUpKind::MultiBall => YELLOW,
        PowerUpKind::ShrinkPaddle => SHRINK_COLOR,
        PowerUpKind::SlowBall => SLOW_COLOR,
        PowerUpKind::LaserPaddle => LASER_COLOR,
        PowerUpKind::ExplosiveBall => RED,
    }
}

/// Build the complete draw list for one frame: entities, HUD, overlays.
pub fn build_scene(state: &GameState) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();

    for brick in &state.bricks {
        cmds.push(DrawCmd::FilledRect {
            rect: brick.rect,
            color: brick_color(brick.hits, brick.max_hits, brick.row),
        });
    }

    for powerup in &state.powerups {
        cmds.push(DrawCmd::FilledRect {
            rect: powerup.rect,
            color: powerup_color(powerup.kind),
        });
    }

    for laser in &state.lasers {
        cmds.push(DrawCmd::FilledRect {
            rect: laser.rect,
            color: YELLOW,
        });
    }

    cmds.push(DrawCmd::FilledRect {
        rect: state.paddle.rect(),
        color: paddle_color(state),
    });

    for ball in &state.balls {
        cmds.push(DrawCmd::FilledCircle {
            center: Vec2::new(ball.rect.center_x() as f32, ball.rect.center_y() as f32),
            radius: ball.radius as f32,
            color: if ball.explosive { RED } else { WHITE },
            alpha: 1.0,
        });
    }

    for explosion in &state.explosions {
        cmds.push(DrawCmd::FilledCircle {
            center: explosion.center,
            radius: explosion.current_radius,
            color: EXPLOSION_COLOR,
            alpha: explosion.alpha(),
        });
    }

    for message in &state.messages {
        cmds.push(DrawCmd::Label {
            text: message.text.clone(),
            center: message.pos,
            color: WHITE,
            large: false,
            alpha: message.alpha(),
        });
    }

    hud(state, &mut cmds);
    overlays(state, &mut cmds);

    cmds
}

fn label(text: String, x: f32, y: f32, large: bool) -> DrawCmd {
    DrawCmd::Label {
        text,
        center: Vec2::new(x, y),
        color: WHITE,
        large,
        alpha: 1.0,
    }
}

fn hud(state: &GameState, cmds: &mut Vec<DrawCmd>) {
    let w = SCREEN_WIDTH as f32;
    cmds.push(label(format!("Score: {}", state.score), 70.0, 20.0, false));
    cmds.push(label(format!("Lives: {}", state.lives), w - 80.0, 20.0, false));
    cmds.push(label(format!("Level: {}", state.level), 70.0, 50.0, false));
    cmds.push(label(
        format!("High Score: {}", state.high_score),
        w - 110.0,
        50.0,
        false,
    ));
}

fn overlays(state: &GameState, cmds: &mut Vec<DrawCmd>) {
    let cx = SCREEN_WIDTH as f32 / 2.0;
    let cy = SCREEN_HEIGHT as f32 / 2.0;

    match state.phase {
        GamePhase::LevelIntro => {
            cmds.push(label(format!("Level {}", state.level), cx, cy - 50.0, true));
            cmds.push(label("Press SPACE to Start".into(), cx, cy + 10.0, false));
        }
        GamePhase::GameOver => {
            let message = if state.win {
                "CONGRATULATIONS! YOU WIN!"
            } else {
                "GAME OVER"
            };
            cmds.push(label(message.into(), cx, cy, true));
            cmds.push(label(
                "Press R to Restart or Q to Quit".into(),
                cx,
                cy + 50.0,
                false,
            ));
        }
        GamePhase::Playing => {
            if state.paused {
                cmds.push(label("PAUSED".into(), cx, cy, true));
                cmds.push(label("Press P to Resume".into(), cx, cy + 50.0, false));
            }
        }
    }
}
