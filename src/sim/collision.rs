//! Collision detection and response for the rectangular play field
//!
//! The subtle part of the resolver is side inference: a corner overlap on
//! a brick must not be classified as the wrong face. Two mechanisms handle
//! this: the paddle test uses the ball's previous-tick rect (swept test),
//! and the brick test compares horizontal vs vertical overlap depth — the
//! smaller penetration identifies the struck face.

use crate::consts::*;
use crate::heading_degrees;

use super::rect::Rect;
use super::state::{Ball, Brick, GameEvent, Paddle, Sound};

/// Resolve a ball/paddle contact, if any.
///
/// Only resolves while the ball travels downward and its previous-frame
/// bottom was at or above the paddle top: a ball already departing upward,
/// or brushing the paddle's side, is left alone. At most one paddle
/// resolution happens per ball per tick.
pub fn resolve_ball_paddle(
    ball: &mut Ball,
    paddle: &Paddle,
    events: &mut Vec<GameEvent>,
) -> bool {
    if ball.collided {
        return false;
    }
    let paddle_rect = paddle.rect();
    if !ball.rect.intersects(&paddle_rect) {
        return false;
    }
    if !(ball.vel.y > 0.0 && ball.prev_rect.bottom() <= paddle_rect.top()) {
        return false;
    }

    let angle_before = heading_degrees(ball.vel);

    ball.rect.set_bottom(paddle_rect.top());
    ball.vel.y = -ball.vel.y.abs();
    ball.sync_pos_from_rect();

    // Horizontal offset within the paddle, mapped to [-1, +1]
    let hit_pos =
        (ball.rect.center_x() - paddle_rect.left()) as f32 / paddle.width as f32 * 2.0 - 1.0;
    ball.vel.x = hit_pos * BALL_SPEED * PADDLE_DEFLECT_FACTOR;

    // Moving paddle imparts spin
    if paddle.moving_left {
        ball.vel.x -= PADDLE_SPIN_NUDGE;
    } else if paddle.moving_right {
        ball.vel.x += PADDLE_SPIN_NUDGE;
    }

    ball.vel.x = ball.vel.x.clamp(-BALL_SPEED, BALL_SPEED);
    ball.normalize_speed();
    ball.sync_pos_from_rect();
    ball.collided = true;
    events.push(GameEvent::Sound(Sound::Paddle));

    log::info!(
        "Ball bounced off paddle at position {:.2}. Angle changed from {}° to {}°",
        hit_pos,
        angle_before,
        heading_degrees(ball.vel)
    );
    true
}

/// Index of the first brick overlapping `rect`, if any. Processing only
/// the first match keeps a single tick from resolving multiple brick
/// faces inconsistently.
pub fn first_brick_overlap(rect: &Rect, bricks: &[Brick]) -> Option<usize> {
    bricks.iter().position(|brick| rect.intersects(&brick.rect))
}

/// Reposition and reflect a ball off the struck brick face.
///
/// The penetrated face is the one with the smaller overlap depth: a
/// shallow horizontal overlap means a left/right face hit, otherwise
/// top/bottom. The ball is placed flush against the face and the matching
/// velocity component is forced outward.
pub fn bounce_ball_off_brick(ball: &mut Ball, brick_rect: &Rect) {
    let overlap_x = ball.rect.overlap_x(brick_rect);
    let overlap_y = ball.rect.overlap_y(brick_rect);

    if overlap_x < overlap_y {
        if ball.vel.x > 0.0 {
            ball.rect.set_right(brick_rect.left());
            ball.vel.x = -ball.vel.x.abs();
        } else {
            ball.rect.set_left(brick_rect.right());
            ball.vel.x = ball.vel.x.abs();
        }
    } else if ball.vel.y > 0.0 {
        ball.rect.set_bottom(brick_rect.top());
        ball.vel.y = -ball.vel.y.abs();
    } else {
        ball.rect.set_top(brick_rect.bottom());
        ball.vel.y = ball.vel.y.abs();
    }

    ball.sync_pos_from_rect();
}
