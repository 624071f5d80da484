//! Companion that trails the player with a damped spring.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::Direction;

/// Rest radius around the trailing point, in tiles.
pub const STOP_RADIUS: f32 = 1.4;
/// Spring gain per tick.
pub const SPRING: f32 = 0.16;
/// Velocity damping per tick.
pub const DAMPING: f32 = 0.72;
/// How far behind the player the trailing point sits.
const TRAIL_OFFSET: f32 = 1.2;

const MIN_SPEED: f32 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompanionState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Direction,
}

impl CompanionState {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            facing: Direction::Down,
        }
    }

    /// One tick of follow physics. The target sits behind the player,
    /// opposite their facing; outside the rest radius a spring force pulls
    /// the companion in, inside it the companion settles. Returns whether
    /// the companion visibly moved.
    pub fn follow(&mut self, player_x: f32, player_y: f32, player_facing: Direction) -> bool {
        let (target_x, target_y) = match player_facing {
            Direction::Up => (player_x, player_y + TRAIL_OFFSET),
            Direction::Down => (player_x, player_y - TRAIL_OFFSET),
            Direction::Left => (player_x + TRAIL_OFFSET, player_y),
            Direction::Right => (player_x - TRAIL_OFFSET, player_y),
        };

        let dx = target_x - self.x;
        let dy = target_y - self.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance > STOP_RADIUS {
            let force = (distance - STOP_RADIUS) * SPRING;
            self.vx = self.vx * DAMPING + dx / distance * force;
            self.vy = self.vy * DAMPING + dy / distance * force;
        } else {
            self.vx = 0.0;
            self.vy = 0.0;
        }

        let speed = self.vx.abs() + self.vy.abs();
        if speed < MIN_SPEED {
            return false;
        }

        self.x += self.vx;
        self.y += self.vy;

        // One dominant axis, so the facing does not flicker on diagonals.
        if self.vx.abs() > self.vy.abs() {
            self.facing = if self.vx < 0.0 {
                Direction::Left
            } else {
                Direction::Right
            };
        } else {
            self.facing = if self.vy < 0.0 {
                Direction::Up
            } else {
                Direction::Down
            };
        }
        true
    }

    /// Nearest tile, for rendering.
    pub fn tile(&self) -> (u16, u16) {
        (
            self.x.round().max(0.0) as u16,
            self.y.round().max(0.0) as u16,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_toward_trailing_point() {
        let mut companion = CompanionState::new(0.0, 0.0);
        let start_gap = 10.0 - companion.x;
        for _ in 0..200 {
            companion.follow(10.0, 0.0, Direction::Right);
        }
        // Target sits one offset west of the player.
        let gap = (10.0 - TRAIL_OFFSET - companion.x).abs() + companion.y.abs();
        assert!(gap <= STOP_RADIUS + 0.5, "gap {gap} after follow");
        assert!(gap < start_gap);
    }

    #[test]
    fn rests_inside_stop_radius() {
        let mut companion = CompanionState::new(5.0, 5.0);
        assert!(!companion.follow(5.5, 5.0, Direction::Right));
        assert_eq!(companion.vx, 0.0);
        assert_eq!(companion.vy, 0.0);
    }

    #[test]
    fn facing_follows_dominant_axis() {
        let mut companion = CompanionState::new(0.0, 0.0);
        for _ in 0..5 {
            companion.follow(12.0, 1.0, Direction::Right);
        }
        assert_eq!(companion.facing, Direction::Right);
    }
}
