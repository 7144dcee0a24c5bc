use std::time::{Duration, Instant};

/// Virtual field size. Renderers scale this onto whatever area they get.
pub const FIELD_WIDTH: f64 = 100.0;
pub const FIELD_HEIGHT: f64 = 100.0;
/// How far past the edge a word travels before it counts as missed.
pub const OFFSCREEN_MARGIN: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

#[derive(Clone, Debug)]
pub struct FallingWord {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Field units per second.
    pub speed: f64,
    pub direction: Direction,
    pub hit: bool,
    pub opacity: f64,
    pub spawned_at: Instant,
}

impl FallingWord {
    pub fn new(text: String, x: f64, speed: f64, direction: Direction, now: Instant) -> Self {
        let y = match direction {
            Direction::Down => 0.0,
            Direction::Up => FIELD_HEIGHT,
        };
        Self {
            text,
            x,
            y,
            speed,
            direction,
            hit: false,
            opacity: 1.0,
            spawned_at: now,
        }
    }

    /// Advance by `dt`. Hit words keep drifting while they fade over `fade`.
    pub fn update(&mut self, dt: Duration, fade: Duration) {
        let secs = dt.as_secs_f64();
        match self.direction {
            Direction::Down => self.y += self.speed * secs,
            Direction::Up => self.y -= self.speed * secs,
        }
        if self.hit {
            let fade_secs = fade.as_secs_f64();
            if fade_secs <= 0.0 {
                self.opacity = 0.0;
            } else {
                self.opacity = (self.opacity - secs / fade_secs).max(0.0);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.hit
    }

    pub fn is_off_screen(&self) -> bool {
        match self.direction {
            Direction::Down => self.y > FIELD_HEIGHT + OFFSCREEN_MARGIN,
            Direction::Up => self.y < -OFFSCREEN_MARGIN,
        }
    }

    pub fn is_faded(&self) -> bool {
        self.hit && self.opacity <= 0.0
    }
}
