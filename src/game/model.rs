//! World state and geometry for the obstacle course
//! These are also the wire types mirrored between client and service

use serde::{Deserialize, Serialize};

/// Playfield width in pixels
pub const CANVAS_WIDTH: f32 = 800.0;
/// Playfield height in pixels
pub const CANVAS_HEIGHT: f32 = 500.0;
/// Flight boundary inset from the top and bottom edges
pub const BOUNDARY_VERTICAL: f32 = 30.0;
/// Flight boundary inset from the left and right edges
pub const BOUNDARY_HORIZONTAL: f32 = 20.0;
/// Inward shrink applied to both hitboxes before overlap testing, so
/// sprites have to visibly overlap before a crash registers
pub const COLLISION_PADDING: f32 = 8.0;

/// Axis-aligned rectangle used for hitbox tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Shrink the rectangle inward by `amount` on every side.
    pub fn shrunk(self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: self.width - 2.0 * amount,
            height: self.height - 2.0 * amount,
        }
    }

    /// Strict overlap test; touching edges do not count.
    pub fn overlaps(self, other: Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// The player's airplane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Airplane {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Airplane {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 250.0,
            width: 80.0,
            height: 35.0,
        }
    }
}

impl Airplane {
    pub fn hitbox(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Padded AABB test against an obstacle.
    pub fn collides_with(&self, obstacle: &Obstacle) -> bool {
        self.hitbox()
            .shrunk(COLLISION_PADDING)
            .overlaps(obstacle.hitbox().shrunk(COLLISION_PADDING))
    }
}

/// Obstacle variants; thunder is narrower and taller than the rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Bird,
    Thunder,
    Cloud,
    Ufo,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [Self::Bird, Self::Thunder, Self::Cloud, Self::Ufo];

    /// Sprite dimensions (width, height)
    pub fn size(self) -> (f32, f32) {
        match self {
            Self::Thunder => (30.0, 70.0),
            _ => (50.0, 50.0),
        }
    }
}

/// A moving obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Leftward speed in pixels per tick, fixed at spawn time
    pub speed: f32,
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn hitbox(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// True once the obstacle has fully left the playfield on the left.
    pub fn is_cleared(&self) -> bool {
        self.x + self.width < 0.0
    }
}

/// Full round state. Serialized in camelCase because this is the wire
/// snapshot exchanged with the remote authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub airplane: Airplane,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub game_over: bool,
    pub game_started: bool,
    pub game_speed: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            airplane: Airplane::default(),
            obstacles: Vec::new(),
            score: 0,
            game_over: false,
            game_started: false,
            game_speed: 1.0,
        }
    }
}

impl GameState {
    /// True while the round is running
    pub fn is_active(&self) -> bool {
        self.game_started && !self.game_over
    }
}
