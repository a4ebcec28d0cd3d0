//! Geometry, timings and bindings for a session.
//!
//! Every value has a default, so a partial `flappy.json` only overrides what
//! it names. The config is constant once the game has loaded.
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

// ==================== Defaults ====================
mod defaults {
    pub const FIELD_WIDTH: i32 = 1400;
    pub const FIELD_HEIGHT: i32 = 600;
    pub const BIRD_WIDTH: i32 = 160;
    pub const BIRD_HEIGHT: i32 = 50;
    pub const BIRD_LEFT: i32 = 100;
    pub const OBSTACLE_WIDTH: i32 = 52;
    pub const INITIAL_GAP: i32 = 80;
    // equal to INITIAL_GAP, so the gap never shrinks
    pub const MIN_GAP: i32 = 80;
    pub const GAP_SHRINK: i32 = 5;
    // re-entry column is FIELD_WIDTH - REENTRY_OFFSET
    pub const REENTRY_OFFSET: i32 = 480;
    pub const BASE_SPEED: i32 = 25;
    pub const MOVE_STEP: i32 = 10;
    pub const ENGAGEMENT_WIDTH: i32 = 80;
    pub const TICK_MS: f64 = 24.0;
    pub const EFFECT_MS: i32 = 3000;
    pub const SCORE_COOKIE: &str = "highestScore";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            width: defaults::FIELD_WIDTH,
            height: defaults::FIELD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BirdConfig {
    pub width: i32,
    pub height: i32,
    /// Draw column, only used by the renderer
    pub left: i32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        BirdConfig {
            width: defaults::BIRD_WIDTH,
            height: defaults::BIRD_HEIGHT,
            left: defaults::BIRD_LEFT,
        }
    }
}

/// `KeyboardEvent.code` values for the two movement keys
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            up: "KeyW".to_string(),
            down: "KeyS".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetPaths {
    pub background: String,
    pub bird: String,
    pub obstacle: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        AssetPaths {
            background: "images/background.png".to_string(),
            bird: "images/bird.png".to_string(),
            obstacle: "images/obstacle.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub field: FieldConfig,
    pub bird: BirdConfig,
    pub obstacle_width: i32,
    pub initial_gap: i32,
    pub min_gap: i32,
    pub gap_shrink: i32,
    pub reentry_offset: i32,
    pub base_speed: i32,
    pub move_step: i32,
    /// Width of the horizontal window, starting at the bird width, in which
    /// the obstacle can hit the bird
    pub engagement_width: i32,
    pub tick_ms: f64,
    pub effect_ms: i32,
    pub keys: KeyBindings,
    pub assets: AssetPaths,
    pub score_cookie: String,
    pub clips: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            field: FieldConfig::default(),
            bird: BirdConfig::default(),
            obstacle_width: defaults::OBSTACLE_WIDTH,
            initial_gap: defaults::INITIAL_GAP,
            min_gap: defaults::MIN_GAP,
            gap_shrink: defaults::GAP_SHRINK,
            reentry_offset: defaults::REENTRY_OFFSET,
            base_speed: defaults::BASE_SPEED,
            move_step: defaults::MOVE_STEP,
            engagement_width: defaults::ENGAGEMENT_WIDTH,
            tick_ms: defaults::TICK_MS,
            effect_ms: defaults::EFFECT_MS,
            keys: KeyBindings::default(),
            assets: AssetPaths::default(),
            score_cookie: defaults::SCORE_COOKIE.to_string(),
            clips: (1..=3).map(|n| format!("clips/crash-{}.mp4", n)).collect(),
        }
    }
}

impl GameConfig {
    /// Gap between the two obstacle segments for a given score
    /// - shrinks by `gap_shrink` per point
    /// - never below `min_gap`
    pub fn gap(&self, score: u32) -> i32 {
        let shrink = (score as i64).saturating_mul(self.gap_shrink as i64);
        let next = (self.initial_gap as i64)
            .saturating_sub(shrink)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        next.max(self.min_gap)
    }

    /// Horizontal obstacle displacement per tick. Ignores the score.
    pub fn speed(&self, _score: u32) -> i32 {
        self.base_speed * 10 / 10
    }

    pub fn initial_position(&self) -> i32 {
        self.field.width
    }

    pub fn min_position(&self) -> i32 {
        -self.obstacle_width
    }

    pub fn reentry_position(&self) -> i32 {
        self.field.width - self.reentry_offset
    }

    pub fn bird_center(&self) -> i32 {
        self.field.height / 2 - self.bird.height / 2
    }

    /// Lowest position the top edge of the bird can take
    pub fn bird_floor(&self) -> i32 {
        self.field.height - self.bird.height
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.field.width > 0 && self.field.height > 0,
            "field must have a positive size, got {}x{}",
            self.field.width,
            self.field.height
        );
        ensure!(
            self.bird.width > 0 && self.bird.height > 0 && self.bird.height < self.field.height,
            "bird of {}x{} does not fit the field",
            self.bird.width,
            self.bird.height
        );
        ensure!(
            self.obstacle_width > 0 && self.obstacle_width < self.field.width,
            "obstacle width {} does not fit the field",
            self.obstacle_width
        );
        ensure!(
            self.min_gap > 0 && self.initial_gap >= self.min_gap,
            "gap must satisfy 0 < min ({}) <= initial ({})",
            self.min_gap,
            self.initial_gap
        );
        ensure!(
            self.initial_gap < self.field.height,
            "gap {} leaves no room for obstacles in a field {} high",
            self.initial_gap,
            self.field.height
        );
        ensure!(
            self.gap_shrink >= 0,
            "gap shrink {} would widen the gap as the score grows",
            self.gap_shrink
        );
        // in i64, reentry_position() itself could overflow here
        let reentry = self.field.width as i64 - self.reentry_offset as i64;
        ensure!(
            reentry > self.min_position() as i64 && reentry <= self.field.width as i64,
            "re-entry column {} must lie in ({}, {}]",
            reentry,
            self.min_position(),
            self.field.width
        );
        ensure!(
            self.engagement_width >= 0,
            "engagement width must not be negative, got {}",
            self.engagement_width
        );
        ensure!(
            self.effect_ms >= 0,
            "effect duration must not be negative, got {}",
            self.effect_ms
        );
        ensure!(self.base_speed > 0, "base speed must be positive");
        ensure!(self.move_step > 0, "move step must be positive");
        ensure!(
            self.tick_ms > 0.0,
            "tick period must be positive, got {}",
            self.tick_ms
        );
        Ok(())
    }
}
