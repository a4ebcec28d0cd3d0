use crate::config::GameConfig;
use rand::Rng;

/// An obstacle pair sharing one column
/// - `gap_height` is the height of the top segment
/// - `gap_size` is the empty space below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub position: i32,
    pub gap_height: i32,
    pub gap_size: i32,
}

/// Result of one obstacle step. A recycle is the only scoring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(Obstacle),
    Recycled(Obstacle),
}

impl Obstacle {
    /// Parked at the right edge, before the first round
    pub fn parked(config: &GameConfig) -> Self {
        Obstacle {
            position: config.initial_position(),
            gap_height: 0,
            gap_size: config.gap(0),
        }
    }

    /// Round start: random column and random height
    pub fn spawn<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let gap_height = Self::draw_height(config, 0, rng);
        let columns = (config.field.width - config.obstacle_width).max(1);
        Obstacle {
            position: rng.gen_range(0..columns),
            gap_height,
            gap_size: config.gap(0),
        }
    }

    /// Uniform in `[0, field height - gap(score))`
    pub fn draw_height<R: Rng + ?Sized>(config: &GameConfig, score: u32, rng: &mut R) -> i32 {
        let room = (config.field.height - config.gap(score)).max(1);
        rng.gen_range(0..room)
    }

    pub fn advance<R: Rng + ?Sized>(self, score: u32, config: &GameConfig, rng: &mut R) -> Advance {
        if self.position >= config.min_position() {
            Advance::Moved(Obstacle {
                position: self.position - config.speed(score),
                ..self
            })
        } else {
            Advance::Recycled(Obstacle {
                position: config.reentry_position(),
                gap_height: Self::draw_height(config, score, rng),
                gap_size: config.gap(score),
            })
        }
    }

    pub fn top_height(&self) -> i32 {
        self.gap_height
    }

    pub fn bottom_height(&self, config: &GameConfig) -> i32 {
        config.field.height - self.gap_size - self.gap_height
    }

    /// Where the bottom segment starts
    pub fn bottom_top(&self, config: &GameConfig) -> i32 {
        config.field.height - self.bottom_height(config)
    }
}
