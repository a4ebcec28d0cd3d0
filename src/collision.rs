use crate::bird::Bird;
use crate::config::GameConfig;
use crate::obstacle::Obstacle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Touched the top or bottom of the field
    Wall,
    TopObstacle,
    BottomObstacle,
}

/// Checks the post-move positions of one tick.
///
/// The bottom test keeps its original inequality, which is not the mirror
/// image of the top test.
pub fn check(bird: Bird, obstacle: Obstacle, config: &GameConfig) -> Option<Collision> {
    let height = config.field.height;
    let position = bird.position;

    if position <= 0 || position >= config.bird_floor() {
        return Some(Collision::Wall);
    }

    // the window starts at the bird width, not at its draw column
    let window_left = config.bird.width;
    let engaged = obstacle.position >= window_left
        && obstacle.position <= window_left + config.engagement_width;
    if !engaged {
        return None;
    }

    let top = position >= 0 && position < obstacle.gap_height;
    let bottom_edge =
        height - (height - obstacle.gap_size - obstacle.gap_height) - config.bird.height;
    let bottom = position <= height && position >= bottom_edge;

    if top && position < obstacle.gap_height {
        Some(Collision::TopObstacle)
    } else if bottom && position > bottom_edge {
        Some(Collision::BottomObstacle)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle_at(position: i32) -> Obstacle {
        Obstacle {
            position,
            gap_height: 200,
            gap_size: 80,
        }
    }

    #[test]
    fn ceiling_and_floor_are_walls() {
        let config = GameConfig::default();
        let far = obstacle_at(1_000);
        assert_eq!(check(Bird { position: 0 }, far, &config), Some(Collision::Wall));
        assert_eq!(check(Bird { position: 550 }, far, &config), Some(Collision::Wall));
        assert_eq!(check(Bird { position: 1 }, far, &config), None);
        assert_eq!(check(Bird { position: 549 }, far, &config), None);
    }

    #[test]
    fn obstacle_outside_window_is_harmless() {
        let config = GameConfig::default();
        let bird = Bird { position: 50 };
        assert_eq!(check(bird, obstacle_at(159), &config), None);
        assert_eq!(check(bird, obstacle_at(241), &config), None);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let config = GameConfig::default();
        let bird = Bird { position: 50 };
        assert_eq!(check(bird, obstacle_at(160), &config), Some(Collision::TopObstacle));
        assert_eq!(check(bird, obstacle_at(240), &config), Some(Collision::TopObstacle));
    }

    #[test]
    fn above_the_gap_hits_top_segment() {
        let config = GameConfig::default();
        assert_eq!(
            check(Bird { position: 199 }, obstacle_at(200), &config),
            Some(Collision::TopObstacle)
        );
    }

    #[test]
    fn below_bottom_edge_hits_bottom_segment() {
        // bottom edge = 600 - (600 - 80 - 200) - 50 = 230
        let config = GameConfig::default();
        assert_eq!(
            check(Bird { position: 231 }, obstacle_at(200), &config),
            Some(Collision::BottomObstacle)
        );
        assert_eq!(
            check(Bird { position: 400 }, obstacle_at(200), &config),
            Some(Collision::BottomObstacle)
        );
    }

    #[test]
    fn inside_the_gap_passes() {
        let config = GameConfig::default();
        for position in [200, 215, 230] {
            assert_eq!(check(Bird { position }, obstacle_at(200), &config), None);
        }
    }
}
