use crate::config::{GameConfig, KeyBindings};
use crate::engine::input::KeyState;

/// Held movement keys, sampled once per tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub move_up: bool,
    pub move_down: bool,
}

impl InputState {
    pub fn from_keys(keystate: &KeyState, keys: &KeyBindings) -> Self {
        InputState {
            move_up: keystate.is_pressed(&keys.up),
            move_down: keystate.is_pressed(&keys.down),
        }
    }
}

/// Vertical position of the bird's top edge. The column and size are fixed
/// by the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bird {
    pub position: i32,
}

impl Bird {
    pub fn centered(config: &GameConfig) -> Self {
        Bird {
            position: config.bird_center(),
        }
    }

    /// One manual step
    /// - up wins when both keys are held and the bird can still rise
    /// - a blocked up (already at the top) falls through to down
    /// - never leaves `[0, field height - bird height]`
    pub fn advance(self, input: InputState, config: &GameConfig) -> Self {
        let floor = config.bird_floor();
        let position = if input.move_up && self.position > 0 {
            (self.position - config.move_step).max(0)
        } else if input.move_down && self.position < floor {
            (self.position + config.move_step).min(floor)
        } else {
            self.position
        };
        Bird { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: InputState = InputState {
        move_up: true,
        move_down: false,
    };
    const DOWN: InputState = InputState {
        move_up: false,
        move_down: true,
    };
    const BOTH: InputState = InputState {
        move_up: true,
        move_down: true,
    };

    #[test]
    fn idle_input_keeps_position() {
        let config = GameConfig::default();
        let bird = Bird::centered(&config);
        assert_eq!(bird.advance(InputState::default(), &config), bird);
    }

    #[test]
    fn up_and_down_move_one_step() {
        let config = GameConfig::default();
        let bird = Bird { position: 200 };
        assert_eq!(bird.advance(UP, &config).position, 190);
        assert_eq!(bird.advance(DOWN, &config).position, 210);
    }

    #[test]
    fn up_wins_when_both_held() {
        let config = GameConfig::default();
        let bird = Bird { position: 200 };
        assert_eq!(bird.advance(BOTH, &config), bird.advance(UP, &config));
    }

    #[test]
    fn held_up_for_three_ticks_rises_thirty() {
        let config = GameConfig::default();
        let start = Bird::centered(&config);
        let bird = (0..3).fold(start, |bird, _| bird.advance(UP, &config));
        assert_eq!(bird.position, start.position - 30);
    }

    #[test]
    fn stays_inside_field() {
        let config = GameConfig::default();
        let near_top = Bird { position: 5 };
        assert_eq!(near_top.advance(UP, &config).position, 0);
        assert_eq!(Bird { position: 0 }.advance(UP, &config).position, 0);

        let near_floor = Bird { position: 545 };
        assert_eq!(near_floor.advance(DOWN, &config).position, 550);
        assert_eq!(Bird { position: 550 }.advance(DOWN, &config).position, 550);
    }

    #[test]
    fn blocked_up_falls_through_to_down() {
        let config = GameConfig::default();
        let bird = Bird { position: 0 };
        assert_eq!(bird.advance(BOTH, &config).position, 10);
        // only up held at the top: nowhere to go
        assert_eq!(bird.advance(UP, &config).position, 0);
    }

    #[test]
    fn input_reads_bound_keys() {
        let keys = KeyBindings::default();
        let mut keystate = KeyState::new();
        keystate.set_pressed("KeyS");
        let input = InputState::from_keys(&keystate, &keys);
        assert!(!input.move_up);
        assert!(input.move_down);
    }
}
