/// Everything about a round lives behind these types, so the only way to move
/// between phases is through the methods below:
/// - PUBLIC  : RoundState, RoundContext (read only), TickResult
/// - PRIVATE : the context fields can only change through a transition
use super::{Idle, Running};
use crate::bird::{Bird, InputState};
use crate::collision::{self, Collision};
use crate::config::GameConfig;
use crate::obstacle::{Advance, Obstacle};
use rand::Rng;

/// What happened on the falling edge of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: u32,
    pub best_score: u32,
    /// `best_score` was raised by this round and should be persisted
    pub new_best: bool,
    pub cause: Collision,
}

pub enum TickResult {
    Continue(RoundState<Running>),
    Ended(RoundState<Idle>, RoundSummary),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RoundContext {
    pub bird: Bird,
    pub obstacle: Obstacle,
    pub score: u32,
    pub best_score: u32,
}

#[derive(Debug, Copy, Clone)]
pub struct RoundState<S> {
    context: RoundContext,
    // phantom marker, only there to tell the phases apart at compile time
    _state: S,
}

impl<S> RoundState<S> {
    pub fn context(&self) -> &RoundContext {
        &self.context
    }
}

impl RoundState<Idle> {
    pub fn new(config: &GameConfig, best_score: u32) -> Self {
        RoundState {
            context: RoundContext {
                bird: Bird::centered(config),
                obstacle: Obstacle::parked(config),
                score: 0,
                best_score,
            },
            _state: Idle,
        }
    }

    /// Centre the bird, clear the score and draw a fresh obstacle
    pub fn start<R: Rng + ?Sized>(self, config: &GameConfig, rng: &mut R) -> RoundState<Running> {
        RoundState {
            context: RoundContext {
                bird: Bird::centered(config),
                obstacle: Obstacle::spawn(config, rng),
                score: 0,
                best_score: self.context.best_score,
            },
            _state: Running,
        }
    }
}

impl RoundState<Running> {
    /// One tick, in this order:
    /// 1. obstacle (a recycle scores a point)
    /// 2. bird
    /// 3. collision against the positions of 1 and 2
    pub fn tick<R: Rng + ?Sized>(
        mut self,
        input: InputState,
        config: &GameConfig,
        rng: &mut R,
    ) -> TickResult {
        let context = &mut self.context;
        match context.obstacle.advance(context.score, config, rng) {
            Advance::Moved(obstacle) => context.obstacle = obstacle,
            Advance::Recycled(obstacle) => {
                context.obstacle = obstacle;
                context.score += 1;
            }
        }
        context.bird = context.bird.advance(input, config);

        match collision::check(context.bird, context.obstacle, config) {
            Some(cause) => {
                let (idle, summary) = self.end(cause, config);
                TickResult::Ended(idle, summary)
            }
            None => TickResult::Continue(self),
        }
    }

    fn end(self, cause: Collision, config: &GameConfig) -> (RoundState<Idle>, RoundSummary) {
        let score = self.context.score;
        let new_best = score > self.context.best_score;
        let best_score = self.context.best_score.max(score);
        let idle = RoundState {
            context: RoundContext {
                bird: Bird::centered(config),
                // left frozen until the next start redraws it
                obstacle: self.context.obstacle,
                score: 0,
                best_score,
            },
            _state: Idle,
        };
        let summary = RoundSummary {
            score,
            best_score,
            new_best,
            cause,
        };
        (idle, summary)
    }
}
