use super::state::{RoundContext, RoundState, RoundSummary, TickResult};
use super::{Idle, Phase, Running};
use crate::bird::InputState;
use crate::config::GameConfig;
use rand::Rng;

pub enum Event {
    /// Pointer click on the field
    Start,
    Tick(InputState),
}

#[derive(Debug, Copy, Clone)]
pub enum RoundStateMachine {
    Idle(RoundState<Idle>),
    Running(RoundState<Running>),
}

impl From<RoundState<Idle>> for RoundStateMachine {
    fn from(state: RoundState<Idle>) -> Self {
        RoundStateMachine::Idle(state)
    }
}

impl From<RoundState<Running>> for RoundStateMachine {
    fn from(state: RoundState<Running>) -> Self {
        RoundStateMachine::Running(state)
    }
}

impl RoundStateMachine {
    pub fn new(config: &GameConfig, best_score: u32) -> Self {
        RoundState::<Idle>::new(config, best_score).into()
    }

    /// Consumes the current state and returns the next one. A round that ends
    /// on this event also hands back its summary.
    ///
    /// Start while running and Tick while idle leave the state untouched.
    pub fn transition<R: Rng + ?Sized>(
        self,
        event: Event,
        config: &GameConfig,
        rng: &mut R,
    ) -> (Self, Option<RoundSummary>) {
        use RoundStateMachine::*;
        match (self, event) {
            (Idle(state), Event::Start) => (state.start(config, rng).into(), None),
            (Running(state), Event::Tick(input)) => match state.tick(input, config, rng) {
                TickResult::Continue(running) => (running.into(), None),
                TickResult::Ended(idle, summary) => (idle.into(), Some(summary)),
            },
            _ => (self, None),
        }
    }

    pub fn context(&self) -> &RoundContext {
        match self {
            RoundStateMachine::Idle(state) => state.context(),
            RoundStateMachine::Running(state) => state.context(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RoundStateMachine::Running(_))
    }

    pub fn phase_name(&self) -> &'static str {
        match self {
            RoundStateMachine::Idle(_) => Idle::name(),
            RoundStateMachine::Running(_) => Running::name(),
        }
    }
}
