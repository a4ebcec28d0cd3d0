// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                          Round module layout                             │
// ├────────────────┬─────────────────────────────────────────────────────────┤
// │ mod.rs         │ phase markers (Idle, Running) + Phase trait             │
// │ state.rs       │ RoundState<Phase> typestate, RoundContext, TickResult   │
// │ machine.rs     │ RoundStateMachine enum, Event, transition()             │
// └────────────────┴─────────────────────────────────────────────────────────┘
//
// ┌──────────────── State Transition Flow ──────────────────┐
// │  From State  →  Event   →  To State                     │
// ├─────────────────────────────────────────────────────────┤
// │  Idle        →  Start   →  Running                      │
// │  Running     →  Tick    →  Running (no collision)       │
// │  Running     →  Tick    →  Idle    (collision, Ended)   │
// └─────────────────────────────────────────────────────────┘
pub mod machine;
pub mod state;

pub use machine::{Event, RoundStateMachine};
pub use state::{RoundContext, RoundState, RoundSummary, TickResult};

pub trait Phase {
    fn name() -> &'static str;
}

/// Waiting for the start click
#[derive(Debug, Copy, Clone)]
pub struct Idle;

/// Ticking: obstacle, bird and collision every step
#[derive(Debug, Copy, Clone)]
pub struct Running;

impl Phase for Idle {
    fn name() -> &'static str {
        "Idle"
    }
}

impl Phase for Running {
    fn name() -> &'static str {
        "Running"
    }
}
