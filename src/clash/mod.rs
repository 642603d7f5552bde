pub mod absorbing;
pub mod combatant;
pub mod engine;
pub mod error;
pub mod linalg;
pub mod state;
pub mod transition;

pub use absorbing::{solve_absorbing, Absorption, ABSORBING_STATES};
pub use combatant::{Combatant, SinnerStats, SkillStats};
pub use engine::{compute_clash, ClashResult};
pub use error::ClashError;
pub use linalg::{
    binomial_pmf, identity, matrix_inverse, matrix_multiply, matrix_subtract, Matrix,
};
pub use state::{
    canonical_order, enumerate_states, enumerate_states_within, Side, State, StateIndex, LOSE,
    MAX_STATES, WIN,
};
pub use transition::{
    contest, transition_probability, RoundOutcome, TransitionMatrix, ROW_SUM_TOLERANCE,
};
