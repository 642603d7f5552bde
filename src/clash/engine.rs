//! Exact clash outcome engine: enumerate states, build the one-round
//! transition matrix, solve the absorbing chain.
//!
//! Each call is a pure function of its two combatants; nothing is cached.

use serde::Serialize;
use tracing::debug;

use crate::clash::absorbing::solve_absorbing;
use crate::clash::combatant::Combatant;
use crate::clash::error::{ClashError, Result};
use crate::clash::linalg::Matrix;
use crate::clash::state::{enumerate_states_within, State, StateIndex, LOSE, MAX_STATES, WIN};
use crate::clash::transition::TransitionMatrix;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClashResult {
    pub win_rate: f64,
    pub lose_rate: f64,
    /// Row/column order of every matrix below.
    pub states: Vec<State>,
    pub transition_matrix: Matrix,
    pub q: Matrix,
    pub r: Matrix,
    pub identity: Matrix,
    pub fundamental_matrix: Matrix,
    pub absorption: Matrix,
}

impl ClashResult {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Rebuild the state↔index mapping for this result's matrices.
    pub fn state_index(&self) -> StateIndex {
        StateIndex::new(self.states.clone())
    }
}

/// Probability that `p1` wins a clash against `p2`, with the full chain for
/// diagnostics.
pub fn compute_clash(p1: &Combatant, p2: &Combatant) -> Result<ClashResult> {
    if p1.num_coins == 0 {
        return Err(ClashError::DegenerateCombatant { side: "p1" });
    }
    if p2.num_coins == 0 {
        return Err(ClashError::DegenerateCombatant { side: "p2" });
    }

    let states = enumerate_states_within(p1, p2, MAX_STATES)
        .ok_or(ClashError::StateSpaceTooLarge { limit: MAX_STATES })?;
    let index = StateIndex::new(states);
    let n = index.len();
    if n < 3 || index.state_at(n - 2) != Some(&WIN) || index.state_at(n - 1) != Some(&LOSE) {
        return Err(ClashError::NotAbsorbing);
    }
    debug!(states = n, p1 = %p1, p2 = %p2, "enumerated clash states");

    let transitions = TransitionMatrix::build(&index, p1, p2)?;
    transitions.check_rows()?;

    let solved = solve_absorbing(transitions.rows())?;
    let win_rate = solved.win_rate();
    let lose_rate = solved.lose_rate();
    debug!(win_rate, lose_rate, "clash solved");

    Ok(ClashResult {
        win_rate,
        lose_rate,
        states: index.into_states(),
        transition_matrix: transitions.into_rows(),
        q: solved.q,
        r: solved.r,
        identity: solved.identity,
        fundamental_matrix: solved.fundamental_matrix,
        absorption: solved.absorption,
    })
}
