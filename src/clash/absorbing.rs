//! Closed-form absorption probabilities for a chain whose last two states
//! are absorbing.

use serde::Serialize;
use tracing::debug;

use crate::clash::error::{ClashError, Result};
use crate::clash::linalg::{identity, matrix_inverse, matrix_multiply, matrix_subtract, submatrix, Matrix};

/// Number of absorbing states at the tail of the state list.
pub const ABSORBING_STATES: usize = 2;

/// Solver output. `absorption[i][k]` is the probability that transient state
/// `i` ends in absorbing state `k`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Absorption {
    pub q: Matrix,
    pub r: Matrix,
    pub identity: Matrix,
    pub fundamental_matrix: Matrix,
    pub absorption: Matrix,
}

impl Absorption {
    /// Probability that the chain started in transient state 0 ends in the
    /// first absorbing state.
    pub fn win_rate(&self) -> f64 {
        self.absorption
            .first()
            .and_then(|row| row.first())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn lose_rate(&self) -> f64 {
        self.absorption
            .first()
            .and_then(|row| row.get(1))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Partition `transitions` into `Q`/`R`, invert `I - Q` and multiply by `R`.
pub fn solve_absorbing(transitions: &[Vec<f64>]) -> Result<Absorption> {
    let n = transitions.len();
    if n <= ABSORBING_STATES {
        return Err(ClashError::NotAbsorbing);
    }
    let transient = n - ABSORBING_STATES;

    let q = submatrix(transitions, 0..transient, 0..transient);
    let r = submatrix(transitions, 0..transient, transient..n);
    let identity = identity(transient);
    let fundamental_matrix = matrix_inverse(&matrix_subtract(&identity, &q)?)?;
    let absorption = matrix_multiply(&fundamental_matrix, &r)?;

    debug!(transient, "solved absorbing chain");
    Ok(Absorption {
        q,
        r,
        identity,
        fundamental_matrix,
        absorption,
    })
}
