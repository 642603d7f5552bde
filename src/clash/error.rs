use thiserror::Error;

/// Failures surfaced by the clash engine. None of these are retryable: the
/// computation is deterministic, so identical inputs reproduce the failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClashError {
    #[error("cannot flip {heads} heads with only {num_coins} coins")]
    InvalidFlipCount { heads: u32, num_coins: u32 },

    #[error("dimension mismatch in {operation}: {left:?} vs {right:?}")]
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("matrix is singular (no pivot in column {column})")]
    SingularMatrix { column: usize },

    #[error("transition row {row} sums to {sum}, expected 1")]
    NotStochastic { row: usize, sum: f64 },

    #[error("state list does not end in the win/lose absorbing states")]
    NotAbsorbing,

    #[error("{side} enters the clash with no coins")]
    DegenerateCombatant { side: &'static str },

    #[error("clash has more than {limit} states")]
    StateSpaceTooLarge { limit: usize },
}

pub type Result<T> = std::result::Result<T, ClashError>;
