//! One-round transition probabilities between clash states.

use tracing::debug;

use crate::clash::combatant::Combatant;
use crate::clash::error::{ClashError, Result};
use crate::clash::linalg::{binomial_pmf, Matrix};
use crate::clash::state::{Side, State, StateIndex};

/// Allowed drift of a transition row's sum away from 1.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// How a single contested round from some state resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundOutcome {
    /// Side 1 out-powers side 2, so side 2 loses a coin.
    pub p1_wins: f64,
    /// Side 2 out-powers side 1, so side 1 loses a coin.
    pub p2_wins: f64,
    /// Equal power; both keep their coins and flip again.
    pub tie: f64,
}

impl RoundOutcome {
    pub fn total(&self) -> f64 {
        self.p1_wins + self.p2_wins + self.tie
    }
}

/// Distribution of a contested round: every pairing of head counts over the
/// active coins, weighted by both binomial probabilities.
pub fn contest(state: &State, p1: &Combatant, p2: &Combatant) -> Result<RoundOutcome> {
    let p1_active = state.active_coins(Side::P1);
    let p2_active = state.active_coins(Side::P2);
    let p1_heads_chance = p1.heads_chance();
    let p2_heads_chance = p2.heads_chance();

    let p2_powers = (0..=p2_active)
        .map(|heads| {
            let power = p2.clash_power(heads, p1)?;
            let weight = binomial_pmf(i64::from(heads), p2_active, p2_heads_chance);
            Ok((power, weight))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut outcome = RoundOutcome::default();
    for p1_heads in 0..=p1_active {
        let p1_power = p1.clash_power(p1_heads, p2)?;
        let p1_weight = binomial_pmf(i64::from(p1_heads), p1_active, p1_heads_chance);
        for &(p2_power, p2_weight) in &p2_powers {
            let weight = p1_weight * p2_weight;
            if p1_power > p2_power {
                outcome.p1_wins += weight;
            } else if p1_power < p2_power {
                outcome.p2_wins += weight;
            } else {
                outcome.tie += weight;
            }
        }
    }
    Ok(outcome)
}

/// Apply the transition rules in priority order. `outcome` is the contested
/// round distribution for `from`, or `None` when `from` is depleted.
fn rule_probability(from: &State, to: &State, outcome: Option<&RoundOutcome>) -> f64 {
    let p1_change = i64::from(to.p1_coins) - i64::from(from.p1_coins);
    let p2_change = i64::from(to.p2_coins) - i64::from(from.p2_coins);
    let p1_same = p1_change == 0;
    let p2_same = p2_change == 0;

    // Coin counts only ever hold or drop by one.
    if (p1_same && !matches!(p2_change, 0 | -1)) || (p2_same && !matches!(p1_change, 0 | -1)) {
        return 0.0;
    }

    // A depleted side never loops back into a contested round.
    if p1_same
        && p2_same
        && from.is_depleted()
        && (from.p1_coins > 1 || from.p2_coins > 1)
    {
        return 0.0;
    }

    if let Some(target) = from.countdown_target() {
        return if *to == target { 1.0 } else { 0.0 };
    }

    if *to != from.after_round(to.p1_coins, to.p2_coins) {
        return 0.0;
    }
    let Some(outcome) = outcome else {
        return 0.0;
    };
    match (p1_change, p2_change) {
        (0, -1) => outcome.p1_wins,
        (-1, 0) => outcome.p2_wins,
        (0, 0) => outcome.tie,
        _ => 0.0,
    }
}

/// Probability of moving from `from` to `to` in exactly one round.
pub fn transition_probability(
    from: &State,
    to: &State,
    p1: &Combatant,
    p2: &Combatant,
) -> Result<f64> {
    let outcome = if from.is_depleted() {
        None
    } else {
        Some(contest(from, p1, p2)?)
    };
    Ok(rule_probability(from, to, outcome.as_ref()))
}

/// Full row-stochastic matrix over an enumerated state list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    rows: Matrix,
}

impl TransitionMatrix {
    pub fn build(index: &StateIndex, p1: &Combatant, p2: &Combatant) -> Result<Self> {
        let states = index.states();
        let mut rows = vec![vec![0.0; states.len()]; states.len()];

        for from in states {
            let Some(from_index) = index.index_of(from) else {
                continue;
            };
            let outcome = if from.is_depleted() {
                None
            } else {
                Some(contest(from, p1, p2)?)
            };
            for to in states {
                if let Some(to_index) = index.index_of(to) {
                    rows[from_index][to_index] = rule_probability(from, to, outcome.as_ref());
                }
            }
        }

        debug!(states = states.len(), "built transition matrix");
        Ok(Self { rows })
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.rows
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &Matrix {
        &self.rows
    }

    pub fn into_rows(self) -> Matrix {
        self.rows
    }

    /// Every row except the two trailing absorbing rows must sum to 1.
    pub fn check_rows(&self) -> Result<()> {
        let transient = self.rows.len().saturating_sub(2);
        for (row, values) in self.rows.iter().take(transient).enumerate() {
            let sum: f64 = values.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(ClashError::NotStochastic { row, sum });
            }
        }
        Ok(())
    }
}
