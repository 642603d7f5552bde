//! Markov-chain nodes for a clash and the enumerator that lists them.
//!
//! A [State] records how many coins each side still holds and how much
//! paralysis each side still has to burn. The enumerator walks coin pairs from
//! the full-coin start downwards, carrying forward every paralysis pair that a
//! round can actually leave behind, and returns the states in the canonical
//! order used for matrix rows and columns.
//!
//! Paralysis decays by the number of coins it withheld in a round, not by the
//! side's active-coin count; the latter never decays once every coin is
//! withheld (see DESIGN.md, "Paralysis decay").
//!
//! The state count grows combinatorially with paralysis, so callers that
//! accept untrusted input use [enumerate_states_within] with [MAX_STATES].

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::clash::combatant::Combatant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    P1,
    P2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct State {
    pub p1_coins: u32,
    pub p2_coins: u32,
    pub p1_paralyze: u32,
    pub p2_paralyze: u32,
}

/// The absorbing state reached when side 1 wins.
pub const WIN: State = State {
    p1_coins: 1,
    p2_coins: 0,
    p1_paralyze: 0,
    p2_paralyze: 0,
};

/// The absorbing state reached when side 2 wins.
pub const LOSE: State = State {
    p1_coins: 0,
    p2_coins: 1,
    p1_paralyze: 0,
    p2_paralyze: 0,
};

impl State {
    pub const fn new(p1_coins: u32, p2_coins: u32, p1_paralyze: u32, p2_paralyze: u32) -> Self {
        Self {
            p1_coins,
            p2_coins,
            p1_paralyze,
            p2_paralyze,
        }
    }

    /// Like [State::new], but drops paralysis once either side is out of
    /// coins: the clash is decided and nothing is flipped any more.
    pub const fn settled(p1_coins: u32, p2_coins: u32, p1_paralyze: u32, p2_paralyze: u32) -> Self {
        if p1_coins == 0 || p2_coins == 0 {
            Self::new(p1_coins, p2_coins, 0, 0)
        } else {
            Self::new(p1_coins, p2_coins, p1_paralyze, p2_paralyze)
        }
    }

    /// Starting node for a clash between `p1` and `p2`.
    pub fn initial(p1: &Combatant, p2: &Combatant) -> Self {
        Self::settled(p1.num_coins, p2.num_coins, p1.paralyze_count, p2.paralyze_count)
    }

    pub fn coins(&self, side: Side) -> u32 {
        match side {
            Side::P1 => self.p1_coins,
            Side::P2 => self.p2_coins,
        }
    }

    pub fn paralyze(&self, side: Side) -> u32 {
        match side {
            Side::P1 => self.p1_paralyze,
            Side::P2 => self.p2_paralyze,
        }
    }

    /// Coins actually flipped this round; paralyzed coins are withheld.
    pub fn active_coins(&self, side: Side) -> u32 {
        self.coins(side).saturating_sub(self.paralyze(side))
    }

    pub fn total_coins(&self) -> u32 {
        self.p1_coins + self.p2_coins
    }

    pub fn coin_pair(&self) -> (u32, u32) {
        (self.p1_coins, self.p2_coins)
    }

    pub fn paralysis_pair(&self) -> (u32, u32) {
        (self.p1_paralyze, self.p2_paralyze)
    }

    /// One side has run out of coins; only the forced countdown remains.
    pub fn is_depleted(&self) -> bool {
        self.p1_coins == 0 || self.p2_coins == 0
    }

    pub fn is_absorbing(&self) -> bool {
        *self == WIN || *self == LOSE
    }

    /// Paralysis left after one contested round: every withheld coin burns
    /// one point of paralysis.
    pub fn decayed_paralysis(&self) -> (u32, u32) {
        (
            self.p1_paralyze - self.p1_paralyze.min(self.p1_coins),
            self.p2_paralyze - self.p2_paralyze.min(self.p2_coins),
        )
    }

    /// Node reached after a contested round that leaves the given coin counts.
    pub fn after_round(&self, p1_coins: u32, p2_coins: u32) -> Self {
        let (p1_paralyze, p2_paralyze) = self.decayed_paralysis();
        Self::settled(p1_coins, p2_coins, p1_paralyze, p2_paralyze)
    }

    /// Target of the forced countdown once one side is at zero coins, or
    /// `None` when the state is still contested.
    pub fn countdown_target(&self) -> Option<Self> {
        match (self.p1_coins, self.p2_coins) {
            (0, p2) => Some(Self::new(0, p2.saturating_sub(1).max(1), 0, 0)),
            (p1, 0) => Some(Self::new(p1.saturating_sub(1).max(1), 0, 0, 0)),
            _ => None,
        }
    }

    /// Every node one round can lead to, regardless of probability.
    pub fn successors(&self) -> Vec<Self> {
        if let Some(target) = self.countdown_target() {
            return vec![target];
        }
        vec![
            self.after_round(self.p1_coins, self.p2_coins),
            self.after_round(self.p1_coins, self.p2_coins - 1),
            self.after_round(self.p1_coins - 1, self.p2_coins),
        ]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == WIN {
            return write!(f, "Win");
        }
        if *self == LOSE {
            return write!(f, "Lose");
        }
        write!(
            f,
            "({}, {} | {}, {})",
            self.p1_coins, self.p2_coins, self.p1_paralyze, self.p2_paralyze
        )
    }
}

/// Canonical row/column order: more coins first, then more paralysis, with
/// side 1's coin count as the final tie-break so Win sorts before Lose.
pub fn canonical_order(a: &State, b: &State) -> Ordering {
    b.total_coins()
        .cmp(&a.total_coins())
        .then_with(|| b.p1_paralyze.cmp(&a.p1_paralyze))
        .then_with(|| b.p2_paralyze.cmp(&a.p2_paralyze))
        .then_with(|| b.p1_coins.cmp(&a.p1_coins))
}

/// Largest chain the engine will build. Every matrix is dense `n × n` and the
/// inverse is cubic in `n`.
pub const MAX_STATES: usize = 1024;

/// List every reachable state for a clash between `p1` and `p2`, sorted by
/// [canonical_order].
pub fn enumerate_states(p1: &Combatant, p2: &Combatant) -> Vec<State> {
    enumerate_states_within(p1, p2, usize::MAX).unwrap_or_default()
}

/// Like [enumerate_states], but gives up with `None` as soon as more than
/// `limit` states have been found. Work and memory stay proportional to
/// `limit` however large the paralysis counts are.
pub fn enumerate_states_within(p1: &Combatant, p2: &Combatant, limit: usize) -> Option<Vec<State>> {
    let start = State::initial(p1, p2);
    let mut seeds: HashMap<(u32, u32), BTreeSet<(u32, u32)>> = HashMap::new();
    seeds
        .entry(start.coin_pair())
        .or_default()
        .insert(start.paralysis_pair());

    let mut states = Vec::new();
    for i in (0..=p1.num_coins).rev() {
        for j in (0..=p2.num_coins).rev() {
            if i == 0 && j == 0 {
                continue;
            }
            let Some(mut pending) = seeds.remove(&(i, j)) else {
                continue;
            };
            let mut visited = BTreeSet::new();
            while let Some(paralysis) = pending.pop_first() {
                if !visited.insert(paralysis) {
                    continue;
                }
                let state = State::new(i, j, paralysis.0, paralysis.1);
                for next in state.successors() {
                    if next.coin_pair() == (i, j) {
                        pending.insert(next.paralysis_pair());
                    } else {
                        seeds
                            .entry(next.coin_pair())
                            .or_default()
                            .insert(next.paralysis_pair());
                    }
                }
                states.push(state);
                if states.len() > limit {
                    return None;
                }
            }
        }
    }

    states.sort_by(canonical_order);
    Some(states)
}

/// Two-way mapping between states and matrix indices.
#[derive(Debug, Clone)]
pub struct StateIndex {
    states: Vec<State>,
    positions: HashMap<State, usize>,
}

impl StateIndex {
    pub fn new(states: Vec<State>) -> Self {
        let positions = states
            .iter()
            .enumerate()
            .map(|(index, state)| (*state, index))
            .collect();
        Self { states, positions }
    }

    pub fn index_of(&self, state: &State) -> Option<usize> {
        self.positions.get(state).copied()
    }

    pub fn state_at(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn into_states(self) -> Vec<State> {
        self.states
    }
}
