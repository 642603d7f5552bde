//! One side's clash parameters and the clash-power formula.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clash::error::{ClashError, Result};

/// Immutable combat parameters for one side of a clash. Coin depletion is
/// tracked by [crate::clash::State], never by mutating this value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub base_power: f64,
    pub num_coins: u32,
    pub coin_power: f64,
    #[serde(default)]
    pub sanity: f64,
    #[serde(default)]
    pub offense_level: f64,
    #[serde(default)]
    pub final_clash_power_modifier: f64,
    #[serde(default)]
    pub paralyze_count: u32,
}

/// Skill-side half of a combatant (what the attack itself brings).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillStats {
    pub base_power: f64,
    pub num_coins: u32,
    pub coin_power: f64,
    #[serde(default)]
    pub offense_level: f64,
    #[serde(default)]
    pub final_clash_power_modifier: f64,
}

/// Wielder-side half of a combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SinnerStats {
    #[serde(default)]
    pub sanity: f64,
    #[serde(default)]
    pub paralyze_count: u32,
}

impl Combatant {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_power: f64,
        num_coins: u32,
        coin_power: f64,
        sanity: f64,
        offense_level: f64,
        final_clash_power_modifier: f64,
        paralyze_count: u32,
    ) -> Self {
        Self {
            base_power,
            num_coins,
            coin_power,
            sanity,
            offense_level,
            final_clash_power_modifier,
            paralyze_count,
        }
    }

    pub fn from_parts(skill: &SkillStats, sinner: &SinnerStats) -> Self {
        Self {
            base_power: skill.base_power,
            num_coins: skill.num_coins,
            coin_power: skill.coin_power,
            sanity: sinner.sanity,
            offense_level: skill.offense_level,
            final_clash_power_modifier: skill.final_clash_power_modifier,
            paralyze_count: sinner.paralyze_count,
        }
    }

    /// Probability a single coin lands heads. Not clamped.
    pub fn heads_chance(&self) -> f64 {
        0.5 + self.sanity / 100.0
    }

    /// Flat bonus for out-levelling the opponent: one point per full 3 levels.
    pub fn offense_level_bonus(&self, opponent: &Combatant) -> f64 {
        let bonus = ((self.offense_level - opponent.offense_level) / 3.0).floor();
        bonus.max(0.0)
    }

    /// Power produced by a flip with `heads` heads against `opponent`.
    pub fn clash_power(&self, heads: u32, opponent: &Combatant) -> Result<f64> {
        if heads > self.num_coins {
            return Err(ClashError::InvalidFlipCount {
                heads,
                num_coins: self.num_coins,
            });
        }
        Ok(self.base_power
            + f64::from(heads) * self.coin_power
            + self.offense_level_bonus(opponent)
            + self.final_clash_power_modifier)
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.coin_power >= 0.0 { "+" } else { "" };
        write!(
            f,
            "[{} + {}({}{}); sanity={}; offense_lv={}; paralyze={}]",
            self.base_power,
            self.num_coins,
            sign,
            self.coin_power,
            self.sanity,
            self.offense_level,
            self.paralyze_count
        )
    }
}
