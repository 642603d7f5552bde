pub mod ranking;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::clash::{compute_clash, ClashError, Combatant};
use crate::data::scenario::MatchupScenario;
use crate::parallel::WorkerPool;

pub use ranking::{rank_evaluations, FailedSkill, MatchupReport, RankedSkill};

/// Solved rates for one candidate skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClashSummary {
    pub win_rate: f64,
    pub lose_rate: f64,
    pub state_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillEvaluation {
    pub id: String,
    pub combatant: Combatant,
    pub outcome: Result<ClashSummary, ClashError>,
}

/// Clash every skill in `matchup` against its opponent. Output order matches
/// `matchup.skills`.
pub fn evaluate_matchup(matchup: &MatchupScenario, pool: WorkerPool) -> Vec<SkillEvaluation> {
    debug!(
        skills = matchup.skills.len(),
        workers = pool.workers,
        "evaluating matchup"
    );
    pool.install(|| {
        matchup
            .skills
            .par_iter()
            .map(|skill| {
                let combatant = matchup.combatant_for(skill);
                let outcome = compute_clash(&combatant, &matchup.opponent).map(|result| {
                    ClashSummary {
                        win_rate: result.win_rate,
                        lose_rate: result.lose_rate,
                        state_count: result.state_count(),
                    }
                });
                if let Err(err) = &outcome {
                    warn!(skill = %skill.id, error = %err, "skill clash failed");
                }
                SkillEvaluation {
                    id: skill.id.clone(),
                    combatant,
                    outcome,
                }
            })
            .collect()
    })
}

/// Evaluate and rank in one step.
pub fn run_matchup(matchup: &MatchupScenario, pool: WorkerPool) -> MatchupReport {
    rank_evaluations(evaluate_matchup(matchup, pool))
}
