use serde::Serialize;

use crate::matchup::SkillEvaluation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSkill {
    pub rank: usize,
    pub id: String,
    pub win_rate: f64,
    pub lose_rate: f64,
    pub state_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSkill {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchupReport {
    pub ranked: Vec<RankedSkill>,
    pub failed: Vec<FailedSkill>,
}

/// Best win rate first; ties go to the lower lose rate, then the id.
pub fn rank_evaluations(evaluations: Vec<SkillEvaluation>) -> MatchupReport {
    let mut report = MatchupReport::default();
    for evaluation in evaluations {
        match evaluation.outcome {
            Ok(summary) => report.ranked.push(RankedSkill {
                rank: 0,
                id: evaluation.id,
                win_rate: summary.win_rate,
                lose_rate: summary.lose_rate,
                state_count: summary.state_count,
            }),
            Err(err) => report.failed.push(FailedSkill {
                id: evaluation.id,
                error: err.to_string(),
            }),
        }
    }

    report.ranked.sort_by(|left, right| {
        right
            .win_rate
            .total_cmp(&left.win_rate)
            .then_with(|| left.lose_rate.total_cmp(&right.lose_rate))
            .then_with(|| left.id.cmp(&right.id))
    });
    for (position, skill) in report.ranked.iter_mut().enumerate() {
        skill.rank = position + 1;
    }

    report
}
