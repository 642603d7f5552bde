use std::collections::HashSet;
use std::fmt;

use crate::clash::{enumerate_states_within, Combatant, MAX_STATES};
use crate::data::scenario::{ClashScenario, MatchupScenario};

/// In-game sanity is capped at ±45; beyond ±50 the heads chance leaves [0, 1].
pub const SANITY_CAP: f64 = 45.0;

/// Coin pools above this make the state space large enough to notice.
pub const LARGE_COIN_POOL: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }
}

pub fn validate_combatant(report: &mut ValidationReport, context: &str, combatant: &Combatant) {
    let finite_fields = [
        ("base_power", combatant.base_power),
        ("coin_power", combatant.coin_power),
        ("sanity", combatant.sanity),
        ("offense_level", combatant.offense_level),
        ("final_clash_power_modifier", combatant.final_clash_power_modifier),
    ];
    for (field, value) in finite_fields {
        if !value.is_finite() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.{field}"),
                format!("expected a finite number, got {value}"),
            );
        }
    }

    if combatant.num_coins == 0 {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.num_coins"),
            "must be at least 1",
        );
    } else if combatant.num_coins > LARGE_COIN_POOL {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.num_coins"),
            format!(
                "{} coins is unusually large; the state space grows quickly",
                combatant.num_coins
            ),
        );
    }

    let heads_chance = combatant.heads_chance();
    if !(0.0..=1.0).contains(&heads_chance) {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.sanity"),
            format!(
                "sanity {} gives heads chance {heads_chance}, outside [0, 1]",
                combatant.sanity
            ),
        );
    } else if combatant.sanity.abs() > SANITY_CAP {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.sanity"),
            format!("sanity {} is beyond the in-game cap of ±{SANITY_CAP}", combatant.sanity),
        );
    }

    if combatant.paralyze_count > combatant.num_coins && combatant.num_coins > 0 {
        report.push(
            ValidationSeverity::Info,
            format!("{context}.paralyze_count"),
            format!(
                "paralysis {} exceeds {} coins; the excess carries into later rounds",
                combatant.paralyze_count, combatant.num_coins
            ),
        );
    }
}

/// Both sides produce one fixed power and it is the same: every round ties.
fn is_permanent_tie(p1: &Combatant, p2: &Combatant) -> bool {
    if p1.coin_power != 0.0 || p2.coin_power != 0.0 {
        return false;
    }
    match (p1.clash_power(0, p2), p2.clash_power(0, p1)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Refuse pairings whose chain would exceed [MAX_STATES]. Counting stops at
/// the limit, so large paralysis values stay cheap to reject.
fn check_state_space(report: &mut ValidationReport, context: &str, p1: &Combatant, p2: &Combatant) {
    if p1.num_coins == 0 || p2.num_coins == 0 {
        return;
    }
    if enumerate_states_within(p1, p2, MAX_STATES).is_none() {
        report.push(
            ValidationSeverity::Error,
            context,
            format!(
                "more than {MAX_STATES} states (coins {} vs {}, paralysis {} vs {}); reduce paralyze_count or num_coins",
                p1.num_coins, p2.num_coins, p1.paralyze_count, p2.paralyze_count
            ),
        );
    }
}

pub fn validate_scenario(scenario: &ClashScenario) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_combatant(&mut report, "p1", &scenario.p1);
    validate_combatant(&mut report, "p2", &scenario.p2);
    if is_permanent_tie(&scenario.p1, &scenario.p2) {
        report.push(
            ValidationSeverity::Error,
            "scenario",
            "both sides always produce equal clash power; the clash never resolves",
        );
    }
    check_state_space(&mut report, "scenario", &scenario.p1, &scenario.p2);
    report
}

pub fn validate_matchup(matchup: &MatchupScenario) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_combatant(&mut report, "opponent", &matchup.opponent);

    if matchup.skills.is_empty() {
        report.push(ValidationSeverity::Error, "skills", "expected at least one skill");
    }

    let mut seen_ids = HashSet::new();
    for (index, skill) in matchup.skills.iter().enumerate() {
        let context = format!("skills[{index}]");
        if skill.id.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.id"),
                "missing non-empty 'id'",
            );
        } else if !seen_ids.insert(skill.id.as_str()) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.id"),
                format!("duplicate id '{}'", skill.id),
            );
        }
        let combatant = matchup.combatant_for(skill);
        validate_combatant(&mut report, &context, &combatant);
        if is_permanent_tie(&combatant, &matchup.opponent) {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                "always ties the opponent; the clash never resolves",
            );
        }
        check_state_space(&mut report, &context, &combatant, &matchup.opponent);
    }

    report
}
