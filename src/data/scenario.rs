//! Typed clash inputs read from disk. JSON by default, YAML when the file
//! extension says so. Loading always runs the validation report and refuses
//! inputs with errors.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::clash::{Combatant, SinnerStats, SkillStats};
use crate::data::validate::{validate_matchup, validate_scenario, ValidationReport};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("scenario failed validation with {} error(s)", .0.error_count())]
    Invalid(ValidationReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    Yaml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Player skill used when no scenario is given: 6 + 3×(+4), offense 40,
/// sanity 40.
pub fn default_sinner_combatant() -> Combatant {
    Combatant::new(6.0, 3, 4.0, 40.0, 40.0, 0.0, 0)
}

/// Enemy skill used when no scenario is given: 13 + 3×(+2), offense 40.
pub fn default_enemy_combatant() -> Combatant {
    Combatant::new(13.0, 3, 2.0, 0.0, 40.0, 0.0, 0)
}

/// One clash: side 1 against side 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashScenario {
    pub p1: Combatant,
    pub p2: Combatant,
}

impl Default for ClashScenario {
    fn default() -> Self {
        Self {
            p1: default_sinner_combatant(),
            p2: default_enemy_combatant(),
        }
    }
}

/// A candidate skill in a matchup, identified for ranking output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSkill {
    pub id: String,
    #[serde(flatten)]
    pub stats: SkillStats,
}

/// Several skills of one wielder, each clashed against the same opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupScenario {
    pub opponent: Combatant,
    #[serde(default)]
    pub sinner: SinnerStats,
    pub skills: Vec<NamedSkill>,
}

impl MatchupScenario {
    pub fn combatant_for(&self, skill: &NamedSkill) -> Combatant {
        Combatant::from_parts(&skill.stats, &self.sinner)
    }
}

pub fn parse_str<T: DeserializeOwned>(raw: &str, format: ScenarioFormat) -> Result<T, ScenarioError> {
    match format {
        ScenarioFormat::Json => Ok(serde_json::from_str(raw)?),
        ScenarioFormat::Yaml => Ok(serde_yaml::from_str(raw)?),
    }
}

/// Read and deserialize without validating.
pub fn read_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ScenarioError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = raw.len(), "read scenario file");
    parse_str(&raw, ScenarioFormat::from_path(path))
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<ClashScenario, ScenarioError> {
    let scenario: ClashScenario = read_file(path)?;
    let report = validate_scenario(&scenario);
    if report.has_errors() {
        return Err(ScenarioError::Invalid(report));
    }
    Ok(scenario)
}

pub fn load_matchup(path: impl AsRef<Path>) -> Result<MatchupScenario, ScenarioError> {
    let matchup: MatchupScenario = read_file(path)?;
    let report = validate_matchup(&matchup);
    if report.has_errors() {
        return Err(ScenarioError::Invalid(report));
    }
    Ok(matchup)
}
