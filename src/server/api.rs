use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::clash::{compute_clash, ClashError, State};
use crate::clash::linalg::Matrix;
use crate::data::scenario::{ClashScenario, MatchupScenario};
use crate::data::validate::{validate_matchup, validate_scenario, ValidationReport, ValidationSeverity};
use crate::matchup::{run_matchup, FailedSkill, RankedSkill};
use crate::parallel::WorkerPool;

/// Upper bound on threads a single matchup request may ask for.
const MAX_REQUEST_WORKERS: usize = 16;

#[derive(Debug, Clone, Serialize)]
pub struct ClashResponse {
    pub status: &'static str,
    pub win_rate: f64,
    pub lose_rate: f64,
    pub state_count: usize,
    pub states: Vec<State>,
    pub transition_matrix: Matrix,
    pub absorption: Matrix,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupRequest {
    #[serde(flatten)]
    pub matchup: MatchupScenario,
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupResponse {
    pub status: &'static str,
    pub results: Vec<RankedSkill>,
    pub failed: Vec<FailedSkill>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    /// Group the report's error diagnostics by context, in first-seen order.
    pub fn from_report(report: &ValidationReport) -> Self {
        let mut errors: Vec<ValidationIssue> = Vec::new();
        for diag in report.errors() {
            match errors.iter_mut().find(|issue| issue.field == diag.context) {
                Some(issue) => issue.messages.push(diag.message.clone()),
                None => errors.push(ValidationIssue {
                    field: diag.context.clone(),
                    messages: vec![diag.message.clone()],
                }),
            }
        }
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{0}")]
    Parse(serde_json::Error),

    #[error("invalid request")]
    Validation(ValidationErrorResponse),

    #[error("{0}")]
    Engine(ClashError),

    #[error("all {} skill(s) failed to resolve", .0.len())]
    NoResults(Vec<FailedSkill>),

    #[error("failed to serialize response: {0}")]
    Serialize(serde_json::Error),
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "limbus-clash-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn reject_invalid(report: &ValidationReport) -> Result<(), PayloadError> {
    if report.has_errors() {
        return Err(PayloadError::Validation(ValidationErrorResponse::from_report(
            report,
        )));
    }
    for diag in &report.diagnostics {
        if diag.severity != ValidationSeverity::Error {
            debug!(%diag, "accepted request with diagnostic");
        }
    }
    Ok(())
}

pub fn clash_payload(body: &str) -> Result<String, PayloadError> {
    let scenario: ClashScenario = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    reject_invalid(&validate_scenario(&scenario))?;

    let result = compute_clash(&scenario.p1, &scenario.p2).map_err(PayloadError::Engine)?;
    let response = ClashResponse {
        status: "ok",
        win_rate: result.win_rate,
        lose_rate: result.lose_rate,
        state_count: result.state_count(),
        states: result.states,
        transition_matrix: result.transition_matrix,
        absorption: result.absorption,
    };
    serde_json::to_string_pretty(&response).map_err(PayloadError::Serialize)
}

pub fn matchup_payload(body: &str) -> Result<String, PayloadError> {
    let request: MatchupRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    reject_invalid(&validate_matchup(&request.matchup))?;

    let workers = request.workers.unwrap_or(0).min(MAX_REQUEST_WORKERS);
    let report = run_matchup(&request.matchup, WorkerPool::with_workers(workers));
    if report.ranked.is_empty() {
        return Err(PayloadError::NoResults(report.failed));
    }

    let response = MatchupResponse {
        status: "ok",
        results: report.ranked,
        failed: report.failed,
    };
    serde_json::to_string_pretty(&response).map_err(PayloadError::Serialize)
}
