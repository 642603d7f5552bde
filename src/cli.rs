use std::env;

use crate::clash::compute_clash;
use crate::data::scenario::{load_matchup, load_scenario, read_file, ClashScenario, MatchupScenario, ScenarioError};
use crate::data::validate::{validate_matchup, validate_scenario, ValidationReport};
use crate::matchup::run_matchup;
use crate::parallel::WorkerPool;
use crate::server;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Clash,
    Matchup,
    Validate,
    Serve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("clash") => Some(Command::Clash),
        Some("matchup") => Some(Command::Matchup),
        Some("validate") => Some(Command::Validate),
        Some("serve") => Some(Command::Serve),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Clash) => handle_clash(args),
        Some(Command::Matchup) => handle_matchup(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Serve) => handle_serve(),
        None => {
            eprintln!("usage: limbus-clash <clash|matchup|validate|serve>");
            2
        }
    }
}

/// First argument after the subcommand that is not a flag or a flag's value.
fn positional_path(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        if arg == "--workers" {
            rest.next();
        } else if !arg.starts_with("--") {
            return Some(arg.as_str());
        }
    }
    None
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("LIMBUS_CLASH_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_clash(args: &[String]) -> i32 {
    let as_table = args.iter().any(|arg| arg == "--table");
    let scenario = match positional_path(args) {
        Some(path) => match load_scenario(path) {
            Ok(scenario) => scenario,
            Err(err) => {
                report_load_failure(path, &err);
                return 1;
            }
        },
        None => ClashScenario::default(),
    };

    let result = match compute_clash(&scenario.p1, &scenario.p2) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("clash failed: {err}");
            return 1;
        }
    };

    if as_table {
        println!("win_rate\tlose_rate\tstate_count");
        println!(
            "{:.6}\t{:.6}\t{}",
            result.win_rate,
            result.lose_rate,
            result.state_count()
        );
        return 0;
    }

    match serde_json::to_string_pretty(&result) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize clash result: {err}");
            1
        }
    }
}

fn handle_matchup(args: &[String]) -> i32 {
    let Some(path) = positional_path(args) else {
        eprintln!("usage: limbus-clash matchup <path-to-matchup> [--workers N]");
        return 2;
    };
    let workers = parse_usize_arg(flag_value(args, "--workers"), "workers", 0);

    let matchup = match load_matchup(path) {
        Ok(matchup) => matchup,
        Err(err) => {
            report_load_failure(path, &err);
            return 1;
        }
    };

    let report = run_matchup(&matchup, WorkerPool::with_workers(workers));
    for failure in &report.failed {
        eprintln!("skill '{}' failed: {}", failure.id, failure.error);
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            if report.ranked.is_empty() {
                1
            } else {
                0
            }
        }
        Err(err) => {
            eprintln!("failed to serialize matchup result: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = positional_path(args) else {
        eprintln!("usage: limbus-clash validate <path-to-scenario>");
        return 2;
    };

    let report = match read_validation_report(path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.error_count());
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

/// Validate as a clash scenario, or as a matchup when the file has that shape.
fn read_validation_report(path: &str) -> Result<ValidationReport, ScenarioError> {
    match read_file::<ClashScenario>(path) {
        Ok(scenario) => Ok(validate_scenario(&scenario)),
        Err(clash_err @ (ScenarioError::Json(_) | ScenarioError::Yaml(_))) => {
            match read_file::<MatchupScenario>(path) {
                Ok(matchup) => Ok(validate_matchup(&matchup)),
                Err(_) => Err(clash_err),
            }
        }
        Err(err) => Err(err),
    }
}

fn report_load_failure(path: &str, err: &ScenarioError) {
    eprintln!("failed to load '{path}': {err}");
    if let ScenarioError::Invalid(report) = err {
        for diag in report.errors() {
            eprintln!("- {diag}");
        }
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_known_subcommands() {
        assert_eq!(parse_command(&args(&["bin", "clash"])), Some(Command::Clash));
        assert_eq!(parse_command(&args(&["bin", "matchup", "m.json"])), Some(Command::Matchup));
        assert_eq!(parse_command(&args(&["bin", "validate"])), Some(Command::Validate));
        assert_eq!(parse_command(&args(&["bin", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["bin", "simulate"])), None);
        assert_eq!(parse_command(&args(&["bin"])), None);
    }

    #[test]
    fn positional_path_skips_flags_and_their_values() {
        assert_eq!(positional_path(&args(&["bin", "clash", "--table"])), None);
        assert_eq!(
            positional_path(&args(&["bin", "clash", "--table", "s.json"])),
            Some("s.json")
        );
        assert_eq!(
            positional_path(&args(&["bin", "matchup", "--workers", "4", "m.yaml"])),
            Some("m.yaml")
        );
    }

    #[test]
    fn workers_flag_falls_back_on_garbage() {
        let raw = args(&["bin", "matchup", "m.json", "--workers", "lots"]);
        assert_eq!(parse_usize_arg(flag_value(&raw, "--workers"), "workers", 0), 0);
        let raw = args(&["bin", "matchup", "m.json", "--workers", "3"]);
        assert_eq!(parse_usize_arg(flag_value(&raw, "--workers"), "workers", 0), 3);
    }

    #[test]
    fn unknown_command_is_a_usage_error() {
        assert_eq!(run_with_args(&args(&["bin", "nope"])), 2);
    }
}
