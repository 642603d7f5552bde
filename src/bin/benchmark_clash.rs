//! Measure clash solves per second and optionally append one line to a log
//! file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_clash
//!   cargo run --release --bin benchmark_clash -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, coins, states, solves_per_sec, micros_per_solve).

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use limbus_clash::clash::{compute_clash, Combatant};

const MIN_DURATION_MS: u128 = 1500;
const MIN_SOLVES: u32 = 50;

struct Measurement {
    coins: u32,
    states: usize,
    solves_per_sec: f64,
}

fn measure(coins: u32) -> Measurement {
    let p1 = Combatant::new(6.0, coins, 4.0, 20.0, 43.0, 0.0, 1);
    let p2 = Combatant::new(13.0, coins, 2.0, 0.0, 40.0, 0.0, 0);
    let states = compute_clash(&p1, &p2)
        .expect("benchmark scenario should solve")
        .state_count();

    let start = Instant::now();
    let mut solves: u32 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || solves < MIN_SOLVES {
        let _ = std::hint::black_box(compute_clash(&p1, &p2));
        solves += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    Measurement {
        coins,
        states,
        solves_per_sec: f64::from(solves) / elapsed_secs,
    }
}

fn main() {
    let log = std::env::args().any(|a| a == "--log");
    let measurements: Vec<Measurement> = [1, 3, 5].into_iter().map(measure).collect();

    println!("Clash engine benchmark:");
    for m in &measurements {
        println!(
            "  {} coins: {:>4} states  {:>10.2} solves/s  {:>9.2} us/solve",
            m.coins,
            m.states,
            m.solves_per_sec,
            1e6 / m.solves_per_sec
        );
    }

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let path = "benchmark_log.csv";
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open benchmark_log.csv for append");
        if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
            let _ = file.write_all(b"date,coins,states,solves_per_sec,micros_per_solve\n");
        }
        for m in &measurements {
            let line = format!(
                "{},{},{},{:.4},{:.4}\n",
                date,
                m.coins,
                m.states,
                m.solves_per_sec,
                1e6 / m.solves_per_sec
            );
            file.write_all(line.as_bytes())
                .expect("write benchmark_log.csv");
        }
        file.flush().expect("flush benchmark_log.csv");
        println!("Appended to {}", path);
    }
}
