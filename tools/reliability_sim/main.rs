//! Reliability Simulator - deterministic verification scenarios
//!
//! Usage:
//!   reliability_sim --trials 10000 --scenario nominal
//!   reliability_sim --trials 10000 --scenario perfect-assistant
//!   reliability_sim --trials 10000 --scenario threat-free
//!   reliability_sim --trials 10000 --scenario coin-flip
//!
//! Outputs machine-readable JSON reports to ./artifacts/simulations/

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use screenlab_common::run_verification;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScenarioReport {
    scenario: String,
    seed: u64,
    trials: usize,
    target_threat_rate: f64,
    target_reliability: f64,
    empirical_threat_rate: f64,
    empirical_reliability: f64,
    within_tolerance: bool,
    success: bool,
    notes: String,
}

struct Scenario {
    name: &'static str,
    seed: u64,
    threat_probability: f64,
    reliability: f64,
    /// Whether the tolerance band is expected to hold
    expect_in_band: bool,
    notes: &'static str,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "nominal",
        seed: 4001,
        threat_probability: 0.40,
        reliability: 0.85,
        expect_in_band: true,
        notes: "Protocol defaults. Both empirical rates must sit inside the band.",
    },
    Scenario {
        name: "perfect-assistant",
        seed: 4002,
        threat_probability: 0.40,
        reliability: 1.0,
        expect_in_band: true,
        notes: "Reliability 1.0 - the advisory must match ground truth on every trial.",
    },
    Scenario {
        name: "threat-free",
        seed: 4003,
        threat_probability: 0.0,
        reliability: 0.85,
        expect_in_band: true,
        notes: "Threat probability 0 - the empirical threat rate must be exactly zero.",
    },
    Scenario {
        name: "coin-flip",
        seed: 4004,
        threat_probability: 0.40,
        reliability: 0.5,
        expect_in_band: true,
        notes: "Worst-case assistant. Confirms the band tracks the configured target, \
                not some fixed quality floor.",
    },
];

// ============================================================================
// SIMULATOR LOGIC
// ============================================================================

fn run_scenario(scenario: &Scenario, trials: usize) -> ScenarioReport {
    let mut rng = StdRng::seed_from_u64(scenario.seed);

    let report = match run_verification(
        &mut rng,
        trials,
        scenario.threat_probability,
        scenario.reliability,
        |_, _| {},
    ) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: scenario {} failed: {}", scenario.name, err);
            std::process::exit(1);
        }
    };

    ScenarioReport {
        scenario: scenario.name.to_string(),
        seed: scenario.seed,
        trials: report.trials,
        target_threat_rate: report.target_threat_rate,
        target_reliability: report.target_reliability,
        empirical_threat_rate: report.empirical_threat_rate,
        empirical_reliability: report.empirical_reliability,
        within_tolerance: report.within_tolerance,
        success: report.within_tolerance == scenario.expect_in_band,
        notes: scenario.notes.to_string(),
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut trials = 10_000usize;
    let mut scenario_name = "nominal".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--trials" => {
                if i + 1 < args.len() {
                    trials = args[i + 1].parse().unwrap_or(10_000);
                    i += 2;
                } else {
                    eprintln!("Error: --trials requires a value");
                    std::process::exit(1);
                }
            }
            "--scenario" => {
                if i + 1 < args.len() {
                    scenario_name = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --scenario requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Reliability Simulator");
                println!();
                println!("Usage:");
                println!("  reliability_sim --trials <N> --scenario <scenario>");
                println!();
                println!("Options:");
                println!("  --trials <N>          Synthetic trials per run (default: 10000)");
                println!("  --scenario <scenario> Scenario: nominal, perfect-assistant,");
                println!("                        threat-free, coin-flip");
                println!();
                println!("Examples:");
                println!("  reliability_sim --trials 10000 --scenario nominal");
                println!("  reliability_sim --trials 10000 --scenario perfect-assistant");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Error: Unknown argument: {}", args[i]);
                eprintln!("Run with --help for usage");
                std::process::exit(1);
            }
        }
    }

    if trials < 1_000 {
        eprintln!("Error: trials must be at least 1000 for a meaningful band check");
        std::process::exit(1);
    }

    let scenario = match SCENARIOS.iter().find(|s| s.name == scenario_name) {
        Some(scenario) => scenario,
        None => {
            eprintln!("Error: Unknown scenario: {}", scenario_name);
            eprintln!(
                "Valid scenarios: {}",
                SCENARIOS
                    .iter()
                    .map(|s| s.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(1);
        }
    };

    let report = run_scenario(scenario, trials);

    // Write report
    let output_dir = PathBuf::from("./artifacts/simulations");
    if let Err(err) = fs::create_dir_all(&output_dir) {
        eprintln!("Error: cannot create {}: {}", output_dir.display(), err);
        std::process::exit(1);
    }
    let output_file = output_dir.join(format!("{}.json", report.scenario));
    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Error: cannot serialize report: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = fs::write(&output_file, json) {
        eprintln!("Error: cannot write {}: {}", output_file.display(), err);
        std::process::exit(1);
    }

    // Print summary
    println!("\n=== Reliability Simulation: {} ===\n", report.scenario);
    println!("Trials:               {}", report.trials);
    println!("Seed:                 {}", report.seed);
    println!(
        "Threat rate:          {:.4} (target {:.2})",
        report.empirical_threat_rate, report.target_threat_rate
    );
    println!(
        "Reliability:          {:.4} (target {:.2})",
        report.empirical_reliability, report.target_reliability
    );
    println!("Within tolerance:     {}", report.within_tolerance);

    println!("\nNotes: {}", report.notes);
    println!("\nReport saved to: {}\n", output_file.display());

    if report.success {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
