//! Subcommand implementations.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::info;

use screenlab_common::{
    parse_csv, run_verification, summarize, write_csv, ConsentFlags, Mode, Phase, Session,
    StudyConfig,
};

use crate::display;
use crate::prompts;

const DEFAULT_EXPORT_FILE: &str = "screenlab_results.csv";

/// The interactive protocol: consent, then menu-driven mode blocks and
/// verification until the participant quits.
pub fn run() -> Result<()> {
    let config = StudyConfig::load()?;
    let mut session = Session::new(config, rand::thread_rng())?;

    display::title_banner();
    collect_consent(&mut session)?;

    loop {
        display::briefing(session.config());
        display::menu();

        match prompts::ask_choice("Select", 4)? {
            1 => run_block(&mut session, Mode::Manual)?,
            2 => run_block(&mut session, Mode::AiAssist)?,
            3 => {
                let report = run_harness(session.config(), None)?;
                display::verification_metrics(&report);
            }
            _ => break,
        }
    }

    if !session.history().is_empty() {
        println!(
            "   {}",
            "Remember to submit your exported CSV to the research team.".yellow()
        );
    }
    Ok(())
}

/// Re-prompt until every acknowledgement is given.
fn collect_consent<R: Rng>(session: &mut Session<R>) -> Result<()> {
    loop {
        display::consent_sheet();
        let flags = ConsentFlags {
            adult: prompts::ask_yes_no("I confirm I am 18 or older")?,
            voluntary: prompts::ask_yes_no("I take part voluntarily and may stop at any time")?,
            data_use: prompts::ask_yes_no("I agree to anonymous use of my exported results")?,
        };

        match session.accept_consent(flags) {
            Ok(()) => return Ok(()),
            Err(err) => {
                println!();
                println!("   {} {}", "!".red().bold(), err);
                println!("   {}", "All acknowledgements are required to continue.".dimmed());
                println!();
            }
        }
    }
}

/// One full mode block: trial loop, summary, export offer, reset to menu.
fn run_block<R: Rng>(session: &mut Session<R>, mode: Mode) -> Result<()> {
    session.start_mode(mode)?;

    while session.phase() == Phase::Trial {
        display::trial_view(session);
        let rejected = prompts::ask_decision()?;
        session.submit_decision(rejected)?;
    }

    display::block_summary(session);
    offer_export(session)?;
    session.reset()?;
    Ok(())
}

fn offer_export<R: Rng>(session: &Session<R>) -> Result<()> {
    if !prompts::ask_yes_no("Export results to CSV now")? {
        return Ok(());
    }

    let path = prompts::ask_line("Output file", DEFAULT_EXPORT_FILE)?;
    write_csv(Path::new(&path), session.history().records())?;
    info!(path = %path, records = session.history().len(), "results exported");
    println!(
        "   {} {} ({} records)",
        "Saved".green().bold(),
        path,
        session.history().len()
    );
    Ok(())
}

/// `verify` subcommand: the batch harness with a progress bar.
pub fn verify(trials: Option<usize>) -> Result<()> {
    let config = StudyConfig::load()?;
    let report = run_harness(&config, trials)?;
    display::verification_metrics(&report);
    Ok(())
}

fn run_harness(
    config: &StudyConfig,
    trials: Option<usize>,
) -> Result<screenlab_common::VerificationReport> {
    let trial_count = trials.unwrap_or(config.verification.trials);

    let bar = ProgressBar::new(trial_count as u64);
    bar.set_style(
        ProgressStyle::with_template("   {bar:40.cyan/blue} {pos}/{len} trials")
            .context("invalid progress template")?,
    );

    let mut rng = rand::thread_rng();
    let report = run_verification(
        &mut rng,
        trial_count,
        config.session.threat_probability,
        config.session.assistant_reliability,
        |done, _total| bar.set_position(done as u64),
    )?;
    bar.finish_and_clear();

    Ok(report)
}

/// `report` subcommand: summarize a previously exported CSV.
pub fn report(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records = parse_csv(&content)?;

    println!();
    display::report_table(&summarize(&records));
    Ok(())
}

/// `config` subcommand: print the active configuration as TOML.
pub fn config(paths: bool) -> Result<()> {
    if paths {
        if let Ok(user_path) = StudyConfig::user_config_path() {
            let marker = if user_path.exists() { "(present)" } else { "(absent)" };
            println!("user:   {} {}", user_path.display(), marker);
        }
        let system_path = StudyConfig::system_config_path();
        let marker = if system_path.exists() { "(present)" } else { "(absent)" };
        println!("system: {} {}", system_path.display(), marker);
        println!();
    }

    let config = StudyConfig::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
