use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use fever_triage::algorithm::hospital::{HospitalFinder, HospitalSearch, StaticDirectoryProvider};
use fever_triage::error::util::safe_read_to_string;
use fever_triage::models::hospital::Facility;
use fever_triage::utils::logging::{log_operation_complete, log_operation_start};
use fever_triage::{TriageConfig, TriageIntake, TriageOutcome, classify_batch, config};
use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;

const USAGE: &str =
    "Usage: fever-triage <intake.json> [--config <config.json>] [--directory <facilities.json>]";

struct Args {
    intake: PathBuf,
    config: Option<PathBuf>,
    directory: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut intake = None;
    let mut config = None;
    let mut directory = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--directory" => directory = Some(PathBuf::from(args.next().context(USAGE)?)),
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if intake.is_none() && !other.starts_with("--") => {
                intake = Some(PathBuf::from(other));
            }
            other => bail!("Unexpected argument '{other}'\n{USAGE}"),
        }
    }

    Ok(Args {
        intake: intake.context(USAGE)?,
        config,
        directory,
    })
}

/// Accept either one intake object or an array of them
fn load_intakes(path: &Path) -> anyhow::Result<Vec<TriageIntake>> {
    let content = safe_read_to_string(path, "intake file")?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let intakes = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(intakes)
}

fn build_finder(config: &TriageConfig, directory: Option<&Path>) -> anyhow::Result<HospitalFinder> {
    let Some(path) = directory else {
        warn!("No facility directory given; referrals will use the mock hospital list");
        return Ok(HospitalFinder::without_provider(config.hospital_search.clone()));
    };
    let content = safe_read_to_string(path, "facility directory")?;
    let facilities: Vec<Facility> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid facility directory {}", path.display()))?;
    info!("Loaded {} facilities from {}", facilities.len(), path.display());
    Ok(HospitalFinder::new(
        Arc::new(StaticDirectoryProvider::new(facilities)),
        config.hospital_search.clone(),
    ))
}

#[derive(Serialize)]
struct CaseReport {
    patient_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<TriageOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hospitals: Option<HospitalSearch>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;

    let loaded = match &args.config {
        Some(path) => TriageConfig::from_json_file(path)?,
        None => TriageConfig::default(),
    };
    config::install(loaded)?;
    let config = config::global();

    log_operation_start("Triaging intakes from", &args.intake.display().to_string());
    let start = Instant::now();
    let intakes = load_intakes(&args.intake)?;
    let outcomes = classify_batch(config, &intakes);

    let finder = Arc::new(build_finder(config, args.directory.as_deref())?);
    let lookups: Vec<_> = intakes
        .iter()
        .zip(&outcomes)
        .map(|(intake, outcome)| match outcome {
            Ok(outcome) if outcome.needs_referral() => {
                Some(Arc::clone(&finder).spawn_referral_lookup(intake.coordinates))
            }
            _ => None,
        })
        .collect();

    let mut hospitals = Vec::with_capacity(lookups.len());
    let pending = join_all(lookups.into_iter().flatten()).await;
    let mut pending = pending.into_iter();
    for outcome in &outcomes {
        let referral = match outcome {
            Ok(outcome) if outcome.needs_referral() => pending
                .next()
                .transpose()
                .context("Hospital lookup task failed")?,
            _ => None,
        };
        hospitals.push(referral);
    }

    let reports: Vec<CaseReport> = intakes
        .into_iter()
        .zip(outcomes)
        .zip(hospitals)
        .map(|((intake, outcome), hospitals)| match outcome {
            Ok(outcome) => CaseReport {
                patient_ref: intake.patient_ref,
                outcome: Some(outcome),
                error: None,
                hospitals,
            },
            Err(e) => {
                warn!("Rejected intake for '{}': {e}", intake.patient_ref);
                CaseReport {
                    patient_ref: intake.patient_ref,
                    outcome: None,
                    error: Some(e.to_string()),
                    hospitals: None,
                }
            }
        })
        .collect();

    log_operation_complete(
        "triaged",
        &args.intake.display().to_string(),
        reports.len(),
        Some(start.elapsed()),
    );
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
