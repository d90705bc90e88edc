//! Triage severity and recommendation engine
//!
//! Ties the pure stages together: lab signals and the symptom aggregate feed
//! the severity classifier, whose tier drives the recommendation composer.
//! Nothing here touches I/O, so every function is safe to call from any
//! number of threads.

pub mod lab_signal;
pub mod recommendations;
pub mod severity;
pub mod symptoms;

use indicatif::ParallelProgressIterator;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{self, TriageConfig};
use crate::error::Result;
use crate::models::disease::Disease;
use crate::models::intake::{TriageIntake, ValidatedIntake};
use crate::models::lab::LabPanel;
use crate::models::recommendation::RecommendationList;
use crate::models::severity::SeverityTier;
use crate::models::symptom::SymptomSet;
use crate::utils::logging::{
    create_hidden_progress_bar, create_main_progress_bar, finish_progress_bar,
    log_operation_complete,
};

pub use lab_signal::{LabSignal, LabSignals, classify_value, evaluate_labs};
pub use recommendations::{compose_recommendations, suggested_medicines};
pub use severity::{SeverityAssessment, SeverityRule, classify_severity};
pub use symptoms::{SymptomAggregate, aggregate_symptoms};

/// Batches at least this large get a visible progress bar
pub const BATCH_PROGRESS_THRESHOLD: usize = 64;

/// Everything the engine derived for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    /// Disease identity the recommendations were composed for
    pub disease: Disease,
    /// Assigned tier
    pub severity: SeverityTier,
    /// Rule that decided the tier
    pub rule: SeverityRule,
    /// No labs and no symptoms were available
    pub insufficient_data: bool,
    /// Signal per lab
    pub lab_signals: LabSignals,
    /// Symptom summary
    pub symptoms: SymptomAggregate,
    /// Ordered recommendations
    pub recommendations: RecommendationList,
}

impl TriageOutcome {
    /// Whether the case should be referred to a hospital
    #[must_use]
    pub const fn needs_referral(&self) -> bool {
        self.severity.needs_referral()
    }
}

/// Classify a case against the process-wide configuration
#[must_use]
pub fn classify(labs: &LabPanel, symptoms: &SymptomSet, disease: Disease) -> TriageOutcome {
    classify_with(config::global(), labs, symptoms, disease)
}

/// Classify a case against an explicit configuration
///
/// # Arguments
/// * `config` - Thresholds and danger symptoms to use
/// * `labs` - Measured lab values
/// * `symptoms` - Reported symptoms
/// * `disease` - Tentative disease identity
///
/// # Returns
/// The complete `TriageOutcome`
#[must_use]
pub fn classify_with(
    config: &TriageConfig,
    labs: &LabPanel,
    symptoms: &SymptomSet,
    disease: Disease,
) -> TriageOutcome {
    let lab_signals = evaluate_labs(labs, &config.lab_thresholds);
    let aggregate = aggregate_symptoms(symptoms, &config.danger_symptoms);
    let assessment = classify_severity(
        &lab_signals,
        &aggregate,
        disease,
        config.moderate_symptom_threshold,
    );
    let recommendations = compose_recommendations(assessment.tier, disease, &lab_signals);

    debug!(
        "Classified {} case as {} ({}), {} recommendations",
        disease,
        assessment.tier,
        assessment.rule,
        recommendations.len()
    );

    TriageOutcome {
        disease,
        severity: assessment.tier,
        rule: assessment.rule,
        insufficient_data: assessment.insufficient_data,
        lab_signals,
        symptoms: aggregate,
        recommendations,
    }
}

/// Classify an already validated intake
#[must_use]
pub fn classify_validated(config: &TriageConfig, intake: &ValidatedIntake) -> TriageOutcome {
    classify_with(config, &intake.labs, &intake.symptoms, intake.disease)
}

/// Validate and classify a raw intake
///
/// # Errors
/// Returns `ValidationError` if the intake is malformed
pub fn classify_intake(config: &TriageConfig, intake: &TriageIntake) -> Result<TriageOutcome> {
    let validated = intake.validate()?;
    Ok(classify_validated(config, &validated))
}

/// Classify many intakes in parallel
///
/// Output order matches input order. Each intake is validated on its own, so
/// one malformed entry does not fail the batch.
#[must_use]
pub fn classify_batch(
    config: &TriageConfig,
    intakes: &[TriageIntake],
) -> Vec<Result<TriageOutcome>> {
    let start = Instant::now();
    let total = intakes.len() as u64;
    let pb = if intakes.len() >= BATCH_PROGRESS_THRESHOLD {
        create_main_progress_bar(total, Some("Classifying cases"))
    } else {
        create_hidden_progress_bar(total)
    };

    let outcomes: Vec<_> = intakes
        .par_iter()
        .progress_with(pb.clone())
        .map(|intake| classify_intake(config, intake))
        .collect();

    finish_progress_bar(&pb, Some("Classification complete"));
    log_operation_complete("classified", "intake batch", outcomes.len(), Some(start.elapsed()));
    outcomes
}
