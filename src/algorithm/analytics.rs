//! Case analytics over diagnosis records

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::algorithm::triage::suggested_medicines;
use crate::models::diagnosis::{DiagnosisRecord, LifecycleState, NotificationKind};
use crate::models::disease::Disease;
use crate::models::severity::SeverityTier;

/// Length of one comparison window
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Counts over a set of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// All records
    pub total: usize,
    /// Records not yet in a terminal state
    pub open: usize,
    /// Records whose medication was dispensed
    pub dispensed: usize,
    /// Records rejected on review
    pub rejected: usize,
    /// Records per disease
    pub by_disease: BTreeMap<Disease, usize>,
    /// Records per current severity tier
    pub by_severity: BTreeMap<SeverityTier, usize>,
}

impl CaseSummary {
    /// Summarize a set of records
    #[must_use]
    pub fn from_records(records: &[DiagnosisRecord]) -> Self {
        Self {
            total: records.len(),
            open: records.iter().filter(|r| !r.is_closed()).count(),
            dispensed: records
                .iter()
                .filter(|r| r.state == LifecycleState::Dispensed)
                .count(),
            rejected: records
                .iter()
                .filter(|r| r.state == LifecycleState::Rejected)
                .count(),
            by_disease: records.iter().map(|r| r.disease).counts().into_iter().collect(),
            by_severity: records.iter().map(|r| r.severity).counts().into_iter().collect(),
        }
    }
}

impl fmt::Display for CaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} cases ({} open, {} dispensed, {} rejected)",
            self.total, self.open, self.dispensed, self.rejected
        )?;
        for (disease, count) in &self.by_disease {
            writeln!(f, "  {disease}: {count}")?;
        }
        for (tier, count) in &self.by_severity {
            writeln!(f, "  {tier}: {count}")?;
        }
        Ok(())
    }
}

/// Review workload and outcomes for one doctor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStats {
    /// Doctor the stats belong to
    pub doctor_id: String,
    /// Records still waiting for any review
    pub pending_reviews: usize,
    /// Pending records classified Critical
    pub critical_pending: usize,
    /// Records this doctor reviewed on the current UTC day and did not reject
    pub verified_today: usize,
    /// Records this doctor verified or rejected
    pub total_verified: usize,
    /// Reviews by this doctor that changed severity or recommendations
    pub corrected: usize,
    /// Reviews by this doctor accepted as classified
    pub approved: usize,
    /// Records this doctor rejected
    pub rejected: usize,
    /// Share of accepted reviews (approved or corrected) in percent, rounded; 0 without reviews
    pub accuracy_rate: u32,
}

impl ReviewerStats {
    /// Compute the stats of `doctor_id` over a set of records
    ///
    /// # Arguments
    /// * `records` - Records to inspect
    /// * `doctor_id` - Identity recorded in `verified_by`
    /// * `now` - Reference time for "today"
    #[must_use]
    pub fn for_doctor(records: &[DiagnosisRecord], doctor_id: &str, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let pending = records
            .iter()
            .filter(|r| r.state == LifecycleState::Created);
        let mine: Vec<&DiagnosisRecord> = records
            .iter()
            .filter(|r| r.verified_by.as_deref() == Some(doctor_id))
            .collect();

        let (rejected, accepted): (Vec<&DiagnosisRecord>, Vec<&DiagnosisRecord>) = mine
            .iter()
            .copied()
            .partition(|r| r.state == LifecycleState::Rejected);
        let corrected = accepted
            .iter()
            .filter(|r| {
                r.notifications
                    .iter()
                    .any(|n| n.kind == NotificationKind::Corrected && n.from_actor == doctor_id)
            })
            .count();
        let verified_today = accepted
            .iter()
            .filter(|r| {
                r.history.iter().any(|h| {
                    h.to == LifecycleState::Reviewed
                        && h.actor_id == doctor_id
                        && h.at.date_naive() == today
                })
            })
            .count();

        let reviewed = accepted.len() + rejected.len();
        let accuracy_rate = if reviewed == 0 {
            0
        } else {
            (accepted.len() as f64 / reviewed as f64 * 100.0).round() as u32
        };

        Self {
            doctor_id: doctor_id.to_string(),
            pending_reviews: pending.clone().count(),
            critical_pending: pending
                .filter(|r| r.severity == SeverityTier::Critical)
                .count(),
            verified_today,
            total_verified: mine.len(),
            corrected,
            approved: accepted.len() - corrected,
            rejected: rejected.len(),
            accuracy_rate,
        }
    }
}

impl fmt::Display for ReviewerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} pending ({} critical), {} verified today",
            self.doctor_id, self.pending_reviews, self.critical_pending, self.verified_today
        )?;
        writeln!(
            f,
            "  {} verified: {} approved, {} corrected, {} rejected ({}% accepted)",
            self.total_verified, self.approved, self.corrected, self.rejected, self.accuracy_rate
        )
    }
}

/// Week-over-week increase for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseTrend {
    /// Disease
    pub disease: Disease,
    /// Cases created in the last 7 days
    pub current_week: usize,
    /// Cases created in the 7 days before that
    pub previous_week: usize,
    /// `current_week - previous_week`
    pub increase: usize,
    /// Percentage increase, one decimal; 100 when the previous week had none
    pub increase_percent: f64,
    /// Medicines worth stocking up on
    pub medicines: Vec<String>,
}

fn count_in_window(
    records: &[DiagnosisRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BTreeMap<Disease, usize> {
    records
        .iter()
        .filter(|r| r.created_at >= start && r.created_at < end)
        .map(|r| r.disease)
        .counts()
        .into_iter()
        .collect()
}

/// Diseases with more cases this week than last week
///
/// # Arguments
/// * `records` - Records to inspect
/// * `now` - End of the current window
///
/// # Returns
/// Trends sorted by percentage increase, highest first
#[must_use]
pub fn rising_diseases(records: &[DiagnosisRecord], now: DateTime<Utc>) -> Vec<DiseaseTrend> {
    let window = Duration::days(TREND_WINDOW_DAYS);
    let current = count_in_window(records, now - window, now + Duration::seconds(1));
    let previous = count_in_window(records, now - window - window, now - window);

    let mut trends: Vec<DiseaseTrend> = Disease::ALL
        .into_iter()
        .filter_map(|disease| {
            let current_week = current.get(&disease).copied().unwrap_or(0);
            let previous_week = previous.get(&disease).copied().unwrap_or(0);
            if current_week <= previous_week {
                return None;
            }
            let increase = current_week - previous_week;
            let increase_percent = if previous_week == 0 {
                100.0
            } else {
                let pct = increase as f64 / previous_week as f64 * 100.0;
                (pct * 10.0).round() / 10.0
            };
            Some(DiseaseTrend {
                disease,
                current_week,
                previous_week,
                increase,
                increase_percent,
                medicines: suggested_medicines(disease)
                    .iter()
                    .map(|m| (*m).to_string())
                    .collect(),
            })
        })
        .collect();

    trends.sort_by(|a, b| b.increase_percent.total_cmp(&a.increase_percent));
    trends
}
