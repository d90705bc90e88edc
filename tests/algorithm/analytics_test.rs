use chrono::{Duration, Utc};
use fever_triage::{
    Actor, CaseSummary, Disease, LifecycleState, ReviewerStats, Role, SeverityTier,
    TransitionCommand, rising_diseases,
};

use crate::utils::{chemist, clinician, doctor, intake, manager_with, stocked_inventory};

#[test]
fn test_summary_over_managed_records() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let critical = manager.create(&clinician(), &intake(Disease::Dengue, 30.0, &[])?)?;
    let mild = manager.create(&clinician(), &intake(Disease::Dengue, 220.0, &[])?)?;
    let rejected = manager.create(&clinician(), &intake(Disease::Malaria, 220.0, &["chills"])?)?;

    manager.transition(critical.id, LifecycleState::Reviewed, &doctor())?;
    manager.transition(critical.id, LifecycleState::Prescribed, &doctor())?;
    manager.transition(critical.id, LifecycleState::Dispensed, &chemist())?;
    manager.transition(rejected.id, LifecycleState::Rejected, &doctor())?;

    let summary = CaseSummary::from_records(&manager.records());
    assert_eq!(summary.total, 3);
    assert_eq!(summary.open, 1);
    assert_eq!(summary.dispensed, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.by_disease.get(&Disease::Dengue), Some(&2));
    assert_eq!(summary.by_disease.get(&Disease::Malaria), Some(&1));
    assert_eq!(summary.by_severity.get(&SeverityTier::Critical), Some(&1));
    assert_eq!(summary.by_severity.get(&SeverityTier::Mild), Some(&2));
    assert!(summary.to_string().starts_with("3 cases"));

    assert_eq!(manager.get(mild.id)?.state, LifecycleState::Created);
    Ok(())
}

#[test]
fn test_new_cases_count_as_rising() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    manager.create(&clinician(), &intake(Disease::Typhoid, 200.0, &[])?)?;
    manager.create(&clinician(), &intake(Disease::Typhoid, 200.0, &[])?)?;

    let trends = rising_diseases(&manager.records(), Utc::now());
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].disease, Disease::Typhoid);
    assert_eq!(trends[0].current_week, 2);
    assert_eq!(trends[0].previous_week, 0);
    assert!((trends[0].increase_percent - 100.0).abs() < f64::EPSILON);

    let next_month = Utc::now() + Duration::days(30);
    assert!(rising_diseases(&manager.records(), next_month).is_empty());
    Ok(())
}

#[test]
fn test_reviewer_stats_over_managed_records() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let approved = manager.create(&clinician(), &intake(Disease::Dengue, 30.0, &[])?)?;
    let corrected = manager.create(&clinician(), &intake(Disease::Malaria, 220.0, &[])?)?;
    let rejected = manager.create(&clinician(), &intake(Disease::Typhoid, 220.0, &[])?)?;
    let other = manager.create(&clinician(), &intake(Disease::ViralFever, 220.0, &[])?)?;
    manager.create(&clinician(), &intake(Disease::Dengue, 20.0, &[])?)?;
    manager.create(&clinician(), &intake(Disease::Malaria, 220.0, &[])?)?;

    manager.transition(approved.id, LifecycleState::Reviewed, &doctor())?;
    manager.apply(
        corrected.id,
        TransitionCommand::Review {
            severity_override: Some(SeverityTier::Moderate),
            recommendations_override: None,
            notes: None,
        },
        &doctor(),
    )?;
    manager.transition(rejected.id, LifecycleState::Rejected, &doctor())?;
    let second = Actor::new("second@example.com", Role::Doctor);
    manager.transition(other.id, LifecycleState::Reviewed, &second)?;

    let stats = ReviewerStats::for_doctor(&manager.records(), "doctor@example.com", Utc::now());
    assert_eq!(stats.pending_reviews, 2);
    assert_eq!(stats.critical_pending, 1);
    assert_eq!(stats.total_verified, 3);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.corrected, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.verified_today, 2);
    assert_eq!(stats.accuracy_rate, 67);

    let second_stats = ReviewerStats::for_doctor(&manager.records(), &second.id, Utc::now());
    assert_eq!(second_stats.total_verified, 1);
    assert_eq!(second_stats.accuracy_rate, 100);
    Ok(())
}
