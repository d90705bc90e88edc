use std::sync::Arc;
use std::time::{Duration, Instant};

use fever_triage::algorithm::hospital::{HospitalFinder, StaticDirectoryProvider, mock_hospitals};
use fever_triage::config::HospitalSearchConfig;
use fever_triage::models::hospital::CandidateSource;
use fever_triage::{Coordinates, SeverityTier};

use crate::utils::{FailingProvider, HangingProvider, facility_north, patient_position};

fn directory() -> StaticDirectoryProvider {
    StaticDirectoryProvider::new(vec![
        facility_north("Far Hospital", 25.0),
        facility_north("Third Hospital", 6.0),
        facility_north("Nearest Clinic", 1.0),
        facility_north("Fourth Hospital", 8.0),
        facility_north("Second Hospital", 3.0),
    ])
}

#[tokio::test]
async fn test_provider_results_are_ranked_and_capped() {
    let finder = HospitalFinder::new(Arc::new(directory()), HospitalSearchConfig::default());
    let search = finder.find_hospitals(Some(patient_position())).await;

    assert_eq!(search.source, CandidateSource::Provider);
    assert_eq!(search.candidates.len(), 3);
    let names: Vec<_> = search.candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Nearest Clinic", "Second Hospital", "Third Hospital"]);
    assert!(
        search
            .candidates
            .windows(2)
            .all(|w| w[0].distance_km <= w[1].distance_km)
    );
    assert!(search.candidates.iter().all(|c| c.distance_km <= 10.0));
    assert!(search.candidates.iter().all(|c| c.phone.is_some()));
}

#[tokio::test]
async fn test_withheld_coordinates_return_mock() {
    let finder = HospitalFinder::new(Arc::new(directory()), HospitalSearchConfig::default());
    let search = finder.find_hospitals(None).await;
    assert!(search.is_mock());
    assert_eq!(search.candidates, mock_hospitals());
}

#[tokio::test]
async fn test_out_of_range_coordinates_return_mock() {
    let finder = HospitalFinder::new(Arc::new(directory()), HospitalSearchConfig::default());
    for position in [
        Coordinates {
            latitude: 123.0,
            longitude: 77.5946,
        },
        Coordinates {
            latitude: 12.9716,
            longitude: f64::NAN,
        },
    ] {
        let search = finder.find_hospitals(Some(position)).await;
        assert!(search.is_mock());
        assert_eq!(search.candidates, mock_hospitals());
    }
}

#[tokio::test]
async fn test_provider_failure_falls_back_to_mock() {
    let finder = HospitalFinder::new(Arc::new(FailingProvider), HospitalSearchConfig::default());
    let search = finder.find_hospitals(Some(patient_position())).await;
    assert!(search.is_mock());
    assert!(search.candidates.len() <= 3);
}

#[tokio::test]
async fn test_timeout_bounds_the_wait() {
    let config = HospitalSearchConfig {
        timeout_ms: 50,
        ..HospitalSearchConfig::default()
    };
    let finder = HospitalFinder::new(Arc::new(HangingProvider), config);

    let start = Instant::now();
    let search = finder.find_hospitals(Some(patient_position())).await;
    assert!(search.is_mock());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_slow_directory_within_timeout_still_answers() {
    let provider = directory().with_latency(Duration::from_millis(10));
    let finder = HospitalFinder::new(Arc::new(provider), HospitalSearchConfig::default());
    let search = finder.find_hospitals(Some(patient_position())).await;
    assert_eq!(search.source, CandidateSource::Provider);
}

#[tokio::test]
async fn test_empty_provider_answer_is_not_mock() {
    let finder = HospitalFinder::new(
        Arc::new(StaticDirectoryProvider::new(vec![facility_north("Remote", 40.0)])),
        HospitalSearchConfig::default(),
    );
    let search = finder.find_hospitals(Some(patient_position())).await;
    assert_eq!(search.source, CandidateSource::Provider);
    assert!(search.candidates.is_empty());
}

#[tokio::test]
async fn test_background_lookup_for_critical_case() {
    let finder = Arc::new(HospitalFinder::new(
        Arc::new(directory()),
        HospitalSearchConfig::default(),
    ));
    assert!(
        finder
            .referrals(SeverityTier::Mild, Some(patient_position()))
            .await
            .is_none()
    );

    let handle = Arc::clone(&finder).spawn_referral_lookup(Some(patient_position()));
    let search = handle.await.unwrap();
    assert_eq!(search.candidates[0].name, "Nearest Clinic");
}
