//! Hospital referral lookup
//!
//! Critical cases are referred to nearby facilities. The facility search is
//! delegated to a pluggable [`GeolocationProvider`]; the finder bounds every
//! query with a timeout and degrades to a fixed mock list whenever the
//! provider cannot answer. Callers always receive a candidate list, never a
//! provider error.

pub mod geodesic;
pub mod static_provider;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::config::HospitalSearchConfig;
use crate::error::{Result, TriageError};
use crate::models::hospital::{CandidateSource, Coordinates, Facility, HospitalCandidate};
use crate::models::severity::SeverityTier;

pub use geodesic::distance_km;
pub use static_provider::StaticDirectoryProvider;

/// Source of nearby facilities
///
/// Implementations may perform network I/O and may fail; failures are
/// reported as `ProviderUnavailable` and absorbed by the finder.
pub trait GeolocationProvider: Send + Sync {
    /// Facilities within `radius_km` of `coordinates`
    fn find_nearby<'a>(
        &'a self,
        coordinates: &'a Coordinates,
        radius_km: f64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Facility>>> + Send + 'a>>;

    /// Name used in log messages
    fn name(&self) -> &str {
        "geolocation provider"
    }
}

/// Ranked candidates plus where they came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalSearch {
    /// Candidates sorted by non-decreasing distance
    pub candidates: Vec<HospitalCandidate>,
    /// Provider answer or mock fallback
    pub source: CandidateSource,
}

impl HospitalSearch {
    /// Whether the list is the mock fallback
    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.source == CandidateSource::Mock
    }
}

const MOCK_FACILITIES: [(&str, &str, f64, f64, f64); 3] = [
    ("City General Hospital", "108", 2.4, 0.0, 0.0),
    ("District Government Hospital", "102", 4.7, 0.0, 0.0),
    ("Community Health Centre", "104", 7.9, 0.0, 0.0),
];

/// The fixed fallback list, tagged as mock
///
/// Mock entries have no real location: their coordinates are `(0.0, 0.0)`
/// placeholders and `distance_km` is a nominal value, not a computed one.
#[must_use]
pub fn mock_hospitals() -> Vec<HospitalCandidate> {
    MOCK_FACILITIES
        .iter()
        .map(|(name, phone, distance, latitude, longitude)| HospitalCandidate {
            name: (*name).to_string(),
            distance_km: *distance,
            phone: Some((*phone).to_string()),
            coordinates: Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            },
            source: CandidateSource::Mock,
        })
        .collect()
}

/// Rank provider facilities: within radius, nearest first, at most `max_results`
#[must_use]
pub fn rank_facilities(
    origin: &Coordinates,
    facilities: Vec<Facility>,
    radius_km: f64,
    max_results: usize,
) -> Vec<HospitalCandidate> {
    let mut candidates: Vec<HospitalCandidate> = facilities
        .into_iter()
        .filter_map(|facility| {
            let distance = distance_km(origin, &facility.coordinates);
            (distance <= radius_km).then(|| HospitalCandidate {
                name: facility.name,
                distance_km: distance,
                phone: facility.phone,
                coordinates: facility.coordinates,
                source: CandidateSource::Provider,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates.truncate(max_results);
    candidates
}

/// Finds and ranks nearby hospitals with a bounded wait
#[derive(Clone)]
pub struct HospitalFinder {
    provider: Option<Arc<dyn GeolocationProvider>>,
    config: HospitalSearchConfig,
}

impl HospitalFinder {
    /// Create a finder backed by a provider
    #[must_use]
    pub fn new(provider: Arc<dyn GeolocationProvider>, config: HospitalSearchConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }

    /// Create a finder with no provider; every search returns the mock list
    #[must_use]
    pub const fn without_provider(config: HospitalSearchConfig) -> Self {
        Self {
            provider: None,
            config,
        }
    }

    /// Search settings in use
    #[must_use]
    pub const fn config(&self) -> &HospitalSearchConfig {
        &self.config
    }

    async fn query_provider(&self, coordinates: &Coordinates) -> Result<Vec<HospitalCandidate>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| TriageError::ProviderUnavailable("no provider configured".into()))?;

        let query = provider.find_nearby(coordinates, self.config.radius_km);
        let facilities = tokio::time::timeout(self.config.timeout(), query)
            .await
            .map_err(|_| {
                TriageError::ProviderUnavailable(format!(
                    "{} timed out after {} ms",
                    provider.name(),
                    self.config.timeout_ms
                ))
            })??;

        Ok(rank_facilities(
            coordinates,
            facilities,
            self.config.radius_km,
            self.config.max_results,
        ))
    }

    /// Find hospitals near the patient
    ///
    /// Withheld or out-of-range coordinates, a missing provider, provider
    /// errors and timeouts all yield the mock list.
    pub async fn find_hospitals(&self, coordinates: Option<Coordinates>) -> HospitalSearch {
        let Some(coordinates) = coordinates else {
            debug!("No coordinates shared; using mock hospital list");
            return Self::fallback();
        };
        if let Err(e) = coordinates.validate() {
            warn!("Ignoring patient position, using mock hospital list: {e}");
            return Self::fallback();
        }

        match self.query_provider(&coordinates).await {
            Ok(candidates) => {
                debug!(
                    "Provider returned {} hospitals near {}",
                    candidates.len(),
                    coordinates
                );
                HospitalSearch {
                    candidates,
                    source: CandidateSource::Provider,
                }
            }
            Err(e) => {
                warn!("Hospital lookup failed, falling back to mock list: {e}");
                Self::fallback()
            }
        }
    }

    /// Hospital referrals for a classified case; only Critical cases are referred
    pub async fn referrals(
        &self,
        tier: SeverityTier,
        coordinates: Option<Coordinates>,
    ) -> Option<HospitalSearch> {
        if tier.needs_referral() {
            Some(self.find_hospitals(coordinates).await)
        } else {
            None
        }
    }

    /// Run the lookup in the background so the diagnosis can be returned first
    #[must_use]
    pub fn spawn_referral_lookup(
        self: Arc<Self>,
        coordinates: Option<Coordinates>,
    ) -> JoinHandle<HospitalSearch> {
        tokio::spawn(async move { self.find_hospitals(coordinates).await })
    }

    fn fallback() -> HospitalSearch {
        HospitalSearch {
            candidates: mock_hospitals(),
            source: CandidateSource::Mock,
        }
    }
}

impl std::fmt::Debug for HospitalFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HospitalFinder")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("config", &self.config)
            .finish()
    }
}
