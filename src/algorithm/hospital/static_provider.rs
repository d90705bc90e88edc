//! In-memory facility directory

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::GeolocationProvider;
use super::geodesic::within_radius;
use crate::error::Result;
use crate::models::hospital::{Coordinates, Facility};

/// A fixed list of facilities searched by great-circle distance
#[derive(Debug, Clone, Default)]
pub struct StaticDirectoryProvider {
    facilities: Vec<Facility>,
    latency: Option<Duration>,
}

impl StaticDirectoryProvider {
    /// Create a directory over the given facilities
    #[must_use]
    pub const fn new(facilities: Vec<Facility>) -> Self {
        Self {
            facilities,
            latency: None,
        }
    }

    /// Delay every answer, e.g. to model a slow upstream service
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of facilities in the directory
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the directory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl GeolocationProvider for StaticDirectoryProvider {
    fn find_nearby<'a>(
        &'a self,
        coordinates: &'a Coordinates,
        radius_km: f64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Facility>>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            Ok(self
                .facilities
                .iter()
                .filter(|f| within_radius(coordinates, &f.coordinates, radius_km))
                .cloned()
                .collect())
        })
    }

    fn name(&self) -> &str {
        "static directory"
    }
}
