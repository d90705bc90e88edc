//! Hospital referral candidates and coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TriageError};

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    /// Check the ranges of a (possibly deserialized) position
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TriageError::validation(format!(
                "Latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TriageError::validation(format!(
                "Longitude out of range: {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Where a candidate list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Live answer from the geolocation provider
    Provider,
    /// Static fallback list
    Mock,
}

/// A facility returned by a geolocation provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Facility name
    pub name: String,
    /// Contact phone, when known
    pub phone: Option<String>,
    /// Facility position
    pub coordinates: Coordinates,
}

impl Facility {
    /// Create a new facility
    #[must_use]
    pub fn new(name: impl Into<String>, phone: Option<&str>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            phone: phone.map(str::to_string),
            coordinates,
        }
    }
}

/// A ranked referral candidate (transient, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCandidate {
    /// Facility name
    pub name: String,
    /// Distance from the patient in kilometers
    pub distance_km: f64,
    /// Contact phone, when known
    pub phone: Option<String>,
    /// Facility position
    pub coordinates: Coordinates,
    /// Provider answer or mock fallback
    pub source: CandidateSource,
}

impl fmt::Display for HospitalCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} km)", self.name, self.distance_km)?;
        if let Some(phone) = &self.phone {
            write!(f, " tel. {phone}")?;
        }
        Ok(())
    }
}
