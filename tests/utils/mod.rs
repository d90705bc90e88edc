use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use fever_triage::algorithm::hospital::GeolocationProvider;
use fever_triage::models::hospital::Facility;
use fever_triage::{
    Actor, Coordinates, DiagnosisLifecycleManager, Disease, InMemoryDiagnosisStore, Inventory,
    InventoryItem, LabPanel, LabUnit, Result, Role, SymptomSet, TriageConfig, TriageError,
    ValidatedIntake,
};

/// Patient position used across tests (Bengaluru city centre)
#[must_use]
pub fn patient_position() -> Coordinates {
    Coordinates {
        latitude: 12.9716,
        longitude: 77.5946,
    }
}

/// A facility roughly `km_north` kilometers north of the patient
#[must_use]
pub fn facility_north(name: &str, km_north: f64) -> Facility {
    let origin = patient_position();
    Facility::new(
        name,
        Some("080-0000000"),
        Coordinates {
            latitude: origin.latitude + km_north / 111.195,
            longitude: origin.longitude,
        },
    )
}

#[must_use]
pub fn clinician() -> Actor {
    Actor::new("clinician@example.com", Role::Clinician)
}

#[must_use]
pub fn doctor() -> Actor {
    Actor::new("doctor@example.com", Role::Doctor)
}

#[must_use]
pub fn chemist() -> Actor {
    Actor::new("chemist@example.com", Role::Chemist)
}

#[must_use]
pub fn patient() -> Actor {
    Actor::new("patient@example.com", Role::Patient)
}

/// Validated intake with a platelet count in ×10³/µL and the given symptoms
pub fn intake(disease: Disease, platelets: f64, symptoms: &[&str]) -> Result<ValidatedIntake> {
    Ok(ValidatedIntake {
        patient_ref: "P-0001".to_string(),
        disease,
        labs: LabPanel::new().with_platelet(platelets, LabUnit::ThousandPerMicroliter)?,
        symptoms: SymptomSet::from_identifiers(symptoms, None)?,
        coordinates: Some(patient_position()),
    })
}

/// Inventory holding enough of every suggested medicine for a few cases
#[must_use]
pub fn stocked_inventory() -> Inventory {
    Inventory::with_items([
        InventoryItem::new("Paracetamol 500mg", 50, "tablets"),
        InventoryItem::new("ORS Powder", 20, "sachets"),
        InventoryItem::new("IV Fluids", 2, "bags").with_reorder_level(1),
        InventoryItem::new("Artemether-Lumefantrine", 12, "packs"),
        InventoryItem::new("Azithromycin 500mg", 30, "tablets"),
        InventoryItem::new("Ceftriaxone Injection", 25, "vials"),
        InventoryItem::new("Vitamin C 500mg", 40, "tablets"),
    ])
}

/// Manager over an in-memory store and the given inventory
#[must_use]
pub fn manager_with(inventory: Inventory) -> DiagnosisLifecycleManager {
    DiagnosisLifecycleManager::new(
        Arc::new(InMemoryDiagnosisStore::new()),
        Arc::new(inventory),
        TriageConfig::default(),
    )
}

/// Provider that always fails
pub struct FailingProvider;

impl GeolocationProvider for FailingProvider {
    fn find_nearby<'a>(
        &'a self,
        _coordinates: &'a Coordinates,
        _radius_km: f64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Facility>>> + Send + 'a>> {
        Box::pin(async { Err(TriageError::ProviderUnavailable("upstream returned 503".into())) })
    }
}

/// Provider that never answers in time
pub struct HangingProvider;

impl GeolocationProvider for HangingProvider {
    fn find_nearby<'a>(
        &'a self,
        _coordinates: &'a Coordinates,
        _radius_km: f64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Facility>>> + Send + 'a>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        })
    }
}
