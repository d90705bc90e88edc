//! Recommendation composition
//!
//! Builds the ordered recommendation list from three blocks:
//! severity items, then disease items, then one item per out-of-range lab in
//! platelet, WBC, RBC order. The tables are static so repeated calls with the
//! same input yield identical output.

use crate::models::disease::Disease;
use crate::models::lab::LabName;
use crate::models::recommendation::{RecommendationList, RecommendationOrigin};
use crate::models::severity::SeverityTier;

use super::lab_signal::{LabSignal, LabSignals};

const CRITICAL_ITEMS: &[&str] = &[
    "Seek immediate medical care at the nearest hospital emergency department",
    "Call emergency services if the patient becomes drowsy, confused or starts bleeding",
    "Do not wait for symptoms to improve before travelling to a facility",
];

const MODERATE_ITEMS: &[&str] = &[
    "Consult a doctor within 24-48 hours",
    "Monitor temperature every 4-6 hours and keep a written record",
    "Return immediately if warning signs such as bleeding or persistent vomiting appear",
];

const MILD_ITEMS: &[&str] = &[
    "Rest at home and drink plenty of fluids",
    "Use paracetamol for fever; avoid aspirin and ibuprofen until a doctor advises otherwise",
    "Wash hands regularly and keep drinking water clean",
];

const DENGUE_ITEMS: &[&str] = &[
    "Avoid NSAIDs such as aspirin and ibuprofen because of bleeding risk",
    "Repeat platelet count within 24 hours",
    "Use mosquito nets and repellent to prevent further transmission",
];

const MALARIA_ITEMS: &[&str] = &[
    "Confirm with a malaria rapid diagnostic test or blood smear before treatment",
    "Complete the full course of prescribed antimalarials",
    "Sleep under an insecticide-treated bed net",
];

const TYPHOID_ITEMS: &[&str] = &[
    "Drink only boiled or bottled water and eat freshly cooked food",
    "Complete the full antibiotic course even after fever settles",
    "Avoid preparing food for others until cleared by a doctor",
];

const VIRAL_FEVER_ITEMS: &[&str] = &[
    "Maintain oral hydration with ORS or clear fluids",
    "Seek review if fever lasts more than 3 days",
];

/// Severity block for a tier
#[must_use]
pub const fn severity_items(tier: SeverityTier) -> &'static [&'static str] {
    match tier {
        SeverityTier::Critical => CRITICAL_ITEMS,
        SeverityTier::Moderate => MODERATE_ITEMS,
        SeverityTier::Mild => MILD_ITEMS,
    }
}

/// Disease block; empty for `Other`
#[must_use]
pub const fn disease_items(disease: Disease) -> &'static [&'static str] {
    match disease {
        Disease::Dengue => DENGUE_ITEMS,
        Disease::Malaria => MALARIA_ITEMS,
        Disease::Typhoid => TYPHOID_ITEMS,
        Disease::ViralFever => VIRAL_FEVER_ITEMS,
        Disease::Other => &[],
    }
}

fn lab_advice(lab: LabName, signal: LabSignal) -> &'static str {
    match (lab, signal) {
        (LabName::Platelet, LabSignal::Low | LabSignal::CriticalLow) => {
            "watch for bleeding gums, nosebleeds or skin spots"
        }
        (LabName::Platelet, _) => "repeat the count to rule out a reactive rise",
        (LabName::Wbc, LabSignal::Low | LabSignal::CriticalLow) => {
            "infection risk is raised; avoid crowded places"
        }
        (LabName::Wbc, _) => "may indicate a bacterial infection; a doctor should review",
        (LabName::Rbc, LabSignal::Low | LabSignal::CriticalLow) => {
            "may indicate anaemia; watch for dizziness and breathlessness"
        }
        (LabName::Rbc, _) => "may indicate dehydration; increase fluid intake",
    }
}

/// Explanation for one out-of-range lab
#[must_use]
pub fn lab_item(lab: LabName, signal: LabSignal) -> String {
    format!(
        "{} is {}: {}",
        lab.display_name(),
        signal.direction(),
        lab_advice(lab, signal)
    )
}

/// Compose the ordered recommendation list
#[must_use]
pub fn compose_recommendations(
    tier: SeverityTier,
    disease: Disease,
    signals: &LabSignals,
) -> RecommendationList {
    let mut list = RecommendationList::new();
    list.extend_block(RecommendationOrigin::Severity, severity_items(tier).iter().copied());
    list.extend_block(RecommendationOrigin::Disease, disease_items(disease).iter().copied());
    for (lab, signal) in signals.out_of_range() {
        list.push(RecommendationOrigin::Lab, lab_item(lab, signal));
    }
    list
}

/// Suggested medicines for a disease, used for default prescriptions
#[must_use]
pub const fn suggested_medicines(disease: Disease) -> &'static [&'static str] {
    match disease {
        Disease::Dengue => &["Paracetamol 500mg", "ORS Powder", "IV Fluids"],
        Disease::Malaria => &["Artemether-Lumefantrine", "Paracetamol 500mg"],
        Disease::Typhoid => &["Azithromycin 500mg", "Ceftriaxone Injection", "ORS Powder"],
        Disease::ViralFever => &["Paracetamol 500mg", "Vitamin C 500mg", "ORS Powder"],
        Disease::Other => &["Paracetamol 500mg"],
    }
}
