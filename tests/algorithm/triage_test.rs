use fever_triage::algorithm::triage::recommendations::{disease_items, severity_items};
use fever_triage::models::recommendation::RecommendationOrigin;
use fever_triage::{
    Disease, LabName, LabPanel, LabSignal, LabUnit, SeverityRule, SeverityTier, SymptomSet,
    TriageConfig, TriageError, TriageIntake, classify_batch, classify_intake, classify_with,
};

fn intake_from_json(json: &str) -> TriageIntake {
    serde_json::from_str(json).expect("valid intake JSON")
}

#[test]
fn test_lab_signals_cover_every_lab() {
    let config = TriageConfig::default();
    let panels = [
        LabPanel::new(),
        LabPanel::new()
            .with_wbc(12.5, LabUnit::ThousandPerMicroliter)
            .unwrap(),
        LabPanel::new()
            .with_platelet(100_000.0, LabUnit::PerMicroliter)
            .unwrap()
            .with_wbc(4.5, LabUnit::ThousandPerMicroliter)
            .unwrap()
            .with_rbc(4.8, LabUnit::MillionPerMicroliter)
            .unwrap(),
    ];

    for panel in &panels {
        let outcome = classify_with(&config, panel, &SymptomSet::new(), Disease::Other);
        assert_eq!(outcome.lab_signals.len(), LabName::ALL.len());
        for lab in LabName::ALL {
            let signal = outcome.lab_signals.get(lab);
            assert_eq!(signal == LabSignal::Unknown, panel.get(lab).is_none());
        }
    }
}

#[test]
fn test_critical_rule_dominates_everything_else() {
    let config = TriageConfig::default();
    let labs = LabPanel::new()
        .with_wbc(45.0, LabUnit::ThousandPerMicroliter)
        .unwrap()
        .with_rbc(3.0, LabUnit::MillionPerMicroliter)
        .unwrap()
        .with_platelet(100.0, LabUnit::ThousandPerMicroliter)
        .unwrap();
    let symptoms = SymptomSet::from_identifiers(
        &["headache", "fatigue", "chills", "sweating", "cough"],
        None,
    )
    .unwrap();

    let outcome = classify_with(&config, &labs, &symptoms, Disease::ViralFever);
    assert_eq!(outcome.severity, SeverityTier::Critical);
    assert_eq!(outcome.rule, SeverityRule::CriticalSignal);

    let lab_items: Vec<_> = outcome
        .recommendations
        .by_origin(RecommendationOrigin::Lab)
        .map(|r| r.text.as_str())
        .collect();
    assert_eq!(lab_items.len(), 3);
    assert!(lab_items[0].starts_with("Platelet count is low"));
    assert!(lab_items[1].starts_with("White blood cell count is critically high"));
    assert!(lab_items[2].starts_with("Red blood cell count is low"));
}

#[test]
fn test_danger_symptom_alone_is_critical() {
    let config = TriageConfig::default();
    let symptoms = SymptomSet::from_identifiers(&["altered_consciousness"], None).unwrap();
    let outcome = classify_with(&config, &LabPanel::new(), &symptoms, Disease::Malaria);
    assert_eq!(outcome.severity, SeverityTier::Critical);
    assert_eq!(outcome.rule, SeverityRule::DangerSymptom);
    assert!(outcome.symptoms.has_danger_symptom);
    assert!(!outcome.insufficient_data);
}

#[test]
fn test_danger_subset_is_configurable() {
    let config = TriageConfig::builder()
        .danger_symptoms([fever_triage::Symptom::Rash])
        .build()
        .unwrap();
    let bleeding = SymptomSet::from_identifiers(&["bleeding"], None).unwrap();
    let rash = SymptomSet::from_identifiers(&["rash"], None).unwrap();

    let outcome = classify_with(&config, &LabPanel::new(), &bleeding, Disease::Dengue);
    assert_eq!(outcome.severity, SeverityTier::Mild);
    let outcome = classify_with(&config, &LabPanel::new(), &rash, Disease::Dengue);
    assert_eq!(outcome.severity, SeverityTier::Critical);
}

#[test]
fn test_disease_block_absent_only_for_other() {
    let config = TriageConfig::default();
    for disease in Disease::ALL {
        let outcome = classify_with(&config, &LabPanel::new(), &SymptomSet::new(), disease);
        let has_block = outcome.recommendations.has_origin(RecommendationOrigin::Disease);
        assert_eq!(has_block, disease != Disease::Other, "{disease}");
    }
}

#[test]
fn test_dengue_moderate_example() {
    let config = TriageConfig::default();
    let intake = intake_from_json(
        r#"{
            "patient_ref": "P-7",
            "disease": "dengue",
            "platelet_count": {"value": 210},
            "symptoms": ["headache", "joint_pain", "rash", "muscle_pain"]
        }"#,
    );
    let outcome = classify_intake(&config, &intake).unwrap();
    assert_eq!(outcome.severity, SeverityTier::Moderate);
    assert_eq!(outcome.rule, SeverityRule::SymptomBurden);

    let expected: Vec<&str> = severity_items(SeverityTier::Moderate)
        .iter()
        .chain(disease_items(Disease::Dengue))
        .copied()
        .collect();
    assert_eq!(outcome.recommendations.texts(), expected);
}

#[test]
fn test_insufficient_data_is_mild_not_error() {
    let config = TriageConfig::default();
    let intake = intake_from_json(r#"{"patient_ref": "P-8", "disease": "viral fever"}"#);
    let outcome = classify_intake(&config, &intake).unwrap();
    assert_eq!(outcome.severity, SeverityTier::Mild);
    assert!(outcome.insufficient_data);
}

#[test]
fn test_malformed_intakes_are_rejected() {
    let config = TriageConfig::default();
    let cases = [
        r#"{"patient_ref": "P", "disease": "dengue", "symptoms": ["sneezing"]}"#,
        r#"{"patient_ref": "P", "disease": "dengue", "symptoms": ["rash", "rash"]}"#,
        r#"{"patient_ref": "P", "disease": "chikungunya"}"#,
        r#"{"patient_ref": "P", "disease": "malaria", "wbc_count": {"value": -1.0}}"#,
    ];
    for json in cases {
        let err = classify_intake(&config, &intake_from_json(json)).unwrap_err();
        assert!(matches!(err, TriageError::ValidationError(_)), "{json}: {err}");
    }
}

#[test]
fn test_batch_matches_single_classification() {
    let config = TriageConfig::default();
    let intakes: Vec<TriageIntake> = (0..100)
        .map(|i| TriageIntake {
            patient_ref: format!("P-{i}"),
            disease: (if i % 2 == 0 { "malaria" } else { "typhoid" }).to_string(),
            symptoms: if i % 3 == 0 {
                vec!["bleeding".to_string()]
            } else {
                Vec::new()
            },
            ..TriageIntake::default()
        })
        .collect();

    let batch = classify_batch(&config, &intakes);
    assert_eq!(batch.len(), intakes.len());
    for (intake, result) in intakes.iter().zip(&batch) {
        let single = classify_intake(&config, intake).unwrap();
        assert_eq!(result.as_ref().unwrap(), &single);
    }
}
