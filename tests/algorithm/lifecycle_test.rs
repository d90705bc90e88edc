use std::sync::Arc;

use fever_triage::algorithm::lifecycle::default_prescription;
use fever_triage::models::diagnosis::NotificationKind;
use fever_triage::{
    Disease, InventoryItem, LifecycleState, Prescription, PrescriptionItem, Role, SeverityTier,
    StaticSessionResolver, TransitionCommand, TriageError,
};

use crate::utils::{
    chemist, clinician, doctor, intake, manager_with, patient, stocked_inventory,
};

#[test]
fn test_full_lifecycle_decrements_inventory() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    assert!(manager.inventory().low_stock().is_empty());
    let record = manager.create(&clinician(), &intake(Disease::Dengue, 40.0, &["rash"])?)?;
    assert_eq!(record.state, LifecycleState::Created);
    assert_eq!(record.severity, SeverityTier::Critical);
    assert_eq!(record.version, 1);

    manager.transition(record.id, LifecycleState::Reviewed, &doctor())?;
    manager.transition(record.id, LifecycleState::Prescribed, &doctor())?;
    let dispensed = manager.transition(record.id, LifecycleState::Dispensed, &chemist())?;

    assert_eq!(dispensed.state, LifecycleState::Dispensed);
    assert_eq!(dispensed.version, 4);
    let path: Vec<_> = dispensed.history.iter().map(|h| (h.from, h.to, h.role)).collect();
    assert_eq!(
        path,
        vec![
            (None, LifecycleState::Created, Role::Clinician),
            (Some(LifecycleState::Created), LifecycleState::Reviewed, Role::Doctor),
            (Some(LifecycleState::Reviewed), LifecycleState::Prescribed, Role::Doctor),
            (Some(LifecycleState::Prescribed), LifecycleState::Dispensed, Role::Chemist),
        ]
    );
    assert!(dispensed.history.windows(2).all(|w| w[0].at <= w[1].at));

    let inventory = manager.inventory();
    assert_eq!(inventory.quantity("Paracetamol 500mg"), 49);
    assert_eq!(inventory.quantity("ORS Powder"), 19);
    assert_eq!(inventory.quantity("IV Fluids"), 1);
    let low: Vec<_> = inventory.low_stock().into_iter().map(|i| i.drug_name).collect();
    assert_eq!(low, vec!["IV Fluids".to_string()]);

    let kinds: Vec<_> = dispensed.notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Approved,
            NotificationKind::Prescribed,
            NotificationKind::Dispensed
        ]
    );
    Ok(())
}

#[test]
fn test_dispensed_is_terminal() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Malaria, 200.0, &[])?)?;
    manager.transition(record.id, LifecycleState::Reviewed, &doctor())?;
    manager.transition(record.id, LifecycleState::Prescribed, &doctor())?;
    manager.transition(record.id, LifecycleState::Dispensed, &chemist())?;

    let targets = [
        LifecycleState::Created,
        LifecycleState::Reviewed,
        LifecycleState::Prescribed,
        LifecycleState::Dispensed,
        LifecycleState::Rejected,
    ];
    for target in targets {
        for actor in [clinician(), doctor(), chemist(), patient()] {
            let err = manager.transition(record.id, target, &actor).unwrap_err();
            assert!(
                matches!(err, TriageError::InvalidTransition { from: LifecycleState::Dispensed, .. }),
                "{target} by {}: {err}",
                actor.role
            );
        }
    }
    Ok(())
}

#[test]
fn test_wrong_role_leaves_record_unchanged() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Typhoid, 200.0, &[])?)?;

    for actor in [clinician(), chemist(), patient()] {
        let err = manager
            .transition(record.id, LifecycleState::Reviewed, &actor)
            .unwrap_err();
        assert!(matches!(err, TriageError::InvalidTransition { .. }));
    }
    let err = manager
        .transition(record.id, LifecycleState::Prescribed, &doctor())
        .unwrap_err();
    assert!(matches!(
        err,
        TriageError::InvalidTransition {
            from: LifecycleState::Created,
            to: LifecycleState::Prescribed,
            role: Role::Doctor
        }
    ));

    assert_eq!(manager.get(record.id)?, record);
    Ok(())
}

#[test]
fn test_rejection_from_reviewed() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::ViralFever, 200.0, &[])?)?;
    manager.transition(record.id, LifecycleState::Reviewed, &doctor())?;
    let rejected = manager.apply(
        record.id,
        TransitionCommand::Reject {
            notes: Some("Symptoms point to a different cause".into()),
        },
        &doctor(),
    )?;
    assert_eq!(rejected.state, LifecycleState::Rejected);
    assert_eq!(rejected.doctor_notes.as_deref(), Some("Symptoms point to a different cause"));
    let last = rejected.notifications.last().unwrap();
    assert_eq!(last.kind, NotificationKind::Rejected);
    assert_eq!(last.message, "Symptoms point to a different cause");

    let err = manager
        .transition(record.id, LifecycleState::Prescribed, &doctor())
        .unwrap_err();
    assert!(matches!(err, TriageError::InvalidTransition { .. }));
    Ok(())
}

#[test]
fn test_reviewer_can_replace_recommendations() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Dengue, 200.0, &[])?)?;
    let reviewed = manager.apply(
        record.id,
        TransitionCommand::Review {
            severity_override: None,
            recommendations_override: Some(vec![
                "Repeat CBC tomorrow morning".into(),
                "Return if abdominal pain starts".into(),
            ]),
            notes: None,
        },
        &doctor(),
    )?;
    assert_eq!(
        reviewed.recommendations.texts(),
        vec!["Repeat CBC tomorrow morning", "Return if abdominal pain starts"]
    );
    assert_eq!(reviewed.notifications[0].kind, NotificationKind::Corrected);
    assert_eq!(reviewed.verified_by.as_deref(), Some("doctor@example.com"));
    Ok(())
}

#[test]
fn test_insufficient_stock_blocks_dispense() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Dengue, 200.0, &[])?)?;
    manager.transition(record.id, LifecycleState::Reviewed, &doctor())?;
    let prescription = Prescription::new(vec![
        PrescriptionItem::new("Paracetamol 500mg", 10),
        PrescriptionItem::new("IV Fluids", 5),
    ]);
    manager.apply(
        record.id,
        TransitionCommand::Prescribe {
            prescription: Some(prescription),
        },
        &doctor(),
    )?;
    let before = manager.get(record.id)?;

    let err = manager
        .transition(record.id, LifecycleState::Dispensed, &chemist())
        .unwrap_err();
    assert!(matches!(
        err,
        TriageError::InsufficientInventory { requested: 5, available: 2, .. }
    ));
    assert_eq!(manager.get(record.id)?, before);
    assert_eq!(manager.inventory().quantity("Paracetamol 500mg"), 50);

    manager
        .inventory()
        .restock(InventoryItem::new("IV Fluids", 10, "bags"));
    let dispensed = manager.transition(record.id, LifecycleState::Dispensed, &chemist())?;
    assert_eq!(dispensed.state, LifecycleState::Dispensed);
    assert_eq!(manager.inventory().quantity("IV Fluids"), 7);
    Ok(())
}

#[test]
fn test_concurrent_reviews_only_one_wins() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Malaria, 200.0, &[])?)?;

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = &manager;
                scope.spawn(move || manager.transition(record.id, LifecycleState::Reviewed, &doctor()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        TriageError::InvalidTransition {
            from: LifecycleState::Reviewed,
            ..
        }
    )));

    let stored = manager.get(record.id)?;
    assert_eq!(stored.version, 2);
    assert_eq!(stored.history.len(), 2);
    assert_eq!(stored.notifications.len(), 1);
    Ok(())
}

#[test]
fn test_token_based_transition() -> anyhow::Result<()> {
    let sessions = StaticSessionResolver::new()
        .with_session("tok-doctor", doctor())
        .with_session("tok-chemist", chemist());
    let manager = manager_with(stocked_inventory()).with_sessions(Arc::new(sessions));
    let record = manager.create(&clinician(), &intake(Disease::Typhoid, 200.0, &[])?)?;

    let err = manager
        .transition_with_token(record.id, LifecycleState::Reviewed, "tok-unknown")
        .unwrap_err();
    assert!(matches!(err, TriageError::ValidationError(_)));

    let err = manager
        .transition_with_token(record.id, LifecycleState::Reviewed, "tok-chemist")
        .unwrap_err();
    assert!(matches!(err, TriageError::InvalidTransition { role: Role::Chemist, .. }));

    let reviewed = manager.transition_with_token(record.id, LifecycleState::Reviewed, "tok-doctor")?;
    assert_eq!(reviewed.state, LifecycleState::Reviewed);
    Ok(())
}

#[test]
fn test_unknown_record() {
    let manager = manager_with(stocked_inventory());
    let err = manager
        .transition(42, LifecycleState::Reviewed, &doctor())
        .unwrap_err();
    assert!(matches!(err, TriageError::RecordNotFound(42)));
}

#[test]
fn test_default_prescription_is_used() -> anyhow::Result<()> {
    let manager = manager_with(stocked_inventory());
    let record = manager.create(&clinician(), &intake(Disease::Typhoid, 200.0, &[])?)?;
    manager.transition(record.id, LifecycleState::Reviewed, &doctor())?;
    let prescribed = manager.transition(record.id, LifecycleState::Prescribed, &doctor())?;
    assert_eq!(prescribed.prescription, Some(default_prescription(Disease::Typhoid)));
    Ok(())
}
