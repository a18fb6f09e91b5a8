use revflow_core::constants::ITEM_ACCESSIBILITY_REVIEWED;
use revflow_core::{ApprovalRepository, CoreEngineError, EngineConfig, RevisionRepository};
use revflow_domain::{ApprovalStatus, Author, GeneratedArtifact, RevisionStatus, WorkflowSession};
use revflow_persistence::{keyed_engine, InMemoryKeyValueStore, KeyValueStore, KvRevisionRepository, KEY_APPROVALS,
                          KEY_APPROVAL_EVENTS, KEY_REVISIONS};

fn session() -> WorkflowSession {
    WorkflowSession::new("s-1", "wf-card")
        .with_artifact(GeneratedArtifact::new("c", "json", "COMPOSE_Card.json")
            .with_content(r#"{"componentName":"Card","layer":"components"}"#))
        .with_artifact(GeneratedArtifact::new("t", "json", "TESTIDS_card.json").with_content(r#"{"open":"cd-card-open"}"#))
}

fn author() -> Author {
    Author::new("Grace", "grace@example.com").unwrap()
}

#[test]
fn engine_state_lives_in_the_store() {
    let store = InMemoryKeyValueStore::new();
    let mut engine = keyed_engine(store.clone(), EngineConfig::default());
    let rev = engine.submit_session(&session(), author()).unwrap();
    let approval = engine.request_approval(rev.id, "grace").unwrap();
    engine.update_checklist_item(approval.id, ITEM_ACCESSIBILITY_REVIEWED, true, Some("qa")).unwrap();
    engine.approve(approval.id, "lead").unwrap();

    for key in [KEY_REVISIONS, KEY_APPROVALS, KEY_APPROVAL_EVENTS] {
        let value = store.get(key).unwrap().unwrap_or_else(|| panic!("{key} missing"));
        assert!(value.is_array(), "{key} should be a list");
    }
    let stored = store.get(KEY_REVISIONS).unwrap().unwrap();
    assert_eq!(stored[0]["status"], "approved");
    assert_eq!(stored[0]["workflowId"], "wf-card");

    // A second engine over the same store sees the same state.
    let reopened = keyed_engine(store, EngineConfig::default());
    assert_eq!(reopened.get_revision(rev.id).unwrap().status, RevisionStatus::Approved);
    assert_eq!(reopened.get_approval(approval.id).unwrap().status, ApprovalStatus::Approved);
    assert_eq!(reopened.events_for(rev.id).unwrap().len(), 4);
}

#[test]
fn stale_save_is_a_version_conflict() {
    let store = InMemoryKeyValueStore::new();
    let mut engine = keyed_engine(store.clone(), EngineConfig::default());
    let rev = engine.submit_session(&session(), author()).unwrap();

    let mut repo = KvRevisionRepository::new(store);
    let mut first = repo.get(rev.id).unwrap().unwrap();
    let mut second = first.clone();
    first.status = RevisionStatus::PendingApproval;
    first.version += 1;
    repo.save(first).unwrap();

    second.status = RevisionStatus::Rejected;
    second.version += 1;
    match repo.save(second) {
        Err(CoreEngineError::VersionConflict { stored, based_on, .. }) => {
            assert_eq!(stored, 1);
            assert_eq!(based_on, 0);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(repo.get(rev.id).unwrap().unwrap().status, RevisionStatus::PendingApproval);
}

#[test]
fn duplicate_insert_is_refused() {
    let store = InMemoryKeyValueStore::new();
    let mut engine = keyed_engine(store.clone(), EngineConfig::default());
    let rev = engine.submit_session(&session(), author()).unwrap();
    let mut repo = KvRevisionRepository::new(store);
    let err = repo.insert(rev.clone()).unwrap_err();
    assert_eq!(err,
               CoreEngineError::Duplicate { entity: "revision".into(),
                                            id: rev.id });
    assert_eq!(repo.all().unwrap().len(), 1);
}

#[test]
fn unknown_ids_surface_as_not_found() {
    let engine = keyed_engine(InMemoryKeyValueStore::new(), EngineConfig::default());
    let id = uuid::Uuid::new_v4();
    assert_eq!(engine.get_approval(id).unwrap_err(), CoreEngineError::ApprovalNotFound(id));
    let approvals = engine.approval_repository();
    assert!(approvals.get(id).unwrap().is_none());
}
