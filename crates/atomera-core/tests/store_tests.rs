use atomera_core::{ScreeningProgress, WorkflowError, WorkflowPatch, WorkflowState, WorkflowStore};
use atomera_core::constants::WORKBENCH_VERSION;
use atomera_core::hashing::hash_value;
use atomera_domain::{Pocket, StageId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn pocket(id: &str) -> Pocket {
    Pocket { id: id.to_string(),
             rank: 1,
             score: 0.8,
             volume: 350.0,
             residues: vec![] }
}

#[test]
fn set_state_is_last_writer_wins_per_field() {
    let store = WorkflowStore::new();
    store.set_state(WorkflowPatch::new().status("one").is_target_loaded(true));
    store.set_state(WorkflowPatch::new().status("two"));
    store.set_state(WorkflowPatch::new().screening_progress(ScreeningProgress { job_id: None,
                                                                                processed: 5,
                                                                                total: 10,
                                                                                workers: 1 }));
    let s = store.get_state();
    assert_eq!(s.status_message, "two");
    assert!(s.is_target_loaded);
    assert_eq!(s.screening_progress.processed, 5);
    assert!(!s.is_prep_complete);
}

#[test]
fn get_state_returns_a_detached_copy() {
    let store = WorkflowStore::new();
    let mut snapshot = store.get_state();
    snapshot.is_target_loaded = true;
    snapshot.status_message = "mutated".into();
    assert_eq!(store.get_state(), WorkflowState::default());
}

#[test]
fn every_set_state_notifies_once() {
    let store = WorkflowStore::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen2 = seen.clone();
    let id = store.subscribe(move |_| {
                      seen2.fetch_add(1, Ordering::SeqCst);
                  });
    store.set_state(WorkflowPatch::new().status("a"));
    store.set_state(WorkflowPatch::new().status("a"));
    store.reset_state();
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert_eq!(store.notification_count(), 3);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.set_state(WorkflowPatch::new().status("b"));
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn shared_subscriber_is_registered_once() {
    let store = WorkflowStore::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen2 = seen.clone();
    let cb: atomera_core::Subscriber = Arc::new(move |_: &WorkflowState| {
        seen2.fetch_add(1, Ordering::SeqCst);
    });
    let a = store.subscribe_shared(cb.clone());
    let b = store.subscribe_shared(cb);
    assert_eq!(a, b);
    assert_eq!(store.subscriber_count(), 1);
    store.set_state(WorkflowPatch::new().status("x"));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn subscriber_receives_new_snapshot_and_may_write_back() {
    let store = WorkflowStore::new();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed2 = observed.clone();
    let handle = store.clone();
    store.subscribe(move |s| {
             observed2.lock().unwrap().push(s.status_message.clone());
             // una única re-escritura acotada
             if s.is_target_loaded && s.status_message != "acknowledged" {
                 handle.set_state(WorkflowPatch::new().status("acknowledged"));
             }
         });
    store.set_state(WorkflowPatch::new().is_target_loaded(true).status("loaded"));
    assert_eq!(*observed.lock().unwrap(), vec!["loaded".to_string(), "acknowledged".to_string()]);
    assert_eq!(store.get_state().status_message, "acknowledged");
}

#[test]
fn switch_section_respects_gating() {
    let store = WorkflowStore::new();
    assert_eq!(store.switch_section(StageId::Screen),
               Err(WorkflowError::GatingViolation { stage: StageId::Screen }));
    let before = store.notification_count();
    assert_eq!(store.get_state().active_section, StageId::Target);
    assert_eq!(store.notification_count(), before);

    store.set_state(WorkflowPatch::new().is_target_loaded(true)
                                        .is_prep_complete(true)
                                        .selected_pocket(Some(pocket("pocket-2"))));
    assert!(store.switch_section(StageId::Screen).is_ok());
    assert_eq!(store.get_state().active_section, StageId::Screen);
    assert!(store.switch_section(StageId::Hits).is_err());
}

#[test]
fn screen_gate_equals_selected_pocket_presence() {
    let store = WorkflowStore::new();
    let patches = vec![WorkflowPatch::new().is_target_loaded(true),
                       WorkflowPatch::new().selected_pocket(Some(pocket("a"))),
                       WorkflowPatch::new().hits(vec![]),
                       WorkflowPatch::new().selected_pocket(None),
                       WorkflowPatch::new().is_screening_active(true)];
    for p in patches {
        store.set_state(p);
        let s = store.get_state();
        assert_eq!(store.gating()[&StageId::Screen].unlocked, s.selected_pocket.is_some());
    }
}

#[test]
fn export_session_fingerprint_is_stable_for_same_state() {
    let store = WorkflowStore::new();
    let a = store.export_session().unwrap();
    let b = store.export_session().unwrap();
    assert_eq!(a["fingerprint"], b["fingerprint"]);
    assert_eq!(a["state"]["activeSection"], "target");
    store.set_state(WorkflowPatch::new().status("changed"));
    let c = store.export_session().unwrap();
    assert_ne!(a["fingerprint"], c["fingerprint"]);
}

#[test]
fn export_fingerprint_covers_state_only() {
    let store = WorkflowStore::new();
    store.set_state(WorkflowPatch::new().status("exported"));
    let export = store.export_session().unwrap();
    assert_eq!(export["version"], WORKBENCH_VERSION);
    assert_eq!(export["fingerprint"], hash_value(&export["state"]).as_str());
}

#[test]
fn set_state_if_rejects_without_notifying() {
    let store = WorkflowStore::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store.subscribe(move |_| {
             counter.fetch_add(1, Ordering::SeqCst);
         });

    assert!(!store.set_state_if(|s| s.is_target_loaded, WorkflowPatch::new().is_prep_complete(true)));
    assert!(!store.get_state().is_prep_complete);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(store.set_state_if(|s| !s.is_target_loaded, WorkflowPatch::new().status("applied")));
    assert_eq!(store.get_state().status_message, "applied");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
