use atomera_adapters::{HeadlessViewer, InputMode, LibrarySize, UploadedFile, Workbench, WorkbenchConfig};
use atomera_core::{WorkflowPatch, WorkflowState, WorkflowStore};
use atomera_domain::{Pocket, ResidueRef, StageId, Suitability, TargetCategory};
use atomera_workbench::presentation::{render_navigation, render_status_bar};
use atomera_workbench::session::{run_session, SessionInput, SessionPlan};
use std::sync::{Arc, Mutex};

fn workbench() -> Workbench {
    Workbench::new(Arc::new(HeadlessViewer::new()), WorkbenchConfig::instant(21))
}

#[test]
fn scenario_a_short_sequence_disables_generation() {
    let wb = workbench();
    wb.target().set_mode(InputMode::Sequence, false).unwrap();
    let v = wb.target().set_sequence(">p\nMKT").unwrap();
    assert!(!v.is_valid);
    assert!(v.errors.iter().any(|e| e.contains("too short")));
    assert!(!wb.target().can_generate());
}

#[tokio::test]
async fn scenario_b_valid_sequence_yields_standard_protein() {
    let wb = workbench();
    wb.target().set_mode(InputMode::Sequence, false).unwrap();
    let v = wb.target().set_sequence(&format!(">p\n{}", "A".repeat(200))).unwrap();
    assert!(v.is_valid);
    assert_eq!(v.sequence_length, 200);

    let target = wb.target().generate_structure().await.unwrap();
    assert_eq!(target.classification.category, TargetCategory::StandardProtein);
    assert_eq!(target.classification.suitability, Suitability::Suitable);

    let json = serde_json::to_value(wb.store().get_state()).unwrap();
    assert_eq!(json["target"]["classification"]["type"], "Standard Protein");
    assert_eq!(json["target"]["classification"]["suitability"], "suitable");
    assert_eq!(json["isTargetLoaded"], true);
}

#[test]
fn scenario_c_oversize_upload_is_rejected() {
    let wb = workbench();
    let v = wb.target().set_file(UploadedFile::metadata("complex.pdb", 60 * 1024 * 1024)).unwrap();
    assert!(!v.is_valid);
    assert!(v.errors.iter().any(|e| e.contains("exceeds 50MB limit")));
    assert!(!wb.target().can_load());
}

#[tokio::test]
async fn scenario_d_workers_scale_with_progress() {
    let wb = workbench();
    wb.target().set_file(UploadedFile::new("1abc.pdb", vec![b'A'; 200_000])).unwrap();
    wb.target().load_file().await.unwrap();
    wb.prep().run().await.unwrap();
    wb.pocket().detect().await.unwrap();
    wb.pocket().select_pocket(0).unwrap();

    let seen: Arc<Mutex<Vec<(u64, u64, u32)>>> = Arc::default();
    let sink = seen.clone();
    wb.store().subscribe(move |s: &WorkflowState| {
                  if s.is_screening_active {
                      let p = &s.screening_progress;
                      sink.lock().unwrap().push((p.processed, p.total, p.workers));
                  }
              });

    wb.screen().set_library_size(LibrarySize::Standard);
    wb.screen().start().await.unwrap();

    let seen = seen.lock().unwrap();
    assert!(seen.len() >= 20);
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0), "processed went backwards: {seen:?}");
    assert!(seen.iter().all(|(processed, total, _)| *total == 10_000 && processed <= total));
    for (processed, _, workers) in seen.iter() {
        let expected = match processed {
            p if *p >= 5_000 => 8,
            p if *p >= 3_000 => 4,
            p if *p >= 1_000 => 2,
            _ => 1,
        };
        assert_eq!(*workers, expected, "processed={processed}");
    }
    let state = wb.store().get_state();
    assert!(!state.is_screening_active);
    assert_eq!(state.screening_progress.processed, state.screening_progress.total);
    assert!(!state.hits.is_empty());
}

fn pocket(id: &str, rank: u32, score: f64) -> Pocket {
    Pocket { id: id.to_string(),
             rank,
             score,
             volume: 420.0,
             residues: vec![ResidueRef::new(45, "A", "LEU")] }
}

#[test]
fn scenario_e_selecting_pocket_unlocks_screen() {
    let store = WorkflowStore::new();
    store.set_state(WorkflowPatch::new().is_target_loaded(true)
                                        .is_prep_complete(true)
                                        .pockets(vec![pocket("pocket-1", 1, 0.91),
                                                      pocket("pocket-2", 2, 0.74),
                                                      pocket("pocket-3", 3, 0.52)]));
    let wb = Workbench::with_store(store, Arc::new(HeadlessViewer::new()), WorkbenchConfig::instant(3));
    assert!(!wb.store().gating()[&StageId::Screen].unlocked);

    let selected = wb.pocket().select_pocket(1).unwrap();
    let state = wb.store().get_state();
    assert_eq!(state.selected_pocket.as_ref().map(|p| p.id.as_str()), Some(state.pockets[1].id.as_str()));
    assert_eq!(selected.id, "pocket-2");
    assert!(wb.store().gating()[&StageId::Screen].unlocked);
    assert!(wb.pocket().select_pocket(3).is_err());
}

#[tokio::test]
async fn scripted_session_ends_on_interactions() {
    let wb = workbench();
    let plan = SessionPlan { input: SessionInput::Fasta(format!(">demo\n{}", "MKTAYIAKQR".repeat(20))),
                             library: LibrarySize::Focused,
                             ligands: vec![] };
    let report = run_session(&wb, &plan, None).await.unwrap();

    assert_eq!(report.hits.len(), 10);
    assert_eq!(report.selected_hit.as_ref().map(|h| h.id.clone()), Some(report.hits[0].id.clone()));
    assert_eq!(report.export["version"], "A1.0");
    assert!(report.export["fingerprint"].as_str().is_some_and(|f| !f.is_empty()));

    let state = wb.store().get_state();
    assert_eq!(state.active_section, StageId::Interactions);
    let nav = render_navigation(&state);
    assert!(nav.contains("[>] 6. Interactions"));
    assert!(nav.contains("[*] 5. Hits"));
    let bar = render_status_bar(&state, None);
    assert!(bar.starts_with("Target: demo (200 res)"));
    assert!(bar.contains("Hits: 10"));
}
