//! Etapa Target: carga de un archivo de estructura o predicción desde una
//! secuencia FASTA.
//!
//! Sólo un modo de entrada está activo a la vez. Cambiar de modo con datos
//! presentes requiere confirmación explícita y descarta el target publicado
//! junto con todo lo que depende de él.

use atomera_core::constants::INITIAL_STATUS;
use atomera_core::{Job, JobError, JobKind, JobManager, WorkflowPatch};
use atomera_domain::{fingerprint_bytes, validate_fasta, validate_file, FastaValidation, FileValidation, Provenance,
                     ProvenanceMethod, StageId, StructureMetrics, Suitability, TargetInfo, TargetSource};
use chrono::Utc;
use log::{info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::context::{lock, StageContext};
use crate::collaborators::{StructureInput, StructureSummary};
use crate::error::StageError;
use crate::runner::JobRun;
use crate::synth;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Upload,
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    Unchanged,
    Switched,
}

/// Archivo elegido por el usuario.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self { name: name.to_string(),
               size_bytes: bytes.len() as u64,
               bytes }
    }

    /// Sólo nombre y tamaño; suficiente para validar.
    pub fn metadata(name: &str, size_bytes: u64) -> Self {
        Self { name: name.to_string(),
               size_bytes,
               bytes: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TargetInput {
    File(UploadedFile),
    Sequence { header: String, sequence: String },
}

#[derive(Debug, Default)]
struct TargetLocal {
    mode: InputMode,
    sequence_text: String,
    fasta: Option<FastaValidation>,
    file: Option<UploadedFile>,
    file_check: Option<FileValidation>,
    /// Entrada del último job; la reutiliza `retry`.
    last_input: Option<TargetInput>,
}

impl TargetLocal {
    fn has_input(&self) -> bool {
        !self.sequence_text.trim().is_empty() || self.file.is_some()
    }
}

pub struct TargetController {
    ctx: StageContext,
    jobs: JobManager,
    local: Mutex<TargetLocal>,
    rng: Mutex<StdRng>,
}

impl TargetController {
    pub fn new(ctx: StageContext) -> Self {
        let rng = synth::rng_for(ctx.config.seed, StageId::Target.index() as u64);
        Self { ctx,
               jobs: JobManager::new(StageId::Target),
               local: Mutex::new(TargetLocal::default()),
               rng: Mutex::new(rng) }
    }

    pub fn mode(&self) -> InputMode {
        lock(&self.local).mode
    }

    /// Cambia el modo de entrada.
    ///
    /// Si hay una entrada pendiente o un target cargado y `confirmed` es
    /// `false`, devuelve `ConfirmationRequired` sin tocar nada.
    pub fn set_mode(&self, mode: InputMode, confirmed: bool) -> Result<ModeSwitch, StageError> {
        let mut local = lock(&self.local);
        if local.mode == mode {
            return Ok(ModeSwitch::Unchanged);
        }
        let loaded = self.ctx.store.read(|s| s.is_target_loaded);
        if (loaded || local.has_input()) && !confirmed {
            return Err(StageError::ConfirmationRequired);
        }
        *local = TargetLocal { mode,
                               ..TargetLocal::default() };
        drop(local);
        if let Some(job) = self.jobs.cancel() {
            info!("target job {} cancelled by mode switch", job.id);
        }
        if loaded {
            self.publish_cleared();
        }
        Ok(ModeSwitch::Switched)
    }

    /// Guarda y revalida el texto FASTA.
    pub fn set_sequence(&self, text: &str) -> Result<FastaValidation, StageError> {
        let mut local = lock(&self.local);
        if local.mode != InputMode::Sequence {
            return Err(StageError::validation("Sequence input requires sequence mode"));
        }
        let validation = validate_fasta(text, &self.ctx.config.fasta_rules);
        local.sequence_text = text.to_string();
        local.fasta = Some(validation.clone());
        Ok(validation)
    }

    /// Guarda y valida el archivo elegido.
    pub fn set_file(&self, file: UploadedFile) -> Result<FileValidation, StageError> {
        let mut local = lock(&self.local);
        if local.mode != InputMode::Upload {
            return Err(StageError::validation("File input requires upload mode"));
        }
        let validation = validate_file(&file.name, file.size_bytes, &self.ctx.config.file_rules);
        local.file = Some(file);
        local.file_check = Some(validation.clone());
        Ok(validation)
    }

    pub fn fasta_validation(&self) -> Option<FastaValidation> {
        lock(&self.local).fasta.clone()
    }

    pub fn file_validation(&self) -> Option<FileValidation> {
        lock(&self.local).file_check.clone()
    }

    /// La acción de generar sólo existe con una secuencia válida y sin job activo.
    pub fn can_generate(&self) -> bool {
        let local = lock(&self.local);
        local.mode == InputMode::Sequence
        && local.fasta.as_ref().is_some_and(|v| v.is_valid)
        && !self.jobs.is_busy()
    }

    pub fn can_load(&self) -> bool {
        let local = lock(&self.local);
        local.mode == InputMode::Upload
        && local.file_check.as_ref().is_some_and(|v| v.is_valid)
        && !self.jobs.is_busy()
    }

    pub fn current_job(&self) -> Option<Job> {
        self.jobs.current()
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    /// Carga el archivo validado.
    pub async fn load_file(&self) -> Result<TargetInfo, StageError> {
        let input = {
            let local = lock(&self.local);
            match (&local.file, &local.file_check) {
                (Some(file), Some(check)) if check.is_valid && local.mode == InputMode::Upload => {
                    TargetInput::File(file.clone())
                }
                (_, Some(check)) if !check.errors.is_empty() => return Err(StageError::Validation(check.errors.clone())),
                _ => return Err(StageError::validation("No structure file selected")),
            }
        };
        self.start(JobKind::StructureLoad, input).await
    }

    /// Predice la estructura a partir de la secuencia validada.
    pub async fn generate_structure(&self) -> Result<TargetInfo, StageError> {
        let input = {
            let local = lock(&self.local);
            match &local.fasta {
                Some(v) if v.is_valid && local.mode == InputMode::Sequence => {
                    TargetInput::Sequence { header: v.header.clone().unwrap_or_default(),
                                            sequence: v.sequence.clone() }
                }
                Some(v) => return Err(StageError::Validation(v.errors.clone())),
                None => return Err(StageError::validation("No sequence provided")),
            }
        };
        self.start(JobKind::StructurePrediction, input).await
    }

    /// Reintenta el último job fallido con la misma entrada.
    pub async fn retry(&self) -> Result<TargetInfo, StageError> {
        let input = lock(&self.local).last_input.clone().ok_or(StageError::Job(JobError::NoCurrentJob))?;
        let job = self.jobs.retry()?;
        let run = JobRun::resume(&self.jobs, job, self.ctx.pacing())?;
        self.execute(run, input).await
    }

    /// Descarta el target y todo lo posterior en una sola escritura.
    pub fn clear(&self) {
        if let Some(job) = self.jobs.cancel() {
            info!("target job {} cancelled by clear", job.id);
        }
        {
            let mut local = lock(&self.local);
            let mode = local.mode;
            *local = TargetLocal { mode,
                                   ..TargetLocal::default() };
        }
        self.publish_cleared();
    }

    fn publish_cleared(&self) {
        self.ctx.store.set_state(WorkflowPatch::new().target(None)
                                                     .is_target_loaded(false)
                                                     .clear_after_target()
                                                     .active_section(StageId::Target)
                                                     .status(INITIAL_STATUS));
        if let Err(e) = self.ctx.viewer.clear_viewer() {
            warn!("viewer clear failed: {}", e);
        }
    }

    async fn start(&self, kind: JobKind, input: TargetInput) -> Result<TargetInfo, StageError> {
        self.ctx.ensure_unlocked(StageId::Target)?;
        let description = match &input {
            TargetInput::File(f) => format!("Load structure {}", f.name),
            TargetInput::Sequence { sequence, .. } => format!("Predict structure ({} residues)", sequence.len()),
        };
        let run = JobRun::begin(&self.jobs, kind, &description, self.ctx.pacing())?;
        lock(&self.local).last_input = Some(input.clone());
        self.execute(run, input).await
    }

    async fn execute(&self, run: JobRun<'_>, input: TargetInput) -> Result<TargetInfo, StageError> {
        let out = self.ctx.deadline(self.perform(&run, &input)).await;
        if let Err(e) = &out {
            self.ctx.report_failure(StageId::Target, &run, e, WorkflowPatch::new());
        }
        out
    }

    async fn perform(&self, run: &JobRun<'_>, input: &TargetInput) -> Result<TargetInfo, StageError> {
        let (plan, viewer_input) = {
            let mut rng = lock(&self.rng);
            match input {
                TargetInput::File(f) => (synth::structure_load_plan(f.size_bytes, &mut *rng),
                                         StructureInput::File { name: f.name.clone(),
                                                                bytes: f.bytes.clone() }),
                TargetInput::Sequence { header, sequence } => {
                    (synth::prediction_plan(sequence.len(), &mut *rng),
                     StructureInput::Predicted { name: display_name(header),
                                                 sequence: sequence.clone() })
                }
            }
        };
        run.run_plan(&plan).await?;
        let summary = self.ctx.viewer.load_structure(&viewer_input).await?;
        run.ensure_active()?;

        let target = self.build_target(input, &summary);
        let status = status_line(&target);
        run.complete(serde_json::to_value(&target).ok(), &status)?;
        info!("target loaded name={} residues={} class={}",
              target.name,
              target.residue_count,
              target.molecule_class.label());
        self.ctx.store.set_state(WorkflowPatch::new().target(Some(target.clone()))
                                                     .is_target_loaded(true)
                                                     .clear_after_target()
                                                     .status(status));
        Ok(target)
    }

    fn build_target(&self, input: &TargetInput, summary: &StructureSummary) -> TargetInfo {
        match input {
            TargetInput::File(f) => {
                let metrics = if summary.is_known() {
                    StructureMetrics { residue_count: summary.residue_count,
                                       chain_count: summary.chain_count.max(1),
                                       atom_count: summary.atom_count }
                } else {
                    StructureMetrics::from_file_size(f.size_bytes)
                };
                let provenance = Provenance { method: ProvenanceMethod::FileUpload,
                                              source: f.name.clone(),
                                              timestamp: Utc::now(),
                                              session_id: self.ctx.session_id,
                                              fingerprint: Some(fingerprint_bytes(&f.bytes)) };
                TargetInfo::new(&f.name, metrics, TargetSource::Upload, summary.resolution, provenance)
            }
            TargetInput::Sequence { header, sequence } => {
                let provenance = Provenance { method: ProvenanceMethod::StructurePrediction,
                                              source: header.clone(),
                                              timestamp: Utc::now(),
                                              session_id: self.ctx.session_id,
                                              fingerprint: Some(fingerprint_bytes(sequence.as_bytes())) };
                TargetInfo::new(&display_name(header),
                                StructureMetrics::from_sequence_length(sequence.len()),
                                TargetSource::Prediction,
                                None,
                                provenance)
            }
        }
    }
}

/// Primer token del header FASTA, o un nombre genérico.
fn display_name(header: &str) -> String {
    header.split_whitespace()
          .next()
          .map(str::to_string)
          .unwrap_or_else(|| "Predicted structure".to_string())
}

fn status_line(target: &TargetInfo) -> String {
    let base = format!("Loaded {}: {}, {} residues",
                       target.name,
                       target.molecule_class.label(),
                       target.residue_count);
    match (target.classification.suitability, target.classification.caveats.first()) {
        (Suitability::Suitable, _) | (_, None) => base,
        (s, Some(caveat)) => format!("{base} ({}: {caveat})", s.as_str()),
    }
}

impl std::fmt::Debug for TargetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetController")
         .field("mode", &self.mode())
         .field("jobs", &self.jobs)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{HeadlessViewer, ViewerCall};
    use crate::config::WorkbenchConfig;
    use atomera_core::{JobStatus, WorkflowStore};
    use std::sync::Arc;

    const SEQ: &str = ">sp|P69905|HBA_HUMAN Hemoglobin alpha\nMVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF";

    fn controller() -> (TargetController, Arc<HeadlessViewer>, WorkflowStore) {
        let store = WorkflowStore::new();
        let viewer = Arc::new(HeadlessViewer::new());
        let ctx = StageContext::new(store.clone(), viewer.clone(), WorkbenchConfig::instant(11));
        (TargetController::new(ctx), viewer, store)
    }

    #[tokio::test]
    async fn generate_from_sequence_publishes_target() {
        let (target, _viewer, store) = controller();
        target.set_mode(InputMode::Sequence, false).unwrap();
        assert!(target.set_sequence(SEQ).unwrap().is_valid);
        assert!(target.can_generate());

        let info = target.generate_structure().await.unwrap();
        assert_eq!(info.name, "sp|P69905|HBA_HUMAN");
        assert_eq!(info.source, TargetSource::Prediction);
        assert_eq!(info.provenance.session_id, store.read(|s| s.target.as_ref().unwrap().provenance.session_id));
        let state = store.get_state();
        assert!(state.is_target_loaded);
        assert!(state.status_message.starts_with("Loaded sp|P69905|HBA_HUMAN"));
        assert_eq!(target.current_job().unwrap().status, JobStatus::Complete);
    }

    #[tokio::test]
    async fn invalid_sequence_blocks_generation_without_job() {
        let (target, _viewer, _store) = controller();
        target.set_mode(InputMode::Sequence, false).unwrap();
        let v = target.set_sequence(">x\nMKT").unwrap();
        assert!(!v.is_valid);
        assert!(!target.can_generate());
        let err = target.generate_structure().await.unwrap_err();
        assert!(matches!(err, StageError::Validation(_)));
        assert!(target.current_job().is_none());
    }

    #[tokio::test]
    async fn viewer_failure_fails_job_and_retry_reuses_input() {
        let (target, viewer, store) = controller();
        viewer.fail_next_load("malformed ATOM record");
        target.set_file(UploadedFile::new("1abc.pdb", vec![b'A'; 200_000])).unwrap();

        let err = target.load_file().await.unwrap_err();
        assert!(matches!(err, StageError::Collaborator(_)));
        let state = store.get_state();
        assert!(!state.is_target_loaded);
        assert!(state.status_message.contains("malformed ATOM record"));
        assert_eq!(target.current_job().unwrap().status, JobStatus::Failed);

        let info = target.retry().await.unwrap();
        assert_eq!(info.name, "1abc.pdb");
        assert_eq!(target.current_job().unwrap().attempt, 2);
        assert!(store.read(|s| s.is_target_loaded));
        assert_eq!(viewer.calls(), vec![ViewerCall::Load("1abc.pdb".into())]);
    }

    #[tokio::test]
    async fn mode_switch_needs_confirmation_once_data_exists() {
        let (target, viewer, store) = controller();
        target.set_file(UploadedFile::new("1abc.pdb", vec![b'A'; 200_000])).unwrap();
        target.load_file().await.unwrap();

        assert_eq!(target.set_mode(InputMode::Sequence, false), Err(StageError::ConfirmationRequired));
        assert!(store.read(|s| s.is_target_loaded));

        assert_eq!(target.set_mode(InputMode::Sequence, true), Ok(ModeSwitch::Switched));
        let state = store.get_state();
        assert!(!state.is_target_loaded);
        assert!(state.target.is_none());
        assert!(target.file_validation().is_none());
        assert_eq!(viewer.calls().last(), Some(&ViewerCall::Clear));
    }

    #[test]
    fn oversize_file_is_rejected_before_any_job() {
        let (target, _viewer, _store) = controller();
        let v = target.set_file(UploadedFile::metadata("big.pdb", 60 * 1024 * 1024)).unwrap();
        assert!(!v.is_valid);
        assert!(v.errors[0].contains("exceeds 50MB limit"));
        assert!(!target.can_load());
    }
}
