//! Sesión guionada: recorre las seis etapas en orden sobre un `Workbench`.
//!
//! La usa el binario y los tests de extremo a extremo.

use atomera_adapters::collaborators::JobRequest;
use atomera_adapters::{InputMode, LibrarySize, ScreeningApi, UploadedFile, Workbench};
use atomera_domain::{Hit, StageId};
use log::info;
use serde_json::Value;

use crate::errors::AppError;

/// Entrada del target.
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// Texto FASTA completo (header + secuencia).
    Fasta(String),
    File(UploadedFile),
}

#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub input: SessionInput,
    pub library: LibrarySize,
    /// SMILES enviados al backend cuando el cribado es remoto.
    pub ligands: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub hits: Vec<Hit>,
    pub selected_hit: Option<Hit>,
    pub export: Value,
}

/// Ejecuta la sesión completa. Con `api` el cribado se delega al backend.
pub async fn run_session(wb: &Workbench,
                         plan: &SessionPlan,
                         api: Option<&dyn ScreeningApi>)
                         -> Result<SessionReport, AppError> {
    load_target(wb, &plan.input).await?;

    wb.switch_section(StageId::Prep)?;
    wb.prep().run().await?;

    wb.switch_section(StageId::Pocket)?;
    wb.pocket().detect().await?;
    wb.pocket().select_pocket(0)?;

    wb.switch_section(StageId::Screen)?;
    let hits = match api {
        Some(api) => {
            let request = submit_remote_inputs(api, plan).await?;
            wb.screen().run_remote(api, &request).await?
        }
        None => {
            wb.screen().set_library_size(plan.library);
            wb.screen().start().await?
        }
    };
    info!("session screening produced {} hits", hits.len());

    wb.switch_section(StageId::Hits)?;
    let selected_hit = match hits.first() {
        Some(best) => {
            match (api, wb.screen().remote_job_id()) {
                (Some(api), Some(job_id)) => wb.hits().select_remote_hit(api, &job_id, &best.id).await?,
                _ => wb.hits().select_hit(&best.id)?,
            };
            wb.switch_section(StageId::Interactions)?;
            Some(best.clone())
        }
        None => None,
    };

    let export = wb.export_session()?;
    Ok(SessionReport { hits,
                       selected_hit,
                       export })
}

async fn load_target(wb: &Workbench, input: &SessionInput) -> Result<(), AppError> {
    let target = wb.target();
    match input {
        SessionInput::Fasta(text) => {
            target.set_mode(InputMode::Sequence, true)?;
            let validation = target.set_sequence(text)?;
            if !validation.is_valid {
                return Err(atomera_adapters::StageError::Validation(validation.errors).into());
            }
            target.generate_structure().await?;
        }
        SessionInput::File(file) => {
            target.set_mode(InputMode::Upload, true)?;
            let validation = target.set_file(file.clone())?;
            if !validation.is_valid {
                return Err(atomera_adapters::StageError::Validation(validation.errors).into());
            }
            target.load_file().await?;
        }
    }
    Ok(())
}

async fn submit_remote_inputs(api: &dyn ScreeningApi, plan: &SessionPlan) -> Result<JobRequest, AppError> {
    let protein = match &plan.input {
        SessionInput::File(file) => api.upload_protein(&file.name, file.bytes.clone()).await,
        SessionInput::Fasta(text) => {
            let (header, sequence) = split_fasta(text);
            api.submit_sequence(&header, &sequence).await
        }
    }.map_err(atomera_adapters::StageError::from)?;
    let ligands = api.submit_smiles(&plan.ligands, true)
                     .await
                     .map_err(atomera_adapters::StageError::from)?;
    info!("remote inputs protein={} ligands={} ({} compounds)",
          protein.protein_id,
          ligands.ligand_set_id,
          ligands.ligand_count);
    Ok(JobRequest::new(&protein.protein_id, &ligands.ligand_set_id))
}

fn split_fasta(text: &str) -> (String, String) {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines.next().map(|h| h.trim_start_matches('>').trim().to_string()).unwrap_or_default();
    let sequence: String = lines.take_while(|l| !l.starts_with('>')).collect();
    (header, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fasta_keeps_first_record() {
        let (h, s) = split_fasta(">p1 demo\nMKT\nAAA\n>p2\nGGG");
        assert_eq!(h, "p1 demo");
        assert_eq!(s, "MKTAAA");
    }
}
