//! Contrato del backend de cribado remoto y sus DTOs.
//!
//! El backend ejecuta el pipeline completo (estructura, bolsillos, afinidad)
//! y expone el avance como una etapa discreta que el cliente sondea.

use async_trait::async_trait;
use atomera_domain::{rank_pockets, sort_hits, Confidence, Contact, ContactKind, HBond, Hit, Interactions, Pocket, Pose,
                     ResidueRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::CollaboratorError;

/// Etapa informada por el backend para un job remoto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStage {
    Queued,
    Structure,
    Pockets,
    Affinity,
    Done,
    Error,
}

impl RemoteStage {
    /// Progreso local equivalente a cada etapa remota.
    pub fn progress(&self) -> u8 {
        match self {
            RemoteStage::Queued => 5,
            RemoteStage::Structure => 25,
            RemoteStage::Pockets => 50,
            RemoteStage::Affinity => 75,
            RemoteStage::Done | RemoteStage::Error => 100,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RemoteStage::Queued => "Queued on remote backend",
            RemoteStage::Structure => "Predicting structure",
            RemoteStage::Pockets => "Detecting pockets",
            RemoteStage::Affinity => "Scoring binding affinity",
            RemoteStage::Done => "Remote job complete",
            RemoteStage::Error => "Remote job failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RemoteStage::Done | RemoteStage::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinUpload {
    pub protein_id: String,
    pub filename: String,
    #[serde(default)]
    pub stats: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LigandUpload {
    pub ligand_set_id: String,
    pub ligand_count: u64,
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub protein_id: Option<String>,
    pub ligand_set_id: Option<String>,
    pub pocket_mode: String,
    pub affinity_mode: String,
}

impl JobRequest {
    pub fn new(protein_id: &str, ligand_set_id: &str) -> Self {
        Self { protein_id: Some(protein_id.to_string()),
               ligand_set_id: Some(ligand_set_id.to_string()),
               pocket_mode: "auto".to_string(),
               affinity_mode: "boltz2".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteJob {
    pub job_id: String,
    pub status: RemoteStage,
    #[serde(default)]
    pub message: Option<String>,
    pub created_at: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLigand {
    pub ligand_id: String,
    pub score: f64,
    #[serde(default)]
    pub affinity_type: Option<String>,
    #[serde(default)]
    pub binder_prob: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
}

impl RankedLigand {
    pub fn to_hit(&self, pocket_id: Option<&str>) -> Hit {
        let confidence = self.confidence
                             .as_deref()
                             .and_then(Confidence::from_label)
                             .unwrap_or_else(|| Confidence::from_score(self.score));
        Hit { id: self.ligand_id.clone(),
              name: self.ligand_id.clone(),
              score: self.score,
              confidence,
              pose: pocket_id.map(|p| Pose { pocket_id: p.to_string(),
                                             model_ref: format!("{}_complex.pdb", self.ligand_id) }) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePocket {
    pub id: u32,
    pub score: f64,
    #[serde(default)]
    pub center: Vec<f64>,
    /// Residuos en notación `CHAIN:RESNO`.
    #[serde(default)]
    pub residues: Vec<String>,
}

impl RemotePocket {
    pub fn to_pocket(&self) -> Pocket {
        let residues = self.residues.iter().filter_map(|r| parse_short_residue(r)).collect();
        Pocket { id: format!("pocket-{}", self.id),
                 rank: 0,
                 score: self.score,
                 volume: 0.0,
                 residues }
    }
}

/// `A:123` -> residuo sin nombre conocido (`UNK`). También acepta `A:ASP:123`.
fn parse_short_residue(s: &str) -> Option<ResidueRef> {
    if let Ok(r) = s.parse::<ResidueRef>() {
        return Some(r);
    }
    let (chain, resno) = s.trim().split_once(':')?;
    let resno = resno.parse::<i32>().ok()?;
    (!chain.is_empty()).then(|| ResidueRef::new(resno, chain, "UNK"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub job_id: String,
    #[serde(default)]
    pub ranked_ligands: Vec<RankedLigand>,
    #[serde(default)]
    pub pockets: Vec<RemotePocket>,
}

impl ResultSummary {
    /// Bolsillos rankeados por score.
    pub fn pockets(&self) -> Vec<Pocket> {
        rank_pockets(self.pockets.iter().map(RemotePocket::to_pocket).collect())
    }

    /// Hits ordenados ascendentemente, con pose sobre el mejor bolsillo.
    pub fn hits(&self) -> Vec<Hit> {
        let pockets = self.pockets();
        let best = pockets.first().map(|p| p.id.as_str());
        let mut hits: Vec<Hit> = self.ranked_ligands.iter().map(|l| l.to_hit(best)).collect();
        sort_hits(&mut hits);
        hits
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInteraction {
    pub residue: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Distancia en Å; el backend la envía como texto.
    pub dist: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigandDetails {
    pub complex_url: String,
    #[serde(default)]
    pub interactions: Vec<RemoteInteraction>,
}

impl LigandDetails {
    /// Convierte la lista plana del backend. Entradas ilegibles se descartan.
    pub fn to_interactions(&self) -> Interactions {
        let mut out = Interactions::default();
        for i in &self.interactions {
            let Ok(residue) = i.residue.parse::<ResidueRef>() else {
                continue;
            };
            let distance = i.dist.trim().parse::<f64>().unwrap_or(0.0);
            let kind = match i.kind.to_ascii_lowercase().replace(['-', ' ', '_'], "").as_str() {
                "hbond" | "hydrogenbond" => {
                    out.h_bonds.push(HBond { residue,
                                             ligand_atom: String::new(),
                                             distance });
                    continue;
                }
                "hydrophobic" => ContactKind::Hydrophobic,
                "pistacking" => ContactKind::PiStacking,
                "saltbridge" => ContactKind::SaltBridge,
                _ => ContactKind::VanDerWaals,
            };
            out.contacts.push(Contact { residue,
                                        kind,
                                        distance });
        }
        out
    }
}

#[async_trait]
pub trait ScreeningApi: Send + Sync {
    async fn upload_protein(&self, file_name: &str, bytes: Vec<u8>) -> Result<ProteinUpload, CollaboratorError>;
    async fn submit_sequence(&self, header: &str, sequence: &str) -> Result<ProteinUpload, CollaboratorError>;
    async fn upload_ligands(&self, files: Vec<(String, Vec<u8>)>) -> Result<LigandUpload, CollaboratorError>;
    async fn submit_smiles(&self, smiles: &[String], gen3d: bool) -> Result<LigandUpload, CollaboratorError>;
    async fn create_job(&self, request: &JobRequest) -> Result<RemoteJob, CollaboratorError>;
    async fn job_status(&self, job_id: &str) -> Result<RemoteJob, CollaboratorError>;
    async fn results(&self, job_id: &str) -> Result<ResultSummary, CollaboratorError>;
    async fn ligand_details(&self, job_id: &str, ligand_id: &str) -> Result<LigandDetails, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_stage_parses_backend_casing() {
        let job: RemoteJob = serde_json::from_value(json!({
                                 "job_id": "j1", "status": "AFFINITY", "message": null, "created_at": 1.0
                             })).unwrap();
        assert_eq!(job.status, RemoteStage::Affinity);
        assert_eq!(job.status.progress(), 75);
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn summary_maps_to_ranked_pockets_and_sorted_hits() {
        let summary: ResultSummary = serde_json::from_value(json!({
            "job_id": "j1",
            "pockets": [
                {"id": 2, "score": 0.82, "center": [-5.0, 10.0, 5.0], "residues": ["A:45", "A:46"]},
                {"id": 1, "score": 0.95, "center": [10.0, 15.5, 20.0], "residues": ["A:123", "A:124"]}
            ],
            "ranked_ligands": [
                {"ligand_id": "lig_2", "score": -7.2, "confidence": "Medium"},
                {"ligand_id": "lig_1", "score": -9.5, "confidence": "High"}
            ]
        })).unwrap();
        let pockets = summary.pockets();
        assert_eq!(pockets[0].id, "pocket-1");
        assert_eq!(pockets[0].rank, 1);
        assert_eq!(pockets[0].residues[0], ResidueRef::new(123, "A", "UNK"));

        let hits = summary.hits();
        assert_eq!(hits[0].id, "lig_1");
        assert_eq!(hits[0].confidence, Confidence::High);
        assert_eq!(hits[0].pose.as_ref().unwrap().pocket_id, "pocket-1");
    }

    #[test]
    fn ligand_details_split_hbonds_and_contacts() {
        let details: LigandDetails = serde_json::from_value(json!({
            "complex_url": "/static/j1/lig_1_complex.pdb",
            "interactions": [
                {"residue": "A:ASP:112", "type": "H-Bond", "dist": "2.1"},
                {"residue": "A:PHE:204", "type": "Hydrophobic", "dist": "3.5"},
                {"residue": "garbage", "type": "H-Bond", "dist": "2.0"}
            ]
        })).unwrap();
        let i = details.to_interactions();
        assert_eq!(i.h_bonds.len(), 1);
        assert_eq!(i.h_bonds[0].distance, 2.1);
        assert_eq!(i.contacts[0].kind, ContactKind::Hydrophobic);
    }
}
