//! Metadatos del target proteico: métricas estructurales, clasificación por
//! tamaño y registro de procedencia.
//!
//! Las métricas son sintéticas (derivadas del tamaño de la entrada); el
//! clasificador es un conjunto de reglas fijas sobre el número de residuos.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Por debajo de este número de residuos el target se trata como péptido.
pub const PEPTIDE_MAX_RESIDUES: u32 = 50;
/// Por encima de este número de residuos el target no es apto para el workflow.
pub const LARGE_TARGET_MIN_RESIDUES: u32 = 1500;

// Aproximaciones usadas para sintetizar métricas a partir del tamaño de archivo.
const BYTES_PER_ATOM_RECORD: u64 = 81;
const ATOMS_PER_RESIDUE: f64 = 7.8;
const RESIDUES_PER_CHAIN: u32 = 500;
const MAX_SYNTH_CHAINS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSource {
    Upload,
    Prediction,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSource::Upload => f.write_str("Uploaded structure"),
            TargetSource::Prediction => f.write_str("Predicted structure"),
        }
    }
}

/// Categoría asignada por el clasificador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCategory {
    Peptide,
    #[serde(rename = "Standard Protein")]
    StandardProtein,
    #[serde(rename = "Large Complex")]
    LargeComplex,
}

impl TargetCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TargetCategory::Peptide => "Peptide",
            TargetCategory::StandardProtein => "Standard Protein",
            TargetCategory::LargeComplex => "Large Complex",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suitability {
    Suitable,
    Limited,
    Unsuitable,
}

impl Suitability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suitability::Suitable => "suitable",
            Suitability::Limited => "limited",
            Suitability::Unsuitable => "unsuitable",
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resultado del clasificador por reglas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub category: TargetCategory,
    pub suitability: Suitability,
    pub caveats: Vec<String>,
}

/// Clasifica un target según su número de residuos.
pub fn classify(residue_count: u32) -> Classification {
    if residue_count > LARGE_TARGET_MIN_RESIDUES {
        Classification { category: TargetCategory::LargeComplex,
                         suitability: Suitability::Unsuitable,
                         caveats: vec![format!("{residue_count} residues exceeds the {LARGE_TARGET_MIN_RESIDUES}-residue limit for pocket detection and screening"),
                                       "Consider extracting the domain of interest before continuing".to_string()] }
    } else if residue_count < PEPTIDE_MAX_RESIDUES {
        Classification { category: TargetCategory::Peptide,
                         suitability: Suitability::Limited,
                         caveats: vec![format!("{residue_count} residues is below {PEPTIDE_MAX_RESIDUES}; the target is treated as a peptide"),
                                       "Peptides rarely present well-defined binding pockets".to_string()] }
    } else {
        Classification { category: TargetCategory::StandardProtein,
                         suitability: Suitability::Suitable,
                         caveats: vec![] }
    }
}

/// Conteos estructurales (reales si el visor los informa, sintéticos si no).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureMetrics {
    pub residue_count: u32,
    pub chain_count: u32,
    pub atom_count: u32,
}

impl StructureMetrics {
    /// Métricas de una estructura predicha a partir de una secuencia de una cadena.
    pub fn from_sequence_length(length: usize) -> Self {
        let residue_count = length.max(1) as u32;
        Self { residue_count,
               chain_count: 1,
               atom_count: (residue_count as f64 * ATOMS_PER_RESIDUE).round() as u32 }
    }

    /// Métricas aproximadas a partir del tamaño de un archivo PDB/mmCIF.
    pub fn from_file_size(size_bytes: u64) -> Self {
        let atom_count = (size_bytes / BYTES_PER_ATOM_RECORD).max(1) as u32;
        let residue_count = ((atom_count as f64 / ATOMS_PER_RESIDUE).round() as u32).max(1);
        let chain_count = (1 + residue_count / RESIDUES_PER_CHAIN).min(MAX_SYNTH_CHAINS);
        Self { residue_count,
               chain_count,
               atom_count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceMethod {
    FileUpload,
    StructurePrediction,
}

/// Registro de procedencia adjunto a cada target cargado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub method: ProvenanceMethod,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub fingerprint: Option<String>,
}

/// SHA-256 hex del contenido (bytes del archivo o secuencia normalizada).
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}

/// Target publicado en el estado compartido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub name: String,
    pub residue_count: u32,
    pub chain_count: u32,
    pub atom_count: u32,
    pub molecule_class: TargetCategory,
    pub source: TargetSource,
    /// Resolución en Å; `None` para estructuras predichas.
    pub resolution: Option<f64>,
    pub classification: Classification,
    pub provenance: Provenance,
}

impl TargetInfo {
    pub fn new(name: &str,
               metrics: StructureMetrics,
               source: TargetSource,
               resolution: Option<f64>,
               provenance: Provenance)
               -> Self {
        let classification = classify(metrics.residue_count);
        Self { name: name.to_string(),
               residue_count: metrics.residue_count,
               chain_count: metrics.chain_count,
               atom_count: metrics.atom_count,
               molecule_class: classification.category,
               source,
               resolution,
               classification,
               provenance }
    }

    pub fn is_suitable(&self) -> bool {
        self.classification.suitability != Suitability::Unsuitable
    }
}
