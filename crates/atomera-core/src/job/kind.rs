use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de job; determina la forma del `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    StructureLoad,
    StructurePrediction,
    StructurePreparation,
    PocketDetection,
    Screening,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobKind::StructureLoad => "STRUCTURE_LOAD",
            JobKind::StructurePrediction => "STRUCTURE_PREDICTION",
            JobKind::StructurePreparation => "STRUCTURE_PREPARATION",
            JobKind::PocketDetection => "POCKET_DETECTION",
            JobKind::Screening => "SCREENING",
        };
        f.write_str(s)
    }
}
