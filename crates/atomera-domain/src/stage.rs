//! Identificadores de las etapas del workflow.
//!
//! El conjunto es cerrado: añadir una etapa obliga a revisar cada `match`
//! exhaustivo (gating, presentación, controladores).
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    Target,
    Prep,
    Pocket,
    Screen,
    Hits,
    Interactions,
}

impl StageId {
    /// Orden lineal del workflow.
    pub const ALL: [StageId; 6] = [StageId::Target,
                                   StageId::Prep,
                                   StageId::Pocket,
                                   StageId::Screen,
                                   StageId::Hits,
                                   StageId::Interactions];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Target => "target",
            StageId::Prep => "prep",
            StageId::Pocket => "pocket",
            StageId::Screen => "screen",
            StageId::Hits => "hits",
            StageId::Interactions => "interactions",
        }
    }

    /// Título legible usado por la capa de presentación.
    pub fn title(&self) -> &'static str {
        match self {
            StageId::Target => "Target",
            StageId::Prep => "Preparation",
            StageId::Pocket => "Pocket",
            StageId::Screen => "Screening",
            StageId::Hits => "Hits",
            StageId::Interactions => "Interactions",
        }
    }

    /// Posición (0-based) dentro del workflow.
    pub fn index(&self) -> usize {
        StageId::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageId::ALL.iter()
                    .copied()
                    .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| DomainError::ParseError { what: "stage id",
                                                             input: s.to_string() })
    }
}
