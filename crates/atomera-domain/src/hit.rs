//! Hits del cribado virtual.
//!
//! El score es una energía de docking (kcal/mol): menor es mejor. La lista de
//! hits se ordena ascendentemente al generarse y no se reordena al leer.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Umbral (inclusive) para confianza alta.
pub const HIGH_CONFIDENCE_SCORE: f64 = -9.0;
/// Umbral (inclusive) para confianza media.
pub const MEDIUM_CONFIDENCE_SCORE: f64 = -7.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        if score <= HIGH_CONFIDENCE_SCORE {
            Confidence::High
        } else if score <= MEDIUM_CONFIDENCE_SCORE {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Interpreta la etiqueta del backend ("High" / "Medium" / "Low").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => f.write_str("High"),
            Confidence::Medium => f.write_str("Medium"),
            Confidence::Low => f.write_str("Low"),
        }
    }
}

/// Pose acoplada del ligando dentro de un bolsillo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    pub pocket_id: String,
    pub model_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub confidence: Confidence,
    pub pose: Option<Pose>,
}

/// Ordena ascendentemente por score (estable ante empates).
pub fn sort_hits(hits: &mut [Hit]) {
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_tiers() {
        assert_eq!(Confidence::from_score(-10.2), Confidence::High);
        assert_eq!(Confidence::from_score(-9.0), Confidence::High);
        assert_eq!(Confidence::from_score(-8.0), Confidence::Medium);
        assert_eq!(Confidence::from_score(-5.1), Confidence::Low);
        assert_eq!(Confidence::from_label("medium"), Some(Confidence::Medium));
        assert_eq!(Confidence::from_label("?"), None);
    }

    #[test]
    fn sort_is_ascending() {
        let mk = |id: &str, score| Hit { id: id.into(),
                                         name: id.into(),
                                         score,
                                         confidence: Confidence::from_score(score),
                                         pose: None };
        let mut hits = vec![mk("a", -6.0), mk("b", -9.5), mk("c", -7.2)];
        sort_hits(&mut hits);
        assert!(hits.windows(2).all(|w| w[0].score <= w[1].score));
        assert_eq!(hits[0].id, "b");
    }
}
