//! Bolsillos de unión candidatos.
use serde::{Deserialize, Serialize};

use crate::ResidueRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub id: String,
    /// 1 = mejor candidato.
    pub rank: u32,
    /// Puntuación de druggability en [0, 1]; mayor es mejor.
    pub score: f64,
    /// Volumen en Å³.
    pub volume: f64,
    pub residues: Vec<ResidueRef>,
}

/// Ordena por score descendente y reasigna `rank` (1..n). Los ids no cambian.
pub fn rank_pockets(mut pockets: Vec<Pocket>) -> Vec<Pocket> {
    pockets.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, p) in pockets.iter_mut().enumerate() {
        p.rank = i as u32 + 1;
    }
    pockets
}
