//! Generadores sintéticos de resultados.
//!
//! Ninguna etapa ejecuta cómputo científico real: los planes de progreso, los
//! bolsillos, los hits y las interacciones salen de aquí. Todo recibe un
//! `Rng` explícito para poder fijar la semilla.

use atomera_core::CheckpointPlan;
use atomera_domain::{rank_pockets, sort_hits, Confidence, Contact, ContactKind, HBond, Hit, Interactions, Pocket, Pose,
                     ResidueRef, TargetInfo};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const RESIDUE_NAMES: [&str; 20] = ["ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS",
                                   "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL"];
const LIGAND_ATOMS: [&str; 6] = ["O1", "O2", "N1", "N3", "O4", "N2"];
const COMPOUND_PREFIXES: [&str; 4] = ["ZINC", "CHEMBL", "ENAMINE", "MCULE"];

/// Escalones (porcentaje mínimo, workers) del cribado simulado.
pub const WORKER_THRESHOLDS: [(u8, u32); 3] = [(50, 8), (30, 4), (10, 2)];
/// Número de lotes en que se divide la biblioteca.
pub const SCREEN_BATCHES: u64 = 20;
/// Espera nominal entre lotes.
pub const SCREEN_BATCH_DELAY_MS: u64 = 250;

/// RNG con semilla fija (`seed ^ salt`) o de entropía si no hay semilla.
pub fn rng_for(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s ^ salt),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn jitter(rng: &mut impl Rng, base_ms: u64) -> u64 {
    (base_ms as f64 * rng.gen_range(0.75..1.25)).round() as u64
}

/// Carga de un archivo: más lenta cuanto mayor el archivo.
pub fn structure_load_plan(size_bytes: u64, rng: &mut impl Rng) -> CheckpointPlan {
    let parse_ms = 300 + (size_bytes / (1024 * 1024)).min(50) * 20;
    CheckpointPlan::new().then(10, "Reading file", jitter(rng, 150))
                         .then(40, "Parsing coordinates", jitter(rng, parse_ms))
                         .then(70, "Building topology", jitter(rng, 300))
                         .then(90, "Rendering structure", jitter(rng, 200))
}

/// Predicción de estructura: dominada por la longitud de la secuencia.
pub fn prediction_plan(sequence_length: usize, rng: &mut impl Rng) -> CheckpointPlan {
    let fold_ms = 600 + (sequence_length as u64).min(2500);
    CheckpointPlan::new().then(10, "Submitting sequence", jitter(rng, 200))
                         .then(30, "Building multiple sequence alignment", jitter(rng, 500))
                         .then(60, "Folding structure", jitter(rng, fold_ms))
                         .then(85, "Refining model", jitter(rng, 400))
                         .then(95, "Loading predicted structure", jitter(rng, 200))
}

/// Preparación: dos verificaciones secuenciales.
pub fn preparation_plan(rng: &mut impl Rng) -> CheckpointPlan {
    CheckpointPlan::new().then(10, "Starting preparation", jitter(rng, 100))
                         .then(50, "Geometry cleanup", jitter(rng, 600))
                         .then(90, "Coordinate consistency check", jitter(rng, 600))
}

pub fn pocket_detection_plan(rng: &mut impl Rng) -> CheckpointPlan {
    CheckpointPlan::new().then(15, "Mapping protein surface", jitter(rng, 300))
                         .then(45, "Probing cavities", jitter(rng, 500))
                         .then(75, "Scoring druggability", jitter(rng, 400))
                         .then(95, "Ranking pockets", jitter(rng, 200))
}

fn residue(rng: &mut impl Rng, max_resno: u32) -> ResidueRef {
    let resno = rng.gen_range(1..=max_resno.max(1)) as i32;
    let name = RESIDUE_NAMES.choose(rng).copied().unwrap_or("ALA");
    ResidueRef::new(resno, "A", name)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// 3 a 5 bolsillos rankeados por score.
pub fn generate_pockets(target: &TargetInfo, rng: &mut impl Rng) -> Vec<Pocket> {
    let count = rng.gen_range(3..=5);
    let pockets = (1..=count).map(|i| {
                                 let n = rng.gen_range(6..=14);
                                 let mut residues: Vec<ResidueRef> =
                                     (0..n).map(|_| residue(rng, target.residue_count)).collect();
                                 residues.sort_by_key(|r| r.resno);
                                 residues.dedup_by_key(|r| r.resno);
                                 Pocket { id: format!("pocket-{i}"),
                                          rank: 0,
                                          score: round2(rng.gen_range(0.35..0.98)),
                                          volume: round2(rng.gen_range(180.0..1400.0)),
                                          residues }
                             })
                             .collect();
    rank_pockets(pockets)
}

/// Número de hits reportados para una biblioteca de `total` compuestos.
pub fn hit_count(total: u64) -> usize {
    (total / 500).clamp(10, 50) as usize
}

/// Hits con pose sobre `pocket`, ordenados ascendentemente por score.
pub fn generate_hits(total: u64, pocket: &Pocket, rng: &mut impl Rng) -> Vec<Hit> {
    let mut hits: Vec<Hit> = (1..=hit_count(total)).map(|i| {
                                                       let score = round2(rng.gen_range(-11.5..-5.0));
                                                       let prefix = COMPOUND_PREFIXES.choose(rng).copied().unwrap_or("ZINC");
                                                       let id = format!("hit-{i:03}");
                                                       Hit { name: format!("{prefix}{:09}", rng.gen_range(0..1_000_000_000u64)),
                                                             score,
                                                             confidence: Confidence::from_score(score),
                                                             pose: Some(Pose { pocket_id: pocket.id.clone(),
                                                                               model_ref: format!("{id}_pose.sdf") }),
                                                             id }
                                                   })
                                                   .collect();
    sort_hits(&mut hits);
    hits
}

fn pick_residue(pool: &[ResidueRef], rng: &mut impl Rng) -> ResidueRef {
    pool.choose(rng).cloned().unwrap_or_else(|| ResidueRef::new(1, "A", "GLY"))
}

/// Interacciones de un hit con residuos de su bolsillo (`pool`).
pub fn generate_interactions(pool: &[ResidueRef], rng: &mut impl Rng) -> Interactions {
    let kinds = [ContactKind::Hydrophobic, ContactKind::PiStacking, ContactKind::SaltBridge, ContactKind::VanDerWaals];
    let n_hbonds = rng.gen_range(1..=4);
    let n_contacts = rng.gen_range(2..=6);
    let mut out = Interactions::default();
    for _ in 0..n_hbonds {
        out.h_bonds.push(HBond { residue: pick_residue(pool, rng),
                                 ligand_atom: LIGAND_ATOMS.choose(rng).copied().unwrap_or("O1").to_string(),
                                 distance: round2(rng.gen_range(2.5..3.3)) });
    }
    for _ in 0..n_contacts {
        out.contacts.push(Contact { residue: pick_residue(pool, rng),
                                    kind: kinds.choose(rng).copied().unwrap_or(ContactKind::Hydrophobic),
                                    distance: round2(rng.gen_range(3.3..4.8)) });
    }
    out
}

/// Workers activos según el avance del cribado.
pub fn workers_for(processed: u64, total: u64) -> u32 {
    if total == 0 {
        return 1;
    }
    let pct = (processed.min(total) * 100 / total) as u8;
    WORKER_THRESHOLDS.iter().find(|(min, _)| pct >= *min).map(|(_, w)| *w).unwrap_or(1)
}
