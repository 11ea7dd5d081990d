//! Interacciones proteína-ligando del hit seleccionado.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ResidueRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HBond {
    pub residue: ResidueRef,
    pub ligand_atom: String,
    /// Distancia donor-aceptor en Å.
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Hydrophobic,
    PiStacking,
    SaltBridge,
    VanDerWaals,
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContactKind::Hydrophobic => "Hydrophobic",
            ContactKind::PiStacking => "Pi-Stacking",
            ContactKind::SaltBridge => "Salt Bridge",
            ContactKind::VanDerWaals => "Van der Waals",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub residue: ResidueRef,
    pub kind: ContactKind,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactions {
    pub h_bonds: Vec<HBond>,
    pub contacts: Vec<Contact>,
}

impl Interactions {
    pub fn len(&self) -> usize {
        self.h_bonds.len() + self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Residuos implicados, sin duplicados, en orden de aparición.
    pub fn residues(&self) -> Vec<&ResidueRef> {
        let mut out: Vec<&ResidueRef> = Vec::new();
        for r in self.h_bonds.iter().map(|h| &h.residue).chain(self.contacts.iter().map(|c| &c.residue)) {
            if !out.contains(&r) {
                out.push(r);
            }
        }
        out
    }
}
