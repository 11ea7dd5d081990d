//! Referencia inmutable a un residuo de la estructura.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Residuo identificado por número, cadena y nombre (`A:ASP:112`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueRef {
    pub resno: i32,
    pub chainname: String,
    pub resname: String,
}

impl ResidueRef {
    pub fn new(resno: i32, chainname: &str, resname: &str) -> Self {
        Self { resno,
               chainname: chainname.to_string(),
               resname: resname.to_uppercase() }
    }
}

impl fmt::Display for ResidueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chainname, self.resname, self.resno)
    }
}

impl FromStr for ResidueRef {
    type Err = DomainError;

    /// Acepta la notación del backend `CHAIN:RESNAME:RESNO`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DomainError::ParseError { what: "residue reference",
                                               input: s.to_string() };
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [chain, resname, resno] if !chain.is_empty() && !resname.is_empty() => {
                let resno = resno.parse::<i32>().map_err(|_| err())?;
                Ok(ResidueRef::new(resno, chain, resname))
            }
            _ => Err(err()),
        }
    }
}
