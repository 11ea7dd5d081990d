use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Alfabeto canónico de 20 aminoácidos.
pub const CANONICAL_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";
/// Códigos ambiguos o no estándar que se aceptan con aviso.
pub const AMBIGUOUS_RESIDUES: &str = "BJOUXZ";

static CANONICAL: Lazy<HashSet<char>> = Lazy::new(|| CANONICAL_RESIDUES.chars().collect());
static AMBIGUOUS: Lazy<HashSet<char>> = Lazy::new(|| AMBIGUOUS_RESIDUES.chars().collect());

/// Límites de longitud (ambos inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaRules {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for FastaRules {
    fn default() -> Self {
        Self { min_length: 20,
               max_length: 2500 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub header: Option<String>,
    /// Secuencia normalizada (mayúsculas, sin espacios).
    pub sequence: String,
    pub sequence_length: usize,
    /// Caracteres inválidos distintos, en orden de primera aparición.
    pub invalid_characters: Vec<char>,
    /// Residuos ambiguos distintos, en orden de primera aparición.
    pub ambiguous_residues: Vec<char>,
}

fn join_chars(chars: &[char]) -> String {
    chars.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
}

/// Valida un texto FASTA de una sola secuencia.
pub fn validate_fasta(text: &str, rules: &FastaRules) -> FastaValidation {
    let mut out = FastaValidation::default();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let first = match lines.next() {
        Some(l) => l,
        None => {
            out.errors.push("No sequence provided".to_string());
            return out;
        }
    };
    let Some(header) = first.strip_prefix('>') else {
        out.errors.push("Missing FASTA header (first line must start with '>')".to_string());
        return out;
    };
    let header = header.trim();
    if header.is_empty() {
        out.warnings.push("FASTA header is empty".to_string());
    }
    out.header = Some(header.to_string());

    let mut raw = String::new();
    for line in lines {
        if line.starts_with('>') {
            out.warnings.push("Multiple sequences found; only the first one is used".to_string());
            break;
        }
        raw.extend(line.chars().filter(|c| !c.is_whitespace()));
    }
    let mut sequence = raw.to_uppercase();
    if sequence.ends_with('*') {
        sequence.pop();
    }

    for c in sequence.chars() {
        if CANONICAL.contains(&c) {
            continue;
        }
        if AMBIGUOUS.contains(&c) {
            if !out.ambiguous_residues.contains(&c) {
                out.ambiguous_residues.push(c);
            }
        } else if !out.invalid_characters.contains(&c) {
            out.invalid_characters.push(c);
        }
    }

    let length = sequence.chars().count();
    if length == 0 {
        out.errors.push("Sequence is empty".to_string());
    } else if length < rules.min_length {
        out.errors.push(format!("Sequence too short ({length} residues, minimum {})", rules.min_length));
    } else if length > rules.max_length {
        out.errors.push(format!("Sequence too long ({length} residues, maximum {})", rules.max_length));
    }
    if !out.invalid_characters.is_empty() {
        out.errors.push(format!("Invalid characters: {}", join_chars(&out.invalid_characters)));
    }
    if !out.ambiguous_residues.is_empty() {
        out.warnings.push(format!("Ambiguous residues accepted: {}", join_chars(&out.ambiguous_residues)));
    }

    out.sequence = sequence;
    out.sequence_length = length;
    out.is_valid = out.errors.is_empty();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sequence_is_rejected() {
        let v = validate_fasta(">p\nMKT", &FastaRules::default());
        assert!(!v.is_valid);
        assert_eq!(v.sequence_length, 3);
        assert!(v.errors.iter().any(|e| e.contains("too short")));
    }

    #[test]
    fn valid_multiline_sequence() {
        let text = format!(">sp|P00001|TEST\n{}\n{}\n", "A".repeat(100), "g".repeat(100));
        let v = validate_fasta(&text, &FastaRules::default());
        assert!(v.is_valid, "{:?}", v.errors);
        assert_eq!(v.sequence_length, 200);
        assert_eq!(v.header.as_deref(), Some("sp|P00001|TEST"));
        assert!(v.sequence.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn missing_header_is_an_error() {
        let v = validate_fasta(&"A".repeat(40), &FastaRules::default());
        assert!(!v.is_valid);
        assert!(v.errors[0].contains("header"));
    }

    #[test]
    fn invalid_characters_are_listed_once() {
        let text = format!(">p\n{}1@1@1", "A".repeat(30));
        let v = validate_fasta(&text, &FastaRules::default());
        assert!(!v.is_valid);
        assert_eq!(v.invalid_characters, vec!['1', '@']);
        assert!(v.errors.iter().any(|e| e == "Invalid characters: 1, @"));
    }

    #[test]
    fn ambiguous_residues_only_warn() {
        let text = format!(">p\n{}XXB", "A".repeat(30));
        let v = validate_fasta(&text, &FastaRules::default());
        assert!(v.is_valid);
        assert_eq!(v.ambiguous_residues, vec!['X', 'B']);
        assert_eq!(v.warnings.len(), 1);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let rules = FastaRules::default();
        assert!(validate_fasta(&format!(">p\n{}", "A".repeat(20)), &rules).is_valid);
        assert!(validate_fasta(&format!(">p\n{}", "A".repeat(2500)), &rules).is_valid);
        let too_long = validate_fasta(&format!(">p\n{}", "A".repeat(2501)), &rules);
        assert!(too_long.errors.iter().any(|e| e.contains("too long")));
    }

    #[test]
    fn only_first_record_is_used() {
        let text = format!(">a\n{}\n>b\n{}", "A".repeat(25), "C".repeat(25));
        let v = validate_fasta(&text, &FastaRules::default());
        assert_eq!(v.sequence_length, 25);
        assert!(v.warnings.iter().any(|w| w.contains("Multiple sequences")));
    }
}
