//! Validación síncrona de entradas del target (FASTA y archivo de estructura).
//!
//! Ambas validaciones son puras y se re-ejecutan en cada cambio de entrada.
//! Los errores bloquean la acción de continuar; los avisos sólo informan.

pub mod fasta;
pub mod file;

pub use fasta::{validate_fasta, FastaRules, FastaValidation};
pub use file::{validate_file, FileRules, FileValidation};
