// atomera-domain library entry point
pub mod error;
pub mod hit;
pub mod interactions;
pub mod pocket;
pub mod residue;
pub mod stage;
pub mod target;
pub mod validation;

pub use error::DomainError;
pub use hit::{sort_hits, Confidence, Hit, Pose};
pub use interactions::{Contact, ContactKind, HBond, Interactions};
pub use pocket::{rank_pockets, Pocket};
pub use residue::ResidueRef;
pub use stage::StageId;
pub use target::{classify, fingerprint_bytes, Classification, Provenance, ProvenanceMethod, StructureMetrics, Suitability,
                 TargetCategory, TargetInfo, TargetSource};
pub use validation::{validate_fasta, validate_file, FastaRules, FastaValidation, FileRules, FileValidation};
