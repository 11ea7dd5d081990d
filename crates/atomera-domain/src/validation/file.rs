use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Reglas de validación para archivos de estructura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRules {
    /// Extensiones aceptadas, en minúsculas y sin punto.
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
    /// Umbral blando: por encima se emite un aviso.
    pub warn_bytes: u64,
}

impl Default for FileRules {
    fn default() -> Self {
        Self { allowed_extensions: ["pdb", "cif", "mmcif", "ent"].iter().map(|s| s.to_string()).collect(),
               max_bytes: 50 * MB,
               warn_bytes: 10 * MB }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub extension: Option<String>,
    pub size_bytes: u64,
}

fn as_mb(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / MB as f64)
}

/// Valida nombre y tamaño de un archivo de estructura.
pub fn validate_file(file_name: &str, size_bytes: u64, rules: &FileRules) -> FileValidation {
    let mut out = FileValidation { size_bytes,
                                   ..Default::default() };

    let extension = file_name.rsplit_once('.')
                             .map(|(_, ext)| ext.to_ascii_lowercase())
                             .filter(|ext| !ext.is_empty());
    match &extension {
        Some(ext) if rules.allowed_extensions.iter().any(|a| a == ext) => {}
        other => {
            let allowed = rules.allowed_extensions
                               .iter()
                               .map(|e| format!(".{e}"))
                               .collect::<Vec<_>>()
                               .join(", ");
            let found = other.as_ref().map(|e| format!("'.{e}'")).unwrap_or_else(|| "(none)".to_string());
            out.errors.push(format!("Unsupported file format {found} (allowed: {allowed})"));
        }
    }
    out.extension = extension;

    if size_bytes == 0 {
        out.errors.push("File is empty".to_string());
    } else if size_bytes > rules.max_bytes {
        out.errors.push(format!("File size ({}) exceeds {}MB limit", as_mb(size_bytes), rules.max_bytes / MB));
    } else if size_bytes > rules.warn_bytes {
        out.warnings.push(format!("Large file ({}); loading may take longer", as_mb(size_bytes)));
    }

    out.is_valid = out.errors.is_empty();
    out
}
