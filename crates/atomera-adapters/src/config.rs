//! Configuración del workbench desde variables de entorno (`.env` opcional).
//!
//! Valores no parseables caen al default.

use atomera_domain::{FastaRules, FileRules};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone)]
pub struct WorkbenchConfig {
    /// Multiplicador de las esperas simuladas; 0 las desactiva.
    pub time_scale: f64,
    /// Deadline por job; `None` = sin límite.
    pub job_timeout: Option<Duration>,
    /// Cadencia de sondeo del backend remoto.
    pub poll_interval: Duration,
    pub api_url: Option<String>,
    /// Semilla de los generadores sintéticos (reproducibilidad).
    pub seed: Option<u64>,
    pub fasta_rules: FastaRules,
    pub file_rules: FileRules,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self { time_scale: 1.0,
               job_timeout: Some(Duration::from_secs(300)),
               poll_interval: Duration::from_millis(1000),
               api_url: None,
               seed: None,
               fasta_rules: FastaRules::default(),
               file_rules: FileRules::default() }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl WorkbenchConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let defaults = Self::default();
        let time_scale = parsed::<f64>("ATOMERA_TIME_SCALE").filter(|v| v.is_finite() && *v >= 0.0)
                                                            .unwrap_or(defaults.time_scale);
        let job_timeout = match parsed::<u64>("ATOMERA_JOB_TIMEOUT_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.job_timeout,
        };
        let poll_interval = parsed::<u64>("ATOMERA_POLL_INTERVAL_MS").filter(|ms| *ms > 0)
                                                                     .map(Duration::from_millis)
                                                                     .unwrap_or(defaults.poll_interval);
        let api_url = env::var("ATOMERA_API_URL").ok().map(|u| u.trim().trim_end_matches('/').to_string()).filter(|u| !u.is_empty());
        Self { time_scale,
               job_timeout,
               poll_interval,
               api_url,
               seed: parsed("ATOMERA_SEED"),
               ..defaults }
    }

    /// Sin esperas y con semilla fija: útil en tests y demos deterministas.
    pub fn instant(seed: u64) -> Self {
        Self { time_scale: 0.0,
               seed: Some(seed),
               ..Self::default() }
    }
}
