//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use atomera_adapters::WorkbenchConfig;
use once_cell::sync::Lazy;
use std::env;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Parámetros del workbench (tiempos, deadline, API, semilla).
    pub workbench: WorkbenchConfig,
    /// Filtro por defecto de `env_logger` si `RUST_LOG` no está definido.
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let workbench = WorkbenchConfig::from_env();
        let log_level = env::var("ATOMERA_LOG").ok()
                                               .map(|v| v.trim().to_string())
                                               .filter(|v| !v.is_empty())
                                               .unwrap_or_else(|| "info".to_string());
        Self { workbench, log_level }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Inicializa `env_logger`. Llamadas repetidas no fallan.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(CONFIG.log_level.as_str());
    let _ = env_logger::Builder::from_env(env).format_timestamp_millis().try_init();
}
