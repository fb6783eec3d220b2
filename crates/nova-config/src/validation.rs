use crate::diagnostics::{ConfigWarning, ValidationDiagnostics};
use crate::{LoggingConfig, NovaConfig};

impl NovaConfig {
    /// Validate semantic invariants for a configuration.
    ///
    /// Validation is best-effort: it attempts to report as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_logging(self, &mut out);
        validate_cache(self, &mut out);

        out
    }
}

fn validate_logging(config: &NovaConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}

fn validate_cache(config: &NovaConfig, out: &mut ValidationDiagnostics) {
    if config.cache.enabled && config.cache.capacity == 0 {
        out.warnings.push(ConfigWarning::InvalidValue {
            toml_path: "cache.capacity".to_string(),
            message: "must be >= 1 when the cache is enabled; nothing will be memoized".to_string(),
        });
    }
}
