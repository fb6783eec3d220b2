use std::fmt;

use serde::de::DeserializeOwned;

/// Problems found while loading a `nova.toml` that did not prevent deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Dotted paths of keys the schema does not know (`cache.capacty`), sorted.
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }

    pub(crate) fn extend_validation(&mut self, validation: ValidationDiagnostics) {
        self.warnings.extend(validation.warnings);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationDiagnostics {
    pub warnings: Vec<ConfigWarning>,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    InvalidValue { toml_path: String, message: String },
    /// `logging.level` is not a level or a valid filter directive; `info` is used instead.
    LoggingLevelInvalid { value: String, normalized: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::InvalidValue { toml_path, message } => {
                write!(f, "`{toml_path}` {message}")
            }
            ConfigWarning::LoggingLevelInvalid { value, normalized } => write!(
                f,
                "`logging.level` = {value:?} is not a valid filter (parsed as {normalized:?})"
            ),
        }
    }
}

/// Deserializes `text`, recording every key that `T` ignores.
pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        // Root-level paths render with a leading `.`.
        unknown.push(path.to_string().trim_start_matches('.').to_owned());
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NovaConfig;

    #[test]
    fn unknown_keys_use_dotted_paths() {
        let text = r#"
verbose = true

[cache]
capacty = 10

[typeck]
solve_lambdas = false
"#;

        let (config, unknown) =
            deserialize_toml_with_unknown_keys::<NovaConfig>(text).expect("parse");
        assert_eq!(unknown, vec!["cache.capacty", "verbose"]);
        assert!(!config.typeck.solve_lambdas);
    }

    #[test]
    fn warnings_render_the_offending_key() {
        let warning = ConfigWarning::InvalidValue {
            toml_path: "cache.capacity".to_owned(),
            message: "must be >= 1".to_owned(),
        };
        assert_eq!(warning.to_string(), "`cache.capacity` must be >= 1");
    }
}
