use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::error::{Result, ScrubError};

/// Deployment defaults loaded from a TOML file; every field is optional and
/// only fills CLI flags the caller left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub output_path: Option<String>,
    pub reference_file: Option<String>,
    pub state_file: Option<String>,
    pub reference_refresh_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(ScrubError::Config {
                message: format!("config file not found: {}", path),
            });
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScrubError::Config {
            message: format!("invalid config file {}: {}", path, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output_path = \"/srv/scrub/out\"\nreference_refresh_secs = 120"
        )
        .unwrap();

        let config = FileConfig::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.output_path.as_deref(), Some("/srv/scrub/out"));
        assert_eq!(config.reference_refresh_secs, Some(120));
        assert!(config.state_file.is_none());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = FileConfig::from_file("/nonexistent/scrub.toml").unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "output_path = [not toml").unwrap();

        let err = FileConfig::from_file(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }
}
