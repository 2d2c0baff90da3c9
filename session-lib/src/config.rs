//! Session configuration. Read from a JSON file, every field is optional.
//!
//! ```json
//! { "endpoint": "ws://127.0.0.1:8000/duckchess", "setup_dir": "./settings" }
//! ```

use crate::error::SessionError;
use duck_protocol::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Web socket URL of the authority.
    pub endpoint: String,
    /// Directory holding the persisted board setup.
    pub setup_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            setup_dir: PathBuf::from("."),
        }
    }
}

impl SessionConfig {
    /// Loads the configuration file.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let json_content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&json_content)
    }

    pub fn parse(json_content: &str) -> Result<Self, SessionError> {
        serde_json::from_str(json_content)
            .map_err(|e| SessionError::Configuration(format!("Failed to parse JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = SessionConfig::parse(r#"{ "endpoint": "ws://localhost:8000/play" }"#).unwrap();
        assert_eq!(config.endpoint, "ws://localhost:8000/play");
        assert_eq!(config.setup_dir, PathBuf::from("."));
        assert_eq!(SessionConfig::parse("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn broken_file_is_a_configuration_error() {
        assert!(matches!(
            SessionConfig::parse("[1, 2"),
            Err(SessionError::Configuration(_))
        ));
        assert!(SessionConfig::load(Path::new("/no/such/config.json")).is_err());
    }
}
