//! # Tool Configuration
//!
//! Optional YAML file, looked up in this order:
//! 1. `--config <path>` (or `AMF_SCALE_CONFIG`)
//! 2. `amf-scale.yaml` in the working directory
//! 3. built-in defaults
//!
//! ```yaml
//! store:
//!   snapshot: imm-snapshot.yaml
//! tools:
//!   amf_adm: amf-adm
//!   immadm: immadm
//! rewrite:
//!   fingerprint_len: 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::rewrite::DEFAULT_FINGERPRINT_LEN;
use crate::tools::{resolve_tool, tools};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "amf-scale.yaml";

fn default_snapshot() -> PathBuf {
    PathBuf::from("imm-snapshot.yaml")
}

fn default_fingerprint_len() -> usize {
    DEFAULT_FINGERPRINT_LEN
}

/// Configuration store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file backing the store
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
        }
    }
}

/// Admin tool overrides; unset means `{TOOL}_BIN` or PATH
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub amf_adm: Option<String>,
    #[serde(default)]
    pub immadm: Option<String>,
}

impl ToolsConfig {
    pub fn amf_adm(&self) -> String {
        resolve_tool(tools::AMF_ADM, self.amf_adm.as_deref())
    }

    pub fn immadm(&self) -> String {
        resolve_tool(tools::IMMADM, self.immadm.as_deref())
    }
}

/// Clone naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Length of the md5 fingerprint used for SU / SI segments
    #[serde(default = "default_fingerprint_len")]
    pub fingerprint_len: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            fingerprint_len: default_fingerprint_len(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,
}

impl ScaleConfig {
    /// Load an explicit file, else `amf-scale.yaml` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScaleConfig::default();
        assert_eq!(config.store.snapshot, PathBuf::from("imm-snapshot.yaml"));
        assert_eq!(config.rewrite.fingerprint_len, 10);
        assert!(config.tools.amf_adm.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ScaleConfig =
            serde_yaml::from_str("tools:\n  immadm: /opt/bin/immadm\n").unwrap();
        assert_eq!(config.tools.immadm(), "/opt/bin/immadm");
        assert_eq!(config.rewrite.fingerprint_len, 10);
        assert_eq!(config.store.snapshot, PathBuf::from("imm-snapshot.yaml"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "store:\n  snapshot: /var/lib/imm.yaml\nrewrite:\n  fingerprint_len: 8"
        )
        .unwrap();

        let config = ScaleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.store.snapshot, PathBuf::from("/var/lib/imm.yaml"));
        assert_eq!(config.rewrite.fingerprint_len, 8);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ScaleConfig::load(Some(Path::new("/nonexistent/amf-scale.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rewrite: [not, a, map]").unwrap();
        let err = ScaleConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
