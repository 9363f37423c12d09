//! Core configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Sh4Error, Sh4Result};

/// Settings for building and running a core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// PC after reset
    pub reset_vector: u32,
    /// Bus address of the RAM window
    pub ram_base: u32,
    /// RAM window size in bytes
    pub ram_size: usize,
    /// Step limit for a run
    pub max_steps: u64,
    /// Log every fetched instruction at trace level
    pub trace_instructions: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            reset_vector: 0xA000_0000,
            ram_base: 0x8800_0000,
            ram_size: 512 * 1024,
            max_steps: 1_000_000,
            trace_instructions: false,
        }
    }
}

impl CoreConfig {
    /// Load from a JSON file. Missing keys take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Sh4Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Sh4Result<()> {
        if self.ram_size == 0 {
            return Err(Sh4Error::Config("ram_size must be non-zero".into()));
        }
        if self.ram_base as u64 + self.ram_size as u64 > 1 << 32 {
            return Err(Sh4Error::Config(format!(
                "RAM window {:#010x}+{:#x} runs past the end of the address space",
                self.ram_base, self.ram_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.reset_vector, 0xA000_0000);
        assert_eq!(config.ram_size, 0x80000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "reset_vector": 2281701376, "max_steps": 50 }}"#).unwrap();

        let config = CoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.reset_vector, 0x8800_0000);
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.ram_base, 0x8800_0000);
        assert!(!config.trace_instructions);
    }

    #[test]
    fn test_bad_window_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ram_base": 4294967040, "ram_size": 512 }}"#).unwrap();

        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Sh4Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CoreConfig::from_json_file("/nonexistent/sh4a.json").unwrap_err();
        assert!(matches!(err, Sh4Error::Io(_)));
    }
}
