use crate::code::{CodeFormat, MAX_WIDTH};
use crate::error::{AlmoxError, Result};
use crate::generator::GeneratorSettings;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file; relative paths resolve against the project root.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Per round-trip timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DB_FILE)
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// AllocationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    #[serde(default = "default_max_batch")]
    pub max_batch: u64,
    /// Persist attempts before a uniqueness conflict is surfaced.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_batch() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
            max_attempts: default_max_attempts(),
        }
    }
}

// ---------------------------------------------------------------------------
// WarehouseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub codes: CodeFormat,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(warehouse_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            warehouse: WarehouseConfig {
                name: warehouse_name.into(),
                description: None,
            },
            codes: CodeFormat::default(),
            store: StoreConfig::default(),
            allocation: AllocationConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(AlmoxError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn store_path(&self, root: &Path) -> PathBuf {
        paths::store_path(root, &self.store.path)
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            store_timeout: Duration::from_millis(self.store.timeout_ms),
            max_batch: self.allocation.max_batch,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.codes.prefix.is_empty() {
            warnings.push(ConfigWarning::warning(
                "codes.prefix is empty; codes will be bare numbers",
            ));
        }
        if self.codes.prefix.chars().any(|c| c.is_ascii_digit()) {
            warnings.push(ConfigWarning::error(format!(
                "codes.prefix '{}' contains digits; generated codes could not be parsed back",
                self.codes.prefix
            )));
        }
        if self.codes.width == 0 || self.codes.width > MAX_WIDTH {
            warnings.push(ConfigWarning::error(format!(
                "codes.width={} must be between 1 and {MAX_WIDTH}",
                self.codes.width
            )));
        }
        if self.codes.first == 0 {
            warnings.push(ConfigWarning::warning(
                "codes.first=0 issues a zero code first",
            ));
        }

        if self.store.timeout_ms == 0 {
            warnings.push(ConfigWarning::error(
                "store.timeout_ms=0 makes every store call time out",
            ));
        }

        if self.allocation.max_batch == 0 {
            warnings.push(ConfigWarning::error(
                "allocation.max_batch=0 rejects every batch request",
            ));
        }
        if self.allocation.max_attempts == 0 {
            warnings.push(ConfigWarning::error(
                "allocation.max_attempts=0 never persists an item",
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
