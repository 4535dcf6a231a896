//! Configuration file parser for ~/.config/synext/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::document::DEFAULT_MAX_DOCUMENT_SIZE;
use crate::extension::{catalog, LoadSettings, NamespaceMatching};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Consider every built-in extension whose namespace is in scope.
    pub auto_detect_extensions: bool,

    /// `"uri-or-prefix"` or `"uri"`.
    pub namespace_matching: NamespaceMatching,

    /// Prefixes of built-in extensions that are always considered, even when
    /// auto-detection is off (e.g. `["dc", "slash"]`).
    pub extensions: Vec<String>,

    /// Maximum number of items loaded per document (0 = unlimited).
    pub retrieval_limit: usize,

    /// Largest feed file accepted, in bytes.
    pub max_document_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_detect_extensions: true,
            namespace_matching: NamespaceMatching::default(),
            extensions: Vec::new(),
            retrieval_limit: 0,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "auto_detect_extensions",
                "namespace_matching",
                "extensions",
                "retrieval_limit",
                "max_document_size",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            auto_detect = config.auto_detect_extensions,
            extensions = config.extensions.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Maps the configuration onto [`LoadSettings`].
    ///
    /// Prefixes that name no built-in extension are logged and skipped.
    pub fn load_settings(&self) -> LoadSettings {
        let mut settings = LoadSettings {
            auto_detect_extensions: self.auto_detect_extensions,
            namespace_matching: self.namespace_matching,
            retrieval_limit: self.retrieval_limit,
            ..LoadSettings::default()
        };
        for prefix in &self.extensions {
            match catalog::find_by_prefix(prefix) {
                Some(ty) => settings = settings.with_extension_type(ty.clone()),
                None => tracing::warn!(
                    prefix = %prefix,
                    "Unknown extension prefix in config, ignoring"
                ),
            }
        }
        settings
    }
}

// ============================================================================
// Tests
// ============================================================================
