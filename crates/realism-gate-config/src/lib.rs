// realism-gate-config/src/lib.rs
// ============================================================================
// Module: Gate Configuration Loading And Routing
// Description: TOML loading, exhaustive validation, and category-tag routing
//              for `GateConfig` documents.
// Purpose: Fail closed on anything that would let an unvalidated or
//          ambiguous configuration reach the rest of the gate.
// Dependencies: realism-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits, then validated exhaustively before a [`GateConfig`] is ever
//! handed to a caller. A `GateConfigSet` additionally enforces category-tag
//! uniqueness and exposes a [`CategoryRouter`] that maps a category tag to
//! the `GateConfigId` governing it.

use std::fs;
use std::path::Component;
use std::path::Path;

use realism_gate_core::Category;
use realism_gate_core::FailCode;
use realism_gate_core::GateConfig;
use realism_gate_core::GateConfigId;
use thiserror::Error;

/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum total path length in bytes.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Tolerance for the "weights sum to 1" load-time check.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// The stable fail code for a category tag with no routing entry.
pub const FAIL_CODE_CONFIG_UNKNOWN_CATEGORY: &str = "CONFIG_UNKNOWN_CATEGORY";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while loading or validating gate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config path failed a structural check before any bytes were read.
    #[error("invalid config path: {0}")]
    InvalidPath(String),
    /// Reading the config file from disk failed.
    #[error("failed to read config file: {0}")]
    Io(String),
    /// The config file violated a size, encoding, or structural limit.
    #[error("invalid config file: {0}")]
    Invalid(String),
    /// The TOML document did not parse into a `GateConfig`.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A loaded `GateConfig` failed a semantic validation rule.
    #[error("config validation failed: {0}")]
    Validation(String),
    /// A category tag had no entry in the routing table.
    #[error("unknown category tag: {0}")]
    UnknownCategory(String),
}

impl ConfigError {
    /// Returns the stable fail code this error maps to, when it has one.
    #[must_use]
    pub fn fail_code(&self) -> Option<FailCode> {
        match self {
            Self::UnknownCategory(_) => Some(FailCode::new(FAIL_CODE_CONFIG_UNKNOWN_CATEGORY)),
            Self::InvalidPath(_) | Self::Io(_) | Self::Invalid(_) | Self::Parse(_) | Self::Validation(_) => {
                None
            }
        }
    }
}

// ============================================================================
// SECTION: Path And File Validation
// ============================================================================

/// Validates a config path's structure before it is read from disk.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPath`] when the path or any of its
/// components exceed the configured length ceilings.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let rendered = path.to_string_lossy();
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::InvalidPath("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if let Component::Normal(part) = component
            && part.len() > MAX_PATH_COMPONENT_LENGTH
        {
            return Err(ConfigError::InvalidPath("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Loads and validates a single `GateConfig` document from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the path is malformed, the file cannot be
/// read, exceeds the size limit, is not valid UTF-8, fails to parse, or
/// fails semantic validation.
pub fn load_gate_config(path: &Path) -> Result<GateConfig, ConfigError> {
    validate_path(path)?;
    let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    let config: GateConfig = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    validate_gate_config(&config)?;
    Ok(config)
}

// ============================================================================
// SECTION: Semantic Validation
// ============================================================================

/// Validates a `GateConfig` for internal consistency.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when weights do not sum to one,
/// subscore floors or thresholds fall outside `[0, 1]`, or the uncertainty
/// band is negative.
pub fn validate_gate_config(config: &GateConfig) -> Result<(), ConfigError> {
    let weight_sum: f64 = config.decision.weights.values().sum();
    if (weight_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(ConfigError::Validation(format!(
            "decision.weights must sum to 1.0, got {weight_sum}"
        )));
    }

    for (critic, floor) in &config.decision.subscore_floors {
        if !(0.0..=1.0).contains(floor) {
            return Err(ConfigError::Validation(format!(
                "decision.subscore_floors.{critic} must be in [0, 1], got {floor}"
            )));
        }
        if !config.decision.weights.contains_key(critic) {
            return Err(ConfigError::Validation(format!(
                "decision.subscore_floors.{critic} has no matching entry in decision.weights"
            )));
        }
    }

    if !(0.0..=1.0).contains(&config.decision.overall_threshold) {
        return Err(ConfigError::Validation(format!(
            "decision.overall_threshold must be in [0, 1], got {}",
            config.decision.overall_threshold
        )));
    }

    if config.decision.uncertainty_band < 0.0 {
        return Err(ConfigError::Validation(
            "decision.uncertainty_band must be non-negative".to_string(),
        ));
    }

    if config.render.sample_count == 0 {
        return Err(ConfigError::Validation(
            "render.sample_count must be greater than zero".to_string(),
        ));
    }

    if config.render.resolution[0] == 0 || config.render.resolution[1] == 0 {
        return Err(ConfigError::Validation(
            "render.resolution dimensions must be greater than zero".to_string(),
        ));
    }

    if config.render.denoise {
        return Err(ConfigError::Validation(
            "render.denoise must be false for the baseline determinism contract".to_string(),
        ));
    }

    if config.iteration.max_iterations == 0 {
        return Err(ConfigError::Validation(
            "iteration.max_iterations must be greater than zero".to_string(),
        ));
    }

    if config.iteration.repeated_hard_code_threshold == 0 {
        return Err(ConfigError::Validation(
            "iteration.repeated_hard_code_threshold must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

// ============================================================================
// SECTION: Category Routing
// ============================================================================

/// A validated collection of `GateConfig` documents with a category-tag
/// routing table, loaded from one TOML document (§6).
#[derive(Debug, Clone)]
pub struct CategoryRouter {
    configs: Vec<GateConfig>,
}

impl CategoryRouter {
    /// Builds a router from a set of already-validated configs, rejecting
    /// duplicate category tags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when two configs share a category
    /// tag.
    pub fn new(configs: Vec<GateConfig>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for config in &configs {
            if !seen.insert(config.category.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category tag in routing table: {}",
                    config.category
                )));
            }
        }
        Ok(Self { configs })
    }

    /// Loads a routing table from a directory of `*.toml` gate-config files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the directory cannot be read, any
    /// contained file fails to load, or the resulting set has duplicate
    /// category tags.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        validate_path(dir)?;
        let entries = fs::read_dir(dir).map_err(|err| ConfigError::Io(err.to_string()))?;
        let mut configs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ConfigError::Io(err.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
                configs.push(load_gate_config(&path)?);
            }
        }
        Self::new(configs)
    }

    /// Resolves a category tag to its governing `GateConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCategory`] when no config in the
    /// router's set carries a matching `category` field.
    pub fn resolve(&self, category: &Category) -> Result<&GateConfig, ConfigError> {
        self.configs
            .iter()
            .find(|config| &config.category == category)
            .ok_or_else(|| ConfigError::UnknownCategory(category.to_string()))
    }

    /// Returns the `GateConfigId` governing a category tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCategory`] when no config in the
    /// router's set carries a matching `category` field.
    pub fn resolve_id(&self, category: &Category) -> Result<GateConfigId, ConfigError> {
        self.resolve(category).map(|config| config.config_id.clone())
    }

    /// Returns every category tag known to this router.
    #[must_use]
    pub fn known_categories(&self) -> Vec<Category> {
        self.configs.iter().map(|config| config.category.clone()).collect()
    }
}
