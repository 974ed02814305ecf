//! Knowledge tables: retail networks, noise words, and product categories.
//!
//! These are immutable configuration data handed to the engine components at
//! construction time. A default set ships with the crate (see
//! [`Knowledge::bundled`]); deployments may supply their own YAML file via
//! [`load_knowledge`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::products::NetworkId;
use crate::ConfigError;

const BUNDLED_KNOWLEDGE: &str = include_str!("../../../config/knowledge.yaml");

/// A retail chain and the signals that identify it in source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Canonical snake_case id, e.g. `"rami_levy"`.
    pub id: String,
    /// Name variants matched as case-insensitive substrings of a record's
    /// `source` field (Hebrew and Latin spellings).
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Chain codes from the price-transparency feeds, matched as substrings.
    #[serde(default)]
    pub barcode_prefixes: Vec<String>,
}

impl NetworkConfig {
    #[must_use]
    pub fn network_id(&self) -> NetworkId {
        NetworkId::new(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knowledge {
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub noise_words: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl Knowledge {
    /// The knowledge tables compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bundled YAML fails to parse or validate,
    /// which only happens if the shipped file is edited incorrectly.
    pub fn bundled() -> Result<Self, ConfigError> {
        parse_knowledge(BUNDLED_KNOWLEDGE)
    }

    /// Looks up a network by its canonical id.
    #[must_use]
    pub fn network(&self, id: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.id == id)
    }
}

/// Load and validate a knowledge file from disk.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_knowledge(path: &Path) -> Result<Knowledge, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KnowledgeFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_knowledge(&content)
}

fn parse_knowledge(content: &str) -> Result<Knowledge, ConfigError> {
    let knowledge: Knowledge = serde_yaml::from_str(content)?;
    validate_knowledge(&knowledge)?;
    Ok(knowledge)
}

fn is_snake_case_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('_')
        && !id.ends_with('_')
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_knowledge(knowledge: &Knowledge) -> Result<(), ConfigError> {
    if knowledge.networks.is_empty() {
        return Err(ConfigError::Validation(
            "at least one network must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for network in &knowledge.networks {
        if !is_snake_case_id(&network.id) {
            return Err(ConfigError::Validation(format!(
                "network id '{}' must be lowercase snake_case",
                network.id
            )));
        }
        if network.id == NetworkId::UNKNOWN {
            return Err(ConfigError::Validation(format!(
                "network id '{}' is reserved for unresolved records",
                NetworkId::UNKNOWN
            )));
        }
        if !seen_ids.insert(network.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate network id: '{}'",
                network.id
            )));
        }
        if network.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "network '{}' has a blank alias",
                network.id
            )));
        }
        if let Some(bad) = network
            .barcode_prefixes
            .iter()
            .find(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ConfigError::Validation(format!(
                "network '{}' has non-numeric barcode prefix '{bad}'",
                network.id
            )));
        }
    }

    for word in &knowledge.noise_words {
        if word.trim().is_empty() {
            return Err(ConfigError::Validation(
                "noise words must be non-empty".to_string(),
            ));
        }
        if word.split_whitespace().count() > 1 {
            return Err(ConfigError::Validation(format!(
                "noise word '{word}' must be a single token"
            )));
        }
    }

    let mut seen_categories = HashSet::new();
    for category in &knowledge.categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id must be non-empty".to_string(),
            ));
        }
        if !seen_categories.insert(category.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}'",
                category.id
            )));
        }
        if category.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' has no keywords",
                category.id
            )));
        }
    }

    Ok(())
}
