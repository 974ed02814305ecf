use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for a unification run.
///
/// Knowledge tables (networks, noise words, categories) live in a separate
/// YAML file; see [`crate::knowledge`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Knowledge file override. `None` uses the bundled defaults.
    pub knowledge_path: Option<PathBuf>,
    /// Minimum similarity for a record to join an existing cluster.
    pub cluster_threshold: f64,
    /// Minimum similarity for two same-network records in one source to be
    /// treated as duplicates of each other.
    pub duplicate_threshold: f64,
    pub suppress_duplicates: bool,
    /// Keys shorter than this many characters are not matchable.
    pub min_key_length: usize,
    /// Exclusive lower price bound.
    pub min_price: f64,
    /// Exclusive upper price bound.
    pub max_price: f64,
    pub significant_savings_percent: f64,
    pub max_concurrent_sources: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            log_level: "info".to_string(),
            knowledge_path: None,
            cluster_threshold: 0.75,
            duplicate_threshold: 0.85,
            suppress_duplicates: true,
            min_key_length: 5,
            min_price: 0.0,
            max_price: 2000.0,
            significant_savings_percent: 15.0,
            max_concurrent_sources: 4,
        }
    }
}
