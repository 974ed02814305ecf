//! Shared domain types and configuration for the unified price catalog.

pub mod app_config;
pub mod config;
pub mod knowledge;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use knowledge::{load_knowledge, CategoryConfig, Knowledge, NetworkConfig};
pub use products::{
    Catalog, CatalogMetadata, CategoryStats, NetworkId, PriceEntry, PriceTable,
    RawProductRecord, SavingsAnalysis, SavingsOpportunity, UnifiedProduct,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read knowledge file {path}: {source}")]
    KnowledgeFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse knowledge file: {0}")]
    KnowledgeFileParse(#[from] serde_yaml::Error),

    #[error("knowledge validation failed: {0}")]
    Validation(String),
}
