use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed JSON in source {source_name}: {source}")]
    MalformedSource {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("source {source_name} has no recognizable product list: {reason}")]
    UnrecognizedShape { source_name: String, reason: String },

    #[error("no usable input sources ({attempted} attempted)")]
    NoUsableSources { attempted: usize },

    #[error("invalid engine setting {setting}: {reason}")]
    InvalidSetting { setting: String, reason: String },
}
