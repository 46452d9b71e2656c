use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("screen view already flushed, update rejected")]
    Flushed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
