#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("bad report config: {0}")]
    Config(String),

    #[error("tier not found: {0}")]
    TierNotFound(String),

    #[error("invalid volume {0:?} (expected e.g. 50000, 50,000, 50k, 2M)")]
    InvalidVolume(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;
