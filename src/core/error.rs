use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Deterministic input errors. Every variant is raised before any sampling starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("missing asset data: no return/volatility entry for '{0}'")]
    MissingAssetData(String),
}

impl CoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidConfiguration(msg.into())
    }
}
