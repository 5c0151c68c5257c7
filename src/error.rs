use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapetuneError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("Value {value} of attribute '{attribute}' is not in its domain")]
    DomainLookupMiss { attribute: String, value: String },

    #[error("Host integration error: {0}")]
    HostIntegration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShapetuneError>;
