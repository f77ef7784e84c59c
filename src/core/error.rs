use thiserror::Error;

use crate::core::types::{ModelId, UnitId};

/// Errors raised outside the resolvers.
///
/// Resolvers never return these: rule violations are reported as reasons on
/// the result. These cover configuration, data loading and diff application.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid dice expression: {0:?}")]
    DiceExpression(String),

    #[error("Unit not found: {0}")]
    UnknownUnit(UnitId),

    #[error("Model {model} not found in unit {unit}")]
    UnknownModel { unit: UnitId, model: ModelId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;
