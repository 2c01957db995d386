//! Error taxonomy for the life-stage engine.
//!
//! Configuration errors surface when a parameter set is bound to a stage.
//! Domain errors surface at the point of calculation. Grid exit and
//! abundance underflow are normal terminal states and live in
//! [`crate::entity::DeathCause`] instead.

use thiserror::Error;

use crate::rates::{FunctionCategory, FunctionKind};
use crate::stages::StageType;

/// A parameter set that cannot drive its stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{stage}: {function:?} is not a supported {category:?} function for this stage")]
    UnsupportedFunction {
        stage: StageType,
        category: FunctionCategory,
        function: FunctionKind,
    },

    #[error("{stage}: no {category:?} function selected")]
    MissingFunction {
        stage: StageType,
        category: FunctionCategory,
    },

    #[error("{stage}: missing required parameter `{name}`")]
    MissingParameter { stage: StageType, name: String },

    #[error("{stage}: parameter `{name}` should be of type {expected}")]
    ParameterType {
        stage: StageType,
        name: String,
        expected: &'static str,
    },

    #[error("{stage}: parameter `{name}` is invalid: {reason}")]
    InvalidParameter {
        stage: StageType,
        name: String,
        reason: String,
    },

    #[error("{stage}: catalog has no {category:?} function named `{name}`")]
    UnknownFunction {
        stage: StageType,
        category: FunctionCategory,
        name: String,
    },

    #[error("unknown stage type `{0}`")]
    UnknownStage(String),

    #[error("{0} has no bound parameter set in the registry")]
    NotRegistered(StageType),
}

/// A numeric state the model cannot represent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("development stage {dev_stage} maps to table index {index}, outside [0, 18]")]
    StageIndexOutOfRange { dev_stage: f64, index: i64 },

    #[error("{field} became non-finite ({value})")]
    NonFiniteState { field: &'static str, value: f64 },
}

/// Any error that aborts a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
