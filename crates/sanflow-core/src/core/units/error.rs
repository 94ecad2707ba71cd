use crate::core::streams::StreamError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("Invalid parameter '{name}' for unit '{unit}': {value} ({reason})")]
    InvalidParameter {
        unit: String,
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Unit '{unit}' requires component '{component}', which is not in the component set")]
    MissingComponent { unit: String, component: String },

    #[error("Unit '{unit}' expects {expected} {direction}, got {found}")]
    PortCount {
        unit: String,
        direction: &'static str,
        expected: String,
        found: usize,
    },

    #[error(transparent)]
    Stream(#[from] StreamError),
}
