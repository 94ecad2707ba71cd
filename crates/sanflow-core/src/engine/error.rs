use thiserror::Error;

use super::config::ConfigError;
use crate::core::components::ComponentError;
use crate::core::streams::{Composite, StreamError};
use crate::core::units::UnitError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Component set error: {source}")]
    Component {
        #[from]
        source: ComponentError,
    },

    #[error("Stream error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },

    #[error("Unit operation failed: {source}")]
    Unit {
        #[from]
        source: UnitError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Inlet '{stream}' of unit '{unit}' is neither a feed nor an outlet of an earlier unit")]
    UnresolvedStream { unit: String, stream: String },

    #[error("Stream '{0}' already exists in the system")]
    DuplicateStream(String),

    #[error("Stream '{stream}' is already consumed by another unit and cannot feed '{unit}'")]
    StreamAlreadyConsumed { stream: String, unit: String },

    #[error("Unit '{0}' already exists in the system")]
    DuplicateUnit(String),

    #[error("Unit '{unit}' expects {expected} {direction}, but {found} were connected")]
    PortMismatch {
        unit: String,
        direction: &'static str,
        expected: String,
        found: usize,
    },

    #[error(
        "Mass balance violated by unit '{unit}' for {quantity}: in = {inflow:.9e} g/hr, out = {outflow:.9e} g/hr"
    )]
    MassBalance {
        unit: String,
        quantity: Composite,
        inflow: f64,
        outflow: f64,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
