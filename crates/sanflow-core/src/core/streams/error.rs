use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    #[error("Component '{component}' is not part of the component set of stream '{stream}'")]
    UnknownComponent { stream: String, component: String },

    #[error("Invalid mass flow for '{component}' in stream '{stream}': {value} g/hr")]
    InvalidFlow {
        stream: String,
        component: String,
        value: f64,
    },

    #[error("Component '{0}' has no molecular weight; molar flows are undefined")]
    MissingMolecularWeight(String),

    #[error("Stream '{stream}' does not share the component set of '{other}'")]
    IncompatibleComponents { stream: String, other: String },

    #[error("Unknown flow unit '{0}'")]
    UnknownFlowUnit(String),

    #[error("Population must be a positive, finite number (got {0})")]
    InvalidPopulation(f64),

    #[error("Invalid per-capita load '{name}': {value}")]
    InvalidLoad { name: String, value: f64 },
}
