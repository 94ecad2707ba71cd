use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("Component set is empty")]
    Empty,

    #[error("Component id cannot be empty")]
    EmptyId,

    #[error("Duplicate component id '{0}'")]
    Duplicate(String),

    #[error("Invalid {name} for component '{id}': {value}")]
    InvalidCoefficient {
        id: String,
        name: &'static str,
        value: f64,
    },

    #[error("Gas-phase component '{0}' must have particle size 'dissolved-gas'")]
    InconsistentPhase(String),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
