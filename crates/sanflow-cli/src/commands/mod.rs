pub mod components;
pub mod init;
pub mod simulate;
pub mod sweep;

use crate::error::Result;
use sanflow::core::components::{ComponentSet, household, household_with_library};
use sanflow::engine::error::EngineError;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The household component set, optionally extended from a TOML library.
pub(crate) fn load_components(library: Option<&Path>) -> Result<Arc<ComponentSet>> {
    let set = match library {
        Some(path) => {
            info!("Extending household components from {:?}", path);
            household_with_library(path)
        }
        None => household(),
    }
    .map_err(EngineError::from)?;
    info!("Component set compiled with {} components.", set.len());
    Ok(Arc::new(set))
}
