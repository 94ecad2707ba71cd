use sanflow::engine::config::HouseholdConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub household: HouseholdConfig,
    pub component_library: Option<PathBuf>,
}
