use super::file::{FileConfig, FileDigesterConfig, FileLoadsConfig, FileMbrConfig, FileSimulationConfig};
use sanflow::core::streams::PerCapitaLoads;
use sanflow::core::units::{DigesterParams, MbrParams};
use sanflow::engine::balance::DEFAULT_BALANCE_TOLERANCE;
use sanflow::engine::config::HouseholdConfig;

pub struct DefaultsConfig {
    pub population: f64,
    pub greywater: PerCapitaLoads,
    pub blackwater: PerCapitaLoads,
    pub mbr: MbrParams,
    pub digester: DigesterParams,
    pub route_sludge_to_digester: bool,
    pub balance_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            population: 10_000.0,
            greywater: PerCapitaLoads::greywater(),
            blackwater: PerCapitaLoads::blackwater(),
            mbr: HouseholdConfig::household_mbr(),
            digester: DigesterParams::default(),
            route_sludge_to_digester: false,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

impl DefaultsConfig {
    /// The defaults written out as a complete configuration file.
    pub fn to_file_config(&self) -> FileConfig {
        FileConfig {
            population: Some(self.population),
            component_library: None,
            greywater: Some(FileLoadsConfig::from(&self.greywater)),
            blackwater: Some(FileLoadsConfig::from(&self.blackwater)),
            mbr: Some(FileMbrConfig::from(&self.mbr)),
            digester: Some(FileDigesterConfig::from(&self.digester)),
            simulation: Some(FileSimulationConfig {
                route_sludge_to_digester: Some(self.route_sludge_to_digester),
                balance_tolerance: Some(self.balance_tolerance),
            }),
        }
    }
}
