use super::balance::DEFAULT_BALANCE_TOLERANCE;
use crate::core::streams::PerCapitaLoads;
use crate::core::units::{DigesterParams, MbrParams};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Co-digest the MBR sludge with the blackwater.
    pub route_sludge_to_digester: bool,
    /// Relative tolerance of the per-unit mass balance checks.
    pub balance_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            route_sludge_to_digester: false,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdConfig {
    pub population: f64,
    pub greywater: PerCapitaLoads,
    pub blackwater: PerCapitaLoads,
    pub mbr: MbrParams,
    pub digester: DigesterParams,
    pub simulation: SimulationConfig,
}

impl HouseholdConfig {
    /// MBR settings of the household train: the unit defaults plus 20 %
    /// ammonium uptake into the sludge.
    pub fn household_mbr() -> MbrParams {
        MbrParams {
            nh4_removal: 0.2,
            ..MbrParams::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.population.is_finite() || self.population <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "population",
                reason: format!("must be a positive number, got {}", self.population),
            });
        }
        for (name, loads) in [("greywater", &self.greywater), ("blackwater", &self.blackwater)] {
            loads
                .validate()
                .map_err(|e| ConfigError::InvalidParameter {
                    name,
                    reason: e.to_string(),
                })?;
        }
        let fractions = [
            ("mbr.cod-removal", self.mbr.cod_removal),
            ("mbr.solids-capture", self.mbr.solids_capture),
            ("mbr.nh4-removal", self.mbr.nh4_removal),
            ("mbr.po4-removal", self.mbr.po4_removal),
            ("digester.cod-removal", self.digester.cod_removal),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be within [0, 1], got {value}"),
                });
            }
        }
        let y = self.digester.methane_fraction;
        if !(y > 0.0 && y <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "digester.methane-fraction",
                reason: format!("must be within (0, 1], got {y}"),
            });
        }
        let tol = self.simulation.balance_tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "balance_tolerance",
                reason: format!("must be a positive number, got {tol}"),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct HouseholdConfigBuilder {
    population: Option<f64>,
    greywater: Option<PerCapitaLoads>,
    blackwater: Option<PerCapitaLoads>,
    mbr: Option<MbrParams>,
    digester: Option<DigesterParams>,
    route_sludge_to_digester: Option<bool>,
    balance_tolerance: Option<f64>,
}

impl HouseholdConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn population(mut self, population: f64) -> Self {
        self.population = Some(population);
        self
    }
    pub fn greywater(mut self, loads: PerCapitaLoads) -> Self {
        self.greywater = Some(loads);
        self
    }
    pub fn blackwater(mut self, loads: PerCapitaLoads) -> Self {
        self.blackwater = Some(loads);
        self
    }
    pub fn mbr(mut self, params: MbrParams) -> Self {
        self.mbr = Some(params);
        self
    }
    pub fn digester(mut self, params: DigesterParams) -> Self {
        self.digester = Some(params);
        self
    }
    pub fn route_sludge_to_digester(mut self, route: bool) -> Self {
        self.route_sludge_to_digester = Some(route);
        self
    }
    pub fn balance_tolerance(mut self, tolerance: f64) -> Self {
        self.balance_tolerance = Some(tolerance);
        self
    }

    /// Builds the configuration. Only the population is required; everything
    /// else falls back to the household defaults.
    pub fn build(self) -> Result<HouseholdConfig, ConfigError> {
        let defaults = SimulationConfig::default();
        let config = HouseholdConfig {
            population: self
                .population
                .ok_or(ConfigError::MissingParameter("population"))?,
            greywater: self.greywater.unwrap_or_else(PerCapitaLoads::greywater),
            blackwater: self.blackwater.unwrap_or_else(PerCapitaLoads::blackwater),
            mbr: self.mbr.unwrap_or_else(HouseholdConfig::household_mbr),
            digester: self.digester.unwrap_or_default(),
            simulation: SimulationConfig {
                route_sludge_to_digester: self
                    .route_sludge_to_digester
                    .unwrap_or(defaults.route_sludge_to_digester),
                balance_tolerance: self.balance_tolerance.unwrap_or(defaults.balance_tolerance),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_population() {
        assert_eq!(
            HouseholdConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("population")
        );
    }

    #[test]
    fn build_fills_household_defaults() {
        let config = HouseholdConfigBuilder::new()
            .population(10_000.0)
            .build()
            .unwrap();
        assert_eq!(config.greywater, PerCapitaLoads::greywater());
        assert_eq!(config.blackwater, PerCapitaLoads::blackwater());
        assert_eq!(config.mbr.nh4_removal, 0.2);
        assert_eq!(config.mbr.cod_removal, 0.85);
        assert_eq!(config.digester, DigesterParams::default());
        assert!(!config.simulation.route_sludge_to_digester);
        assert_eq!(config.simulation.balance_tolerance, DEFAULT_BALANCE_TOLERANCE);
    }

    #[test]
    fn build_rejects_invalid_values() {
        let err = HouseholdConfigBuilder::new()
            .population(-5.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "population", .. }));

        let mut loads = PerCapitaLoads::greywater();
        loads.cod_g_cap_d = f64::NAN;
        let err = HouseholdConfigBuilder::new()
            .population(10.0)
            .greywater(loads)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "greywater", .. }));

        let err = HouseholdConfigBuilder::new()
            .population(10.0)
            .balance_tolerance(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { name: "balance_tolerance", .. }
        ));
    }

    fn mbr_error(params: MbrParams) -> ConfigError {
        HouseholdConfigBuilder::new()
            .population(10.0)
            .mbr(params)
            .build()
            .unwrap_err()
    }

    fn digester_error(params: DigesterParams) -> ConfigError {
        HouseholdConfigBuilder::new()
            .population(10.0)
            .digester(params)
            .build()
            .unwrap_err()
    }

    #[test]
    fn build_rejects_out_of_range_mbr_fractions() {
        let base = HouseholdConfig::household_mbr();
        let cases = [
            ("mbr.cod-removal", MbrParams { cod_removal: 1.5, ..base.clone() }),
            ("mbr.solids-capture", MbrParams { solids_capture: -0.1, ..base.clone() }),
            ("mbr.nh4-removal", MbrParams { nh4_removal: f64::NAN, ..base.clone() }),
            ("mbr.po4-removal", MbrParams { po4_removal: 2.0, ..base.clone() }),
        ];
        for (field, params) in cases {
            let err = mbr_error(params);
            assert!(
                matches!(err, ConfigError::InvalidParameter { name, .. } if name == field),
                "{field}: {err:?}"
            );
        }
    }

    #[test]
    fn build_rejects_out_of_range_digester_parameters() {
        let err = digester_error(DigesterParams {
            cod_removal: 1.01,
            ..DigesterParams::default()
        });
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { name: "digester.cod-removal", .. }
        ));

        for y in [0.0, -0.5, 1.2] {
            let err = digester_error(DigesterParams {
                methane_fraction: y,
                ..DigesterParams::default()
            });
            assert!(matches!(
                err,
                ConfigError::InvalidParameter { name: "digester.methane-fraction", .. }
            ));
        }
    }

    #[test]
    fn boundary_fractions_are_accepted() {
        let config = HouseholdConfigBuilder::new()
            .population(10.0)
            .mbr(MbrParams {
                cod_removal: 1.0,
                solids_capture: 0.0,
                ..HouseholdConfig::household_mbr()
            })
            .digester(DigesterParams {
                methane_fraction: 1.0,
                ..DigesterParams::default()
            })
            .build();
        assert!(config.is_ok());
    }
}
