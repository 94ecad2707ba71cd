use super::household::{self, BLACKWATER_TRAIN, DIGESTER_ID, GREYWATER_TRAIN};
use crate::core::components::ComponentSet;
use crate::core::streams::Composite;
use crate::engine::config::HouseholdConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Headline results of one household simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub population: f64,
    pub effluent_cod_mg_l: Option<f64>,
    pub mbr_cod_removal_pct: Option<f64>,
    pub ad_cod_removal_pct: Option<f64>,
    pub sludge_kg_h: f64,
    pub ch4_g_h: f64,
    pub biogas_nm3_h: f64,
    pub methane_energy_kwh_h: f64,
}

/// Runs the household workflow once per population, in parallel.
///
/// Points are returned in the order of `populations`. The first failing
/// population aborts the sweep.
#[instrument(skip_all, name = "sweep_workflow")]
pub fn run(
    base: &HouseholdConfig,
    populations: &[f64],
    components: Arc<ComponentSet>,
    reporter: &ProgressReporter,
) -> Result<Vec<SweepPoint>, EngineError> {
    if populations.is_empty() {
        return Err(EngineError::Initialization(
            "population sweep needs at least one population".to_string(),
        ));
    }
    info!("Sweeping {} populations.", populations.len());
    reporter.report(Progress::PhaseStart {
        name: "Population sweep",
    });
    reporter.report(Progress::TaskStart {
        total_steps: populations.len() as u64,
    });

    let silent = ProgressReporter::new();
    let points = populations
        .par_iter()
        .map(|&population| {
            let config = HouseholdConfig {
                population,
                ..base.clone()
            };
            let result = household::run(&config, components.clone(), &silent)?;
            reporter.report(Progress::TaskIncrement);
            Ok(SweepPoint {
                population,
                effluent_cod_mg_l: result.mbr_effluent.concentration(Composite::Cod),
                mbr_cod_removal_pct: result.removal(GREYWATER_TRAIN, Composite::Cod),
                ad_cod_removal_pct: result.removal(BLACKWATER_TRAIN, Composite::Cod),
                sludge_kg_h: result.mbr_sludge.total_mass_kg_h,
                ch4_g_h: result.kpi(DIGESTER_ID, "CH4").unwrap_or(0.0),
                biogas_nm3_h: result.kpi(DIGESTER_ID, "biogas volume").unwrap_or(0.0),
                methane_energy_kwh_h: result.kpi(DIGESTER_ID, "methane energy").unwrap_or(0.0),
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(points)
}
