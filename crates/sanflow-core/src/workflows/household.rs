use crate::core::components::ComponentSet;
use crate::core::io::{StreamSummary, percent_removal};
use crate::core::streams::{Composite, Stream, build_influent};
use crate::core::streams::influent::{BLACKWATER_ID, GREYWATER_ID};
use crate::core::units::{CodAnaerobicDigester, CodMbr, Kpi, Mixer};
use crate::engine::balance::BalanceCheck;
use crate::engine::config::HouseholdConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::system::System;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

pub const SYSTEM_ID: &str = "Household_System";
pub const MBR_ID: &str = "U_MBR";
pub const MIXER_ID: &str = "M_AD_FEED";
pub const DIGESTER_ID: &str = "U_AD";

pub const MBR_EFFLUENT: &str = "mbr_effluent";
pub const MBR_SLUDGE: &str = "mbr_sludge";
pub const AD_FEED: &str = "ad_feed";
pub const DIGESTATE: &str = "digestate";
pub const BIOGAS: &str = "biogas";

pub const GREYWATER_TRAIN: &str = "Greywater→MBR";
pub const BLACKWATER_TRAIN: &str = "Blackwater→AD";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub train: &'static str,
    pub metric: Composite,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub id: String,
    pub kind: &'static str,
    pub kpis: Vec<Kpi>,
}

#[derive(Debug)]
pub struct HouseholdResult {
    pub population: f64,
    pub greywater: StreamSummary,
    pub blackwater: StreamSummary,
    pub mbr_effluent: StreamSummary,
    pub mbr_sludge: StreamSummary,
    pub digestate: StreamSummary,
    pub biogas: StreamSummary,
    pub removals: Vec<Removal>,
    pub units: Vec<UnitReport>,
    pub balances: Vec<BalanceCheck>,
    /// The simulated flowsheet, for stream-level export.
    pub system: System,
}

impl HouseholdResult {
    pub fn removal(&self, train: &str, metric: Composite) -> Option<f64> {
        self.removals
            .iter()
            .find(|r| r.train == train && r.metric == metric)
            .map(|r| r.percent)
    }

    pub fn kpi(&self, unit: &str, name: &str) -> Option<f64> {
        self.units
            .iter()
            .find(|u| u.id == unit)?
            .kpis
            .iter()
            .find(|k| k.name == name)
            .map(|k| k.value)
    }

    /// Every stream of the flowsheet: feeds first, then unit outlets.
    pub fn streams(&self) -> Vec<&Stream> {
        let mut streams: Vec<&Stream> = self.system.feeds().collect();
        for name in [MBR_EFFLUENT, MBR_SLUDGE, AD_FEED, DIGESTATE, BIOGAS] {
            if let Some(stream) = self.system.stream(name) {
                streams.push(stream);
            }
        }
        streams
    }
}

/// Assembles the household flowsheet for `config`.
///
/// Greywater feeds the MBR. Blackwater feeds the digester directly, or through
/// a mixer together with the MBR sludge when sludge routing is enabled.
pub fn build_system(
    config: &HouseholdConfig,
    components: Arc<ComponentSet>,
) -> Result<System, EngineError> {
    config.validate()?;
    let mut system = System::new(SYSTEM_ID, components.clone())
        .with_balance_tolerance(config.simulation.balance_tolerance);

    system.add_feed(build_influent(
        GREYWATER_ID,
        config.population,
        &config.greywater,
        components.clone(),
    )?)?;
    system.add_feed(build_influent(
        BLACKWATER_ID,
        config.population,
        &config.blackwater,
        components,
    )?)?;

    system.add_unit(
        Box::new(CodMbr::new(MBR_ID, config.mbr.clone())?),
        &[GREYWATER_ID],
        &[MBR_EFFLUENT, MBR_SLUDGE],
    )?;

    let digester_inlet = if config.simulation.route_sludge_to_digester {
        system.add_unit(
            Box::new(Mixer::new(MIXER_ID)),
            &[BLACKWATER_ID, MBR_SLUDGE],
            &[AD_FEED],
        )?;
        AD_FEED
    } else {
        BLACKWATER_ID
    };

    system.add_unit(
        Box::new(CodAnaerobicDigester::new(DIGESTER_ID, config.digester.clone())?),
        &[digester_inlet],
        &[DIGESTATE, BIOGAS],
    )?;
    Ok(system)
}

#[instrument(skip_all, name = "household_workflow")]
pub fn run(
    config: &HouseholdConfig,
    components: Arc<ComponentSet>,
    reporter: &ProgressReporter,
) -> Result<HouseholdResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Building flowsheet",
    });
    info!(
        "Building household system for a population of {}.",
        config.population
    );
    let mut system = build_system(config, components)?;
    let greywater = summarize(&system, GREYWATER_ID, "Influent Greywater (pre-simulation)")?;
    let blackwater = summarize(&system, BLACKWATER_ID, "Influent Blackwater (pre-simulation)")?;
    reporter.report(Progress::PhaseFinish);

    system.simulate(reporter)?;

    let mbr_effluent = summarize(&system, MBR_EFFLUENT, "MBR Effluent")?;
    let mbr_sludge = summarize(&system, MBR_SLUDGE, "MBR Sludge")?;
    let digestate = summarize(&system, DIGESTATE, "AD Digestate")?;
    let biogas = summarize(&system, BIOGAS, "AD Biogas")?;

    let digester_inlet = if config.simulation.route_sludge_to_digester {
        AD_FEED
    } else {
        BLACKWATER_ID
    };
    let mut removals = train_removals(&system, GREYWATER_TRAIN, GREYWATER_ID, MBR_EFFLUENT)?;
    removals.extend(train_removals(
        &system,
        BLACKWATER_TRAIN,
        digester_inlet,
        DIGESTATE,
    )?);

    let units = system
        .units()
        .map(|u| UnitReport {
            id: u.id().to_string(),
            kind: u.kind(),
            kpis: u.kpis(),
        })
        .collect();
    let balances = system.balances().to_vec();
    info!(
        "Household simulation finished: {} balance checks passed.",
        balances.len()
    );

    Ok(HouseholdResult {
        population: config.population,
        greywater,
        blackwater,
        mbr_effluent,
        mbr_sludge,
        digestate,
        biogas,
        removals,
        units,
        balances,
        system,
    })
}

fn stream<'a>(system: &'a System, name: &str) -> Result<&'a Stream, EngineError> {
    system
        .stream(name)
        .ok_or_else(|| EngineError::Internal(format!("stream '{name}' missing from system")))
}

fn summarize(system: &System, name: &str, label: &str) -> Result<StreamSummary, EngineError> {
    Ok(StreamSummary::new(label, stream(system, name)?))
}

fn train_removals(
    system: &System,
    train: &'static str,
    influent: &str,
    effluent: &str,
) -> Result<Vec<Removal>, EngineError> {
    let (influent, effluent) = (stream(system, influent)?, stream(system, effluent)?);
    Ok(Composite::CONCENTRATION_METRICS
        .iter()
        .filter_map(|&metric| {
            percent_removal(influent, effluent, metric).map(|percent| Removal {
                train,
                metric,
                percent,
            })
        })
        .collect())
}
