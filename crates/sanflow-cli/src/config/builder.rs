use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileLoadsConfig};
use super::models::AppConfig;
use crate::cli::{RouteSludge, ScenarioArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use sanflow::engine::config::HouseholdConfigBuilder;
use std::str::FromStr;
use tracing::debug;

/// Merges defaults, the config file, `--set` values and CLI flags, in
/// increasing order of precedence.
pub fn build_config(args: &ScenarioArgs, population: Option<f64>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_set_values(file_config, &args.set_values)?;
    debug!("Configuration after --set overrides: {:?}", file_config);

    let population = population
        .or(file_config.population)
        .unwrap_or(defaults.population);

    let sim_file = file_config.simulation.unwrap_or_default();
    let route_sludge_to_digester = merge_route_sludge(
        args.route_sludge,
        sim_file.route_sludge_to_digester,
        defaults.route_sludge_to_digester,
    );
    let balance_tolerance = sim_file
        .balance_tolerance
        .unwrap_or(defaults.balance_tolerance);

    let greywater = file_config
        .greywater
        .unwrap_or_default()
        .merge_into(defaults.greywater);
    let blackwater = file_config
        .blackwater
        .unwrap_or_default()
        .merge_into(defaults.blackwater);
    let mbr = file_config.mbr.unwrap_or_default().merge_into(defaults.mbr);
    let digester = file_config
        .digester
        .unwrap_or_default()
        .merge_into(defaults.digester);

    let household = HouseholdConfigBuilder::new()
        .population(population)
        .greywater(greywater)
        .blackwater(blackwater)
        .mbr(mbr)
        .digester(digester)
        .route_sludge_to_digester(route_sludge_to_digester)
        .balance_tolerance(balance_tolerance)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        household,
        component_library: args.library.clone().or(file_config.component_library),
    })
}

fn merge_route_sludge(cli_flags: RouteSludge, file_val: Option<bool>, default: bool) -> bool {
    match (cli_flags.route_sludge, cli_flags.no_route_sludge) {
        (true, false) => true,
        (false, true) => false,
        _ => file_val.unwrap_or(default),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "population" => config.population = Some(parse_value(key, value, "float")?),
            "component-library" => config.component_library = Some(value.into()),
            "mbr.cod-removal" => {
                config.mbr.get_or_insert_with(Default::default).cod_removal =
                    Some(parse_value(key, value, "float")?);
            }
            "mbr.solids-capture" => {
                config.mbr.get_or_insert_with(Default::default).solids_capture =
                    Some(parse_value(key, value, "float")?);
            }
            "mbr.nh4-removal" => {
                config.mbr.get_or_insert_with(Default::default).nh4_removal =
                    Some(parse_value(key, value, "float")?);
            }
            "mbr.po4-removal" => {
                config.mbr.get_or_insert_with(Default::default).po4_removal =
                    Some(parse_value(key, value, "float")?);
            }
            "digester.cod-removal" => {
                config.digester.get_or_insert_with(Default::default).cod_removal =
                    Some(parse_value(key, value, "float")?);
            }
            "digester.methane-fraction" => {
                config
                    .digester
                    .get_or_insert_with(Default::default)
                    .methane_fraction = Some(parse_value(key, value, "float")?);
            }
            "simulation.route-sludge-to-digester" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .route_sludge_to_digester = Some(parse_value(key, value, "boolean")?);
            }
            "simulation.balance-tolerance" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .balance_tolerance = Some(parse_value(key, value, "float")?);
            }
            _ => match key.split_once('.') {
                Some(("greywater", field)) => {
                    set_load_value(config.greywater.get_or_insert_with(Default::default), key, field, value)?
                }
                Some(("blackwater", field)) => {
                    set_load_value(config.blackwater.get_or_insert_with(Default::default), key, field, value)?
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }
    Ok(config)
}

fn set_load_value(loads: &mut FileLoadsConfig, key: &str, field: &str, value: &str) -> Result<()> {
    let parsed: f64 = parse_value(key, value, "float")?;
    let slot = match field {
        "flow-l-cap-d" => &mut loads.flow_l_cap_d,
        "cod-g-cap-d" => &mut loads.cod_g_cap_d,
        "particulate-cod-fraction" => &mut loads.particulate_cod_fraction,
        "nitrogen-g-cap-d" => &mut loads.nitrogen_g_cap_d,
        "phosphorus-g-cap-d" => &mut loads.phosphorus_g_cap_d,
        "potassium-g-cap-d" => &mut loads.potassium_g_cap_d,
        "sulfate-g-cap-d" => &mut loads.sulfate_g_cap_d,
        _ => match field.split_once('.') {
            Some(("micropollutants-g-cap-d", component)) if !component.is_empty() => {
                loads
                    .micropollutants_g_cap_d
                    .get_or_insert_with(Default::default)
                    .insert(component.to_string(), parsed);
                return Ok(());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        },
    };
    *slot = Some(parsed);
    Ok(())
}
