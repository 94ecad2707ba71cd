use super::load_components;
use crate::cli::SweepArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use crate::utils::parser;
use sanflow::core::io::{format_sig, write_records_to_path};
use sanflow::engine::progress::ProgressReporter;
use sanflow::workflows::sweep::{self, SweepPoint};
use std::fmt::Write;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: SweepArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let populations =
        parser::parse_populations(&args.populations).map_err(|e| CliError::Argument(e.to_string()))?;
    info!("Parsed {} population(s) for the sweep.", populations.len());

    let app_config = build_config(&args.scenario, None)?;
    let components = load_components(app_config.component_library.as_deref())?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let points = tokio::task::block_in_place(|| {
        sweep::run(&app_config.household, &populations, components, &reporter)
    })?;

    println!("{}", render_table(&points));

    if let Some(path) = &args.csv {
        write_records_to_path(&points, path)?;
        info!("Sweep results written to {:?}", path);
        println!("✓ Sweep results written to: {}", path.display());
    }
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format_sig(v, 6)).unwrap_or_else(|| "-".to_string())
}

pub fn render_table(points: &[SweepPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12} {:>16} {:>12} {:>12} {:>14} {:>12} {:>14} {:>16}",
        "population",
        "eff. COD mg/L",
        "MBR COD %",
        "AD COD %",
        "sludge kg/hr",
        "CH4 g/hr",
        "biogas Nm3/hr",
        "CH4 energy kWh/hr"
    );
    for p in points {
        let _ = writeln!(
            out,
            "{:>12} {:>16} {:>12} {:>12} {:>14} {:>12} {:>14} {:>16}",
            format_sig(p.population, 6),
            cell(p.effluent_cod_mg_l),
            cell(p.mbr_cod_removal_pct),
            cell(p.ad_cod_removal_pct),
            format_sig(p.sludge_kg_h, 6),
            format_sig(p.ch4_g_h, 6),
            format_sig(p.biogas_nm3_h, 6),
            format_sig(p.methane_energy_kwh_h, 6)
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_a_header_and_one_row_per_point() {
        let points = vec![
            SweepPoint {
                population: 1000.0,
                effluent_cod_mg_l: Some(32.5),
                mbr_cod_removal_pct: Some(95.5),
                ad_cod_removal_pct: None,
                sludge_kg_h: 1.25,
                ch4_g_h: 375.0,
                biogas_nm3_h: 0.8,
                methane_energy_kwh_h: 5.2,
            };
            2
        ];
        let table = render_table(&points);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("population"));
        assert!(lines[1].contains("95.5"));
        assert!(lines[1].contains(" -"));
    }
}
