use super::load_components;
use crate::cli::SimulateArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use sanflow::core::io::{format_sig, write_stream_table_to_path};
use sanflow::engine::progress::ProgressReporter;
use sanflow::workflows::household::{self, HouseholdResult};
use std::fmt::Write;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: SimulateArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app_config = build_config(&args.scenario, args.population)?;
    let components = load_components(app_config.component_library.as_deref())?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the household workflow...");
    let config = &app_config.household;
    let result =
        tokio::task::block_in_place(|| household::run(config, components, &reporter))?;

    println!("{}", render_report(&result, config.simulation.balance_tolerance));

    if let Some(path) = &args.csv {
        write_stream_table_to_path(&result.streams(), path)?;
        info!("Stream table written to {:?}", path);
        println!("✓ Stream table written to: {}", path.display());
    }
    Ok(())
}

pub fn render_report(result: &HouseholdResult, tolerance: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Running simulation for population of {}.",
        format_sig(result.population, 6)
    );
    for summary in [&result.greywater, &result.blackwater] {
        let _ = write!(out, "\n{}\n", summary);
    }
    for summary in [
        &result.mbr_effluent,
        &result.mbr_sludge,
        &result.digestate,
        &result.biogas,
    ] {
        let _ = write!(out, "\n{}\n", summary);
    }

    for removal in &result.removals {
        let _ = write!(
            out,
            "\n[{}] {} removal: {:.2}%\n",
            removal.train, removal.metric, removal.percent
        );
    }

    let _ = writeln!(out, "\nUnit performance:");
    for unit in &result.units {
        let _ = writeln!(out, "  {} ({})", unit.id, unit.kind);
        for kpi in &unit.kpis {
            let _ = writeln!(
                out,
                "    {}: {} {}",
                kpi.name,
                format_sig(kpi.value, 6),
                kpi.unit
            );
        }
    }

    let _ = writeln!(out, "\nMass balance (relative tolerance {:e}):", tolerance);
    for check in &result.balances {
        let _ = writeln!(
            out,
            "  {} {}: in {} g/hr, out {} g/hr, rel. error {:.2e}",
            check.unit,
            check.quantity,
            format_sig(check.inflow, 6),
            format_sig(check.outflow, 6),
            check.relative_error()
        );
    }
    out.trim_end().to_string()
}
