use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SANFLOW CLI - Steady-state simulation of household greywater and blackwater treatment trains.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate the household system (greywater MBR and blackwater digester) for one population.
    Simulate(SimulateArgs),
    /// Simulate the household system for a list or range of populations.
    Sweep(SweepArgs),
    /// List the tracked components of the household component set.
    Components(ComponentsArgs),
    /// Write a fully populated default configuration file.
    InitConfig(InitConfigArgs),
}

/// Scenario options shared by `simulate` and `sweep`.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extend the household component set with components from a TOML library.
    #[arg(long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Override `simulation.route-sludge-to-digester` from the config file.
    #[command(flatten)]
    pub route_sludge: RouteSludge,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S mbr.cod-removal=0.9
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive boolean flags for sludge co-digestion.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct RouteSludge {
    /// Send the MBR sludge to the anaerobic digester together with the blackwater.
    #[arg(long)]
    pub route_sludge: bool,
    /// Keep the MBR sludge as a separate product.
    #[arg(long)]
    pub no_route_sludge: bool,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of people served. Overrides `population` from the config file.
    #[arg(short, long, value_name = "FLOAT")]
    pub population: Option<f64>,

    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Export every stream of the simulated system as a long-format CSV table.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Populations to simulate: a comma-separated list (e.g. '1000,5000')
    /// or a range 'START..=END:STEP' (e.g. '1000..=10000:1000').
    #[arg(long, required = true, value_name = "LIST|RANGE")]
    pub populations: String,

    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Export the sweep results as CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `components` subcommand.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Extend the household component set with components from a TOML library.
    #[arg(long, value_name = "PATH")]
    pub library: Option<PathBuf>,
}

/// Arguments for the `init-config` subcommand.
#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Where to write the configuration file.
    #[arg(default_value = "sanflow.toml", value_name = "PATH")]
    pub output: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn author_comes_from_package_metadata() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_author(), Some(env!("CARGO_PKG_AUTHORS")));
        assert!(!env!("CARGO_PKG_AUTHORS").contains("Tony Kan"));
    }
}
