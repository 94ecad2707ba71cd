use crate::cli::InitConfigArgs;
use crate::config::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use tracing::info;

pub async fn run(args: InitConfigArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "'{}' already exists. Use --force to overwrite it.",
            args.output.display()
        )));
    }
    let content = default_config_toml()?;
    std::fs::write(&args.output, content)?;
    info!("Default configuration written to {:?}", args.output);
    println!("✓ Default configuration written to: {}", args.output.display());
    Ok(())
}

pub fn default_config_toml() -> Result<String> {
    let body = DefaultsConfig::default().to_file_config().to_toml()?;
    Ok(format!(
        "# SANFLOW household scenario. Flows in L/cap/d, loads in g/cap/d.\n\n{}",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::FileConfig;
    use tempfile::tempdir;

    #[test]
    fn default_config_round_trips_through_the_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sanflow.toml");
        std::fs::write(&path, default_config_toml().unwrap()).unwrap();
        let loaded = FileConfig::from_file(&path).unwrap();
        assert_eq!(loaded, DefaultsConfig::default().to_file_config());
    }

    #[tokio::test]
    async fn existing_file_is_kept_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sanflow.toml");
        std::fs::write(&path, "population = 1\n").unwrap();

        let err = run(InitConfigArgs {
            output: path.clone(),
            force: false,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "population = 1\n");

        run(InitConfigArgs {
            output: path.clone(),
            force: true,
        })
        .await
        .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[digester]"));
    }
}
