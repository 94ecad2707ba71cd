use super::component::{Component, Degradability};
use super::error::ComponentError;
use super::set::{ComponentSet, ComponentSetBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_LIBRARY_TOML: &str = include_str!("../../../data/default_components.toml");

/// Molecular weight of methane, g/mol.
pub const CH4_MOLECULAR_WEIGHT: f64 = 16.04;
/// Molecular weight of carbon dioxide, g/mol.
pub const CO2_MOLECULAR_WEIGHT: f64 = 44.01;
/// Theoretical oxygen demand of methane, g COD per g CH4.
pub const COD_PER_CH4: f64 = 4.0;

const HOUSEHOLD_TRACERS: [&str; 6] = ["S_SO4", "Diclo", "Meto", "Sulfa", "Benzo", "Iome"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LibraryFile {
    #[serde(default)]
    component: Vec<Component>,
}

fn parse_library(content: &str, origin: &str) -> Result<ComponentSetBuilder, ComponentError> {
    let file: LibraryFile = toml::from_str(content).map_err(|e| ComponentError::Toml {
        path: origin.to_string(),
        source: e,
    })?;
    let mut builder = ComponentSetBuilder::new();
    for component in file.component {
        let id = component.id.clone();
        if !builder.append(component) {
            return Err(ComponentError::Duplicate(id));
        }
    }
    Ok(builder)
}

/// The built-in default component library, uncompiled so it can be extended.
pub fn default_library() -> Result<ComponentSetBuilder, ComponentError> {
    parse_library(DEFAULT_LIBRARY_TOML, "<default library>")
}

/// Loads a component library from a TOML file of `[[component]]` tables.
pub fn load_library(path: &Path) -> Result<ComponentSetBuilder, ComponentError> {
    debug!("Loading component library from {:?}", path);
    let content = std::fs::read_to_string(path).map_err(|e| ComponentError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_library(&content, &path.to_string_lossy())
}

/// The component set used by the household treatment trains: the default
/// library plus sulfate and micropollutant tracers, and the biogas chemicals.
pub fn household() -> Result<ComponentSet, ComponentError> {
    household_builder(default_library()?).compile()
}

/// Like [`household`], but with extra components from a library file appended
/// after the default library.
pub fn household_with_library(path: &Path) -> Result<ComponentSet, ComponentError> {
    let mut builder = default_library()?;
    let added = builder.extend(load_library(path)?);
    info!("Added {} component(s) from {:?}", added, path);
    household_builder(builder).compile()
}

fn household_builder(mut builder: ComponentSetBuilder) -> ComponentSetBuilder {
    for id in HOUSEHOLD_TRACERS {
        builder.append_dissolved(id, false, Degradability::Undegradable);
    }
    builder.append(
        Component::gas_chemical("CH4", CH4_MOLECULAR_WEIGHT, true, COD_PER_CH4)
            .with_description("Methane"),
    );
    builder.append(
        Component::gas_chemical("CO2", CO2_MOLECULAR_WEIGHT, false, 0.0)
            .with_description("Carbon dioxide"),
    );
    builder
}
