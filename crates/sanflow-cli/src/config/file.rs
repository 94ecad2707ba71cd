use crate::error::{CliError, Result};
use sanflow::core::streams::PerCapitaLoads;
use sanflow::core::units::{DigesterParams, MbrParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLoadsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_l_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_g_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particulate_cod_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nitrogen_g_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phosphorus_g_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium_g_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sulfate_g_cap_d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub micropollutants_g_cap_d: Option<BTreeMap<String, f64>>,
}

impl FileLoadsConfig {
    /// Overlays the values present in this section on `base`.
    pub fn merge_into(self, mut base: PerCapitaLoads) -> PerCapitaLoads {
        let fields = [
            (self.flow_l_cap_d, &mut base.flow_l_cap_d),
            (self.cod_g_cap_d, &mut base.cod_g_cap_d),
            (self.particulate_cod_fraction, &mut base.particulate_cod_fraction),
            (self.nitrogen_g_cap_d, &mut base.nitrogen_g_cap_d),
            (self.phosphorus_g_cap_d, &mut base.phosphorus_g_cap_d),
            (self.potassium_g_cap_d, &mut base.potassium_g_cap_d),
            (self.sulfate_g_cap_d, &mut base.sulfate_g_cap_d),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(micros) = self.micropollutants_g_cap_d {
            base.micropollutants_g_cap_d.extend(micros);
        }
        base
    }
}

impl From<&PerCapitaLoads> for FileLoadsConfig {
    fn from(loads: &PerCapitaLoads) -> Self {
        Self {
            flow_l_cap_d: Some(loads.flow_l_cap_d),
            cod_g_cap_d: Some(loads.cod_g_cap_d),
            particulate_cod_fraction: Some(loads.particulate_cod_fraction),
            nitrogen_g_cap_d: Some(loads.nitrogen_g_cap_d),
            phosphorus_g_cap_d: Some(loads.phosphorus_g_cap_d),
            potassium_g_cap_d: Some(loads.potassium_g_cap_d),
            sulfate_g_cap_d: Some(loads.sulfate_g_cap_d),
            micropollutants_g_cap_d: Some(loads.micropollutants_g_cap_d.clone()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMbrConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_removal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solids_capture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nh4_removal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po4_removal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particulate_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biodegradable_ids: Option<Vec<String>>,
}

impl FileMbrConfig {
    pub fn merge_into(self, base: MbrParams) -> MbrParams {
        MbrParams {
            cod_removal: self.cod_removal.unwrap_or(base.cod_removal),
            solids_capture: self.solids_capture.unwrap_or(base.solids_capture),
            nh4_removal: self.nh4_removal.unwrap_or(base.nh4_removal),
            po4_removal: self.po4_removal.unwrap_or(base.po4_removal),
            particulate_ids: self.particulate_ids.unwrap_or(base.particulate_ids),
            biodegradable_ids: self.biodegradable_ids.unwrap_or(base.biodegradable_ids),
        }
    }
}

impl From<&MbrParams> for FileMbrConfig {
    fn from(p: &MbrParams) -> Self {
        Self {
            cod_removal: Some(p.cod_removal),
            solids_capture: Some(p.solids_capture),
            nh4_removal: Some(p.nh4_removal),
            po4_removal: Some(p.po4_removal),
            particulate_ids: Some(p.particulate_ids.clone()),
            biodegradable_ids: Some(p.biodegradable_ids.clone()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileDigesterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_removal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methane_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biodegradable_ids: Option<Vec<String>>,
}

impl FileDigesterConfig {
    pub fn merge_into(self, base: DigesterParams) -> DigesterParams {
        DigesterParams {
            cod_removal: self.cod_removal.unwrap_or(base.cod_removal),
            methane_fraction: self.methane_fraction.unwrap_or(base.methane_fraction),
            biodegradable_ids: self.biodegradable_ids.unwrap_or(base.biodegradable_ids),
        }
    }
}

impl From<&DigesterParams> for FileDigesterConfig {
    fn from(p: &DigesterParams) -> Self {
        Self {
            cod_removal: Some(p.cod_removal),
            methane_fraction: Some(p.methane_fraction),
            biodegradable_ids: Some(p.biodegradable_ids.clone()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_sludge_to_digester: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_tolerance: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_library: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greywater: Option<FileLoadsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blackwater: Option<FileLoadsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbr: Option<FileMbrConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digester: Option<FileDigesterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<FileSimulationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        // A relative library path is taken relative to the config file.
        if let (Some(lib), Some(dir)) = (config.component_library.as_mut(), path.parent()) {
            if lib.is_relative() {
                *lib = dir.join(&*lib);
            }
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize configuration: {}", e)))
    }
}
