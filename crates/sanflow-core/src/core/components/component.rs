use serde::{Deserialize, Serialize};
use std::fmt;

pub const WATER_DENSITY_KG_M3: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleSize {
    DissolvedGas,
    Soluble,
    Colloidal,
    Particulate,
}

impl fmt::Display for ParticleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticleSize::DissolvedGas => "dissolved gas",
            ParticleSize::Soluble => "soluble",
            ParticleSize::Colloidal => "colloidal",
            ParticleSize::Particulate => "particulate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Degradability {
    Readily,
    Slowly,
    Undegradable,
}

impl Degradability {
    pub fn is_biodegradable(&self) -> bool {
        !matches!(self, Degradability::Undegradable)
    }
}

impl fmt::Display for Degradability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Degradability::Readily => "B",
            Degradability::Slowly => "S",
            Degradability::Undegradable => "U",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Liquid,
    Gas,
    Solid,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Liquid => "l",
            Phase::Gas => "g",
            Phase::Solid => "s",
        };
        f.write_str(s)
    }
}

/// The basis a component's mass flow is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasuredAs {
    Cod,
    N,
    P,
}

/// A tracked constituent of a stream.
///
/// Mass flows of a component are expressed on its `measured_as` basis (e.g. g COD
/// for `S_F`, g N for `S_NH4`). The `i_*` coefficients convert that mass into the
/// composite totals a stream reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub particle_size: ParticleSize,
    pub degradability: Degradability,
    pub organic: bool,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_as: Option<MeasuredAs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,
    #[serde(default)]
    pub i_cod: f64,
    #[serde(default)]
    pub i_n: f64,
    #[serde(default)]
    pub i_p: f64,
    #[serde(default = "default_density")]
    pub density: f64,
}

fn default_density() -> f64 {
    WATER_DENSITY_KG_M3
}

impl Component {
    /// A minimal dissolved component with no conversion coefficients, used to
    /// carry tracers (salts, micropollutants) through a flowsheet untouched.
    pub fn dissolved(id: &str, organic: bool, degradability: Degradability) -> Self {
        Self {
            id: id.to_string(),
            description: String::new(),
            particle_size: ParticleSize::Soluble,
            degradability,
            organic,
            phase: Phase::Liquid,
            measured_as: None,
            molecular_weight: None,
            i_cod: 0.0,
            i_n: 0.0,
            i_p: 0.0,
            density: WATER_DENSITY_KG_M3,
        }
    }

    /// A real chemical in the gas phase, e.g. `CH4` or `CO2` in biogas.
    pub fn gas_chemical(id: &str, molecular_weight: f64, organic: bool, i_cod: f64) -> Self {
        Self {
            id: id.to_string(),
            description: String::new(),
            particle_size: ParticleSize::DissolvedGas,
            degradability: Degradability::Undegradable,
            organic,
            phase: Phase::Gas,
            measured_as: None,
            molecular_weight: Some(molecular_weight),
            i_cod,
            i_n: 0.0,
            i_p: 0.0,
            density: WATER_DENSITY_KG_M3,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn is_particulate(&self) -> bool {
        self.particle_size == ParticleSize::Particulate
    }

    pub fn is_gas(&self) -> bool {
        self.phase == Phase::Gas
    }
}
