use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversion factors from a named flow unit to g/hr.
static FLOW_UNIT_FACTORS: Map<&'static str, f64> = phf_map! {
    "g/hr" => 1.0,
    "g/h" => 1.0,
    "kg/hr" => 1000.0,
    "kg/h" => 1000.0,
    "mg/hr" => 1e-3,
    "mg/h" => 1e-3,
    "g/d" => 1.0 / 24.0,
    "kg/d" => 1000.0 / 24.0,
};

/// Returns the factor converting `unit` to g/hr, if the unit is known.
pub fn flow_unit_factor(unit: &str) -> Option<f64> {
    FLOW_UNIT_FACTORS.get(unit.trim()).copied()
}

/// An aggregate quantity computed from a stream's component flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Composite {
    TotalMass,
    Cod,
    Nitrogen,
    Phosphorus,
    Tss,
}

impl Composite {
    /// Quantities reported as liquid-phase concentrations.
    pub const CONCENTRATION_METRICS: [Composite; 4] = [
        Composite::Cod,
        Composite::Nitrogen,
        Composite::Phosphorus,
        Composite::Tss,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Composite::TotalMass => "F_mass",
            Composite::Cod => "COD",
            Composite::Nitrogen => "TN",
            Composite::Phosphorus => "TP",
            Composite::Tss => "TSS",
        }
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
