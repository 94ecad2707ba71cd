use super::error::StreamError;
use super::stream::Stream;
use crate::core::components::ComponentSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const GREYWATER_ID: &str = "Greywater";
pub const BLACKWATER_ID: &str = "Blackwater";

const HOURS_PER_DAY: f64 = 24.0;
const GRAMS_PER_M3_WATER: f64 = 1e6;

/// Per-capita daily loads of a household wastewater stream.
///
/// Flow is in L/cap/d, every other load in g/cap/d. Total COD is split into a
/// particulate (`X_B_Subst`) and a soluble (`S_F`) fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCapitaLoads {
    pub flow_l_cap_d: f64,
    pub cod_g_cap_d: f64,
    pub particulate_cod_fraction: f64,
    pub nitrogen_g_cap_d: f64,
    pub phosphorus_g_cap_d: f64,
    pub potassium_g_cap_d: f64,
    pub sulfate_g_cap_d: f64,
    /// Micropollutant loads keyed by component id.
    pub micropollutants_g_cap_d: BTreeMap<String, f64>,
}

impl PerCapitaLoads {
    pub fn greywater() -> Self {
        Self {
            flow_l_cap_d: 65.0,
            cod_g_cap_d: 47.0,
            particulate_cod_fraction: 0.7,
            nitrogen_g_cap_d: 1.0,
            phosphorus_g_cap_d: 0.5,
            potassium_g_cap_d: 1.0,
            sulfate_g_cap_d: 2.9,
            micropollutants_g_cap_d: micropollutants(&[
                ("Diclo", 0.000068),
                ("Meto", 0.000068),
                ("Sulfa", 0.0000008228),
                ("Benzo", 0.001088),
                ("Iome", 0.0),
            ]),
        }
    }

    /// Toilet wastewater (faeces, urine and flush water) from conventional
    /// low-flush toilets.
    pub fn blackwater() -> Self {
        Self {
            flow_l_cap_d: 30.0,
            cod_g_cap_d: 60.0,
            particulate_cod_fraction: 0.6,
            nitrogen_g_cap_d: 11.0,
            phosphorus_g_cap_d: 1.5,
            potassium_g_cap_d: 3.0,
            sulfate_g_cap_d: 1.0,
            micropollutants_g_cap_d: micropollutants(&[
                ("Diclo", 0.0004),
                ("Meto", 0.0025),
                ("Sulfa", 0.0002),
                ("Benzo", 0.0),
                ("Iome", 0.0),
            ]),
        }
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        let scalars = [
            ("flow-l-cap-d", self.flow_l_cap_d),
            ("cod-g-cap-d", self.cod_g_cap_d),
            ("nitrogen-g-cap-d", self.nitrogen_g_cap_d),
            ("phosphorus-g-cap-d", self.phosphorus_g_cap_d),
            ("potassium-g-cap-d", self.potassium_g_cap_d),
            ("sulfate-g-cap-d", self.sulfate_g_cap_d),
        ];
        let micros = self
            .micropollutants_g_cap_d
            .iter()
            .map(|(id, v)| (id.as_str(), *v));
        for (name, value) in scalars.into_iter().chain(micros) {
            if !value.is_finite() || value < 0.0 {
                return Err(StreamError::InvalidLoad {
                    name: name.to_string(),
                    value,
                });
            }
        }
        let f = self.particulate_cod_fraction;
        if !(0.0..=1.0).contains(&f) {
            return Err(StreamError::InvalidLoad {
                name: "particulate-cod-fraction".to_string(),
                value: f,
            });
        }
        Ok(())
    }
}

fn micropollutants(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Builds an influent stream for `population` people from per-capita loads.
///
/// All flows are in g/hr, water included.
pub fn build_influent(
    id: &str,
    population: f64,
    loads: &PerCapitaLoads,
    components: Arc<ComponentSet>,
) -> Result<Stream, StreamError> {
    if !population.is_finite() || population <= 0.0 {
        return Err(StreamError::InvalidPopulation(population));
    }
    loads.validate()?;

    let g_per_hr = |g_cap_d: f64| population * g_cap_d / HOURS_PER_DAY;

    let flow_m3_h = population * loads.flow_l_cap_d / 1000.0 / HOURS_PER_DAY;
    let cod = g_per_hr(loads.cod_g_cap_d);

    let mut flows: Vec<(&str, f64)> = vec![
        ("X_B_Subst", loads.particulate_cod_fraction * cod),
        ("S_F", (1.0 - loads.particulate_cod_fraction) * cod),
        ("S_NH4", g_per_hr(loads.nitrogen_g_cap_d)),
        ("S_PO4", g_per_hr(loads.phosphorus_g_cap_d)),
        ("S_K", g_per_hr(loads.potassium_g_cap_d)),
        ("S_SO4", g_per_hr(loads.sulfate_g_cap_d)),
        ("H2O", flow_m3_h * GRAMS_PER_M3_WATER),
    ];
    flows.extend(
        loads
            .micropollutants_g_cap_d
            .iter()
            .map(|(cid, load)| (cid.as_str(), g_per_hr(*load))),
    );

    debug!(
        "Building influent '{}' for population {}: {:.4} m3/hr, {:.4} g COD/hr",
        id, population, flow_m3_h, cod
    );
    Stream::from_flows(id, components, &flows, "g/hr")
}

pub fn make_greywater(
    population: f64,
    components: Arc<ComponentSet>,
) -> Result<Stream, StreamError> {
    build_influent(GREYWATER_ID, population, &PerCapitaLoads::greywater(), components)
}

pub fn make_blackwater(
    population: f64,
    components: Arc<ComponentSet>,
) -> Result<Stream, StreamError> {
    build_influent(BLACKWATER_ID, population, &PerCapitaLoads::blackwater(), components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::household;
    use crate::core::streams::Composite;

    fn components() -> Arc<ComponentSet> {
        Arc::new(household().unwrap())
    }

    #[test]
    fn greywater_for_ten_thousand_people_matches_per_capita_loads() {
        let gw = make_greywater(10_000.0, components()).unwrap();
        let cod = 10_000.0 * 47.0 / 24.0;
        assert_eq!(gw.id(), GREYWATER_ID);
        assert!((gw.imass("X_B_Subst").unwrap() - 0.7 * cod).abs() < 1e-9);
        assert!((gw.imass("S_F").unwrap() - 0.3 * cod).abs() < 1e-9);
        assert!((gw.composite(Composite::Cod) - cod).abs() < 1e-9);
        assert!((gw.imass("S_NH4").unwrap() - 10_000.0 / 24.0).abs() < 1e-9);
        assert!((gw.imass("S_SO4").unwrap() - 10_000.0 * 2.9 / 24.0).abs() < 1e-9);
        assert!((gw.imass("H2O").unwrap() - 650.0 / 24.0 * 1e6).abs() < 1e-3);
        assert_eq!(gw.imass("Iome").unwrap(), 0.0);
    }

    #[test]
    fn influent_flows_scale_linearly_with_population() {
        let small = make_blackwater(100.0, components()).unwrap();
        let large = make_blackwater(1000.0, components()).unwrap();
        for ((_, a), (_, b)) in small.flows().zip(large.flows()) {
            assert!((b - 10.0 * a).abs() <= 1e-9 * b.abs().max(1.0));
        }
    }

    #[test]
    fn greywater_cod_concentration_is_plausible() {
        let gw = make_greywater(10_000.0, components()).unwrap();
        // 47 g in 65 L is roughly 720 mg/L.
        let cod = gw.cod().unwrap();
        assert!(cod > 700.0 && cod < 730.0, "COD was {cod}");
    }

    #[test]
    fn non_positive_population_is_rejected() {
        assert_eq!(
            make_greywater(0.0, components()).unwrap_err(),
            StreamError::InvalidPopulation(0.0)
        );
        assert!(make_greywater(f64::INFINITY, components()).is_err());
    }

    #[test]
    fn invalid_loads_are_rejected() {
        let mut loads = PerCapitaLoads::greywater();
        loads.particulate_cod_fraction = 1.2;
        assert!(matches!(
            build_influent("x", 10.0, &loads, components()),
            Err(StreamError::InvalidLoad { .. })
        ));

        let mut loads = PerCapitaLoads::greywater();
        loads.micropollutants_g_cap_d.insert("Diclo".into(), -1.0);
        assert!(matches!(
            loads.validate(),
            Err(StreamError::InvalidLoad { name, .. }) if name == "Diclo"
        ));
    }

    #[test]
    fn unknown_micropollutant_is_an_error() {
        let mut loads = PerCapitaLoads::greywater();
        loads.micropollutants_g_cap_d.insert("Carba".into(), 0.001);
        assert!(matches!(
            build_influent("x", 10.0, &loads, components()),
            Err(StreamError::UnknownComponent { .. })
        ));
    }
}
