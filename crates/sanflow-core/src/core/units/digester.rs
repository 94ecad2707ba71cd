use super::error::UnitError;
use super::traits::{Arity, Kpi, UnitOperation, ensure_fraction, ensure_ports};
use crate::core::components::Phase;
use crate::core::components::library::COD_PER_CH4;
use crate::core::streams::{Composite, Stream};
use serde::{Deserialize, Serialize};
use tracing::trace;

const METHANE_ID: &str = "CH4";
const CARBON_DIOXIDE_ID: &str = "CO2";

/// Molar volume of an ideal gas at 0 °C and 1 atm, L/mol.
const NORMAL_MOLAR_VOLUME_L: f64 = 22.414;
/// Lower heating value of methane, MJ/kg.
const METHANE_LHV_MJ_KG: f64 = 50.0;
const MJ_PER_KWH: f64 = 3.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigesterParams {
    /// Fraction of biodegradable COD converted to methane.
    pub cod_removal: f64,
    /// Molar (≈ volumetric) methane fraction of the biogas.
    pub methane_fraction: f64,
    /// Components forming the biodegradable COD pool.
    pub biodegradable_ids: Vec<String>,
}

impl Default for DigesterParams {
    fn default() -> Self {
        Self {
            cod_removal: 0.60,
            methane_fraction: 0.65,
            biodegradable_ids: vec!["S_F".to_string(), "X_B_Subst".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DigesterPerformance {
    pub removed_cod: f64,
    pub ch4_g_h: f64,
    pub co2_g_h: f64,
    pub ch4_mol_h: f64,
    pub co2_mol_h: f64,
}

impl DigesterPerformance {
    /// Methane volume at normal conditions, Nm³/hr.
    pub fn ch4_nm3_h(&self) -> f64 {
        self.ch4_mol_h * NORMAL_MOLAR_VOLUME_L / 1000.0
    }

    /// Biogas (CH4 + CO2) volume at normal conditions, Nm³/hr.
    pub fn biogas_nm3_h(&self) -> f64 {
        (self.ch4_mol_h + self.co2_mol_h) * NORMAL_MOLAR_VOLUME_L / 1000.0
    }

    /// Chemical energy of the methane, kWh/hr.
    pub fn methane_energy_kwh_h(&self) -> f64 {
        self.ch4_g_h / 1000.0 * METHANE_LHV_MJ_KG / MJ_PER_KWH
    }
}

/// COD-based anaerobic digester.
///
/// One inlet; outlets are `[digestate, biogas]`. A fraction of the biodegradable
/// COD is converted to methane at 4 g COD per g CH4, and CO2 is added so that
/// the biogas reaches the target methane fraction. Nutrients and salts stay in
/// the digestate.
#[derive(Debug, Clone)]
pub struct CodAnaerobicDigester {
    id: String,
    params: DigesterParams,
    performance: DigesterPerformance,
}

impl CodAnaerobicDigester {
    pub fn new(id: &str, params: DigesterParams) -> Result<Self, UnitError> {
        ensure_fraction(id, "cod-removal", params.cod_removal)?;
        let y = params.methane_fraction;
        if !(y > 0.0 && y <= 1.0) {
            return Err(UnitError::InvalidParameter {
                unit: id.to_string(),
                name: "methane-fraction",
                value: y,
                reason: "must be within (0, 1]",
            });
        }
        Ok(Self {
            id: id.to_string(),
            params,
            performance: DigesterPerformance::default(),
        })
    }

    pub fn params(&self) -> &DigesterParams {
        &self.params
    }

    pub fn performance(&self) -> DigesterPerformance {
        self.performance
    }
}

impl UnitOperation for CodAnaerobicDigester {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "COD-based anaerobic digester"
    }

    fn inlets(&self) -> Arity {
        Arity::Exactly(1)
    }

    fn outlets(&self) -> Arity {
        Arity::Exactly(2)
    }

    fn run(&mut self, ins: &[&Stream], outs: &mut [Stream]) -> Result<(), UnitError> {
        ensure_ports(&*self, ins.len(), outs.len())?;
        let influent = ins[0];
        let components = influent.components().clone();
        for required in [METHANE_ID, CARBON_DIOXIDE_ID] {
            if !components.contains(required) {
                return Err(UnitError::MissingComponent {
                    unit: self.id.clone(),
                    component: required.to_string(),
                });
            }
        }

        let (head, tail) = outs.split_at_mut(1);
        let (digestate, biogas) = (&mut head[0], &mut tail[0]);
        digestate.copy_like(influent)?;
        biogas.empty();
        biogas.set_phase(Phase::Gas);
        biogas.set_temperature_k(influent.temperature_k());
        self.performance = DigesterPerformance::default();

        let bio_ids: Vec<&str> = self
            .params
            .biodegradable_ids
            .iter()
            .map(String::as_str)
            .filter(|cid| components.contains(cid))
            .collect();
        let bio_total = bio_ids
            .iter()
            .map(|cid| digestate.imass(cid))
            .sum::<Result<f64, _>>()?;
        if bio_total <= 0.0 {
            trace!("Digester '{}': no biodegradable COD; pass-through.", self.id);
            return Ok(());
        }

        let mut removed_cod = 0.0;
        for cid in &bio_ids {
            let d = self.params.cod_removal * digestate.imass(cid)?;
            digestate.add_imass(cid, -d)?;
            removed_cod += d;
        }
        if removed_cod <= 0.0 {
            return Ok(());
        }

        let ch4_g_h = removed_cod / COD_PER_CH4;
        biogas.set_imass(METHANE_ID, ch4_g_h)?;

        let y = self.params.methane_fraction;
        let ch4_mol_h = biogas.imol(METHANE_ID)?;
        let co2_mol_h = ch4_mol_h * (1.0 - y) / y;
        biogas.set_imol(CARBON_DIOXIDE_ID, co2_mol_h)?;

        self.performance = DigesterPerformance {
            removed_cod,
            ch4_g_h,
            co2_g_h: biogas.imass(CARBON_DIOXIDE_ID)?,
            ch4_mol_h,
            co2_mol_h,
        };
        trace!(
            "Digester '{}': removed {:.6} g COD/hr, produced {:.6} g CH4/hr",
            self.id, removed_cod, ch4_g_h
        );
        Ok(())
    }

    fn conserved(&self) -> &'static [Composite] {
        &[Composite::Cod, Composite::Nitrogen, Composite::Phosphorus]
    }

    fn kpis(&self) -> Vec<Kpi> {
        let p = &self.performance;
        vec![
            Kpi::new("removed COD", p.removed_cod, "g COD/hr"),
            Kpi::new("CH4", p.ch4_g_h, "g/hr"),
            Kpi::new("CO2", p.co2_g_h, "g/hr"),
            Kpi::new("CH4 volume", p.ch4_nm3_h(), "Nm3/hr"),
            Kpi::new("biogas volume", p.biogas_nm3_h(), "Nm3/hr"),
            Kpi::new("methane energy", p.methane_energy_kwh_h(), "kWh/hr"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::{ComponentSet, default_library, household};
    use crate::core::streams::make_blackwater;
    use std::sync::Arc;

    fn components() -> Arc<ComponentSet> {
        Arc::new(household().unwrap())
    }

    fn outlets(components: &Arc<ComponentSet>) -> Vec<Stream> {
        vec![
            Stream::new("digestate", components.clone()),
            Stream::new("biogas", components.clone()),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn new_validates_parameters() {
        for y in [0.0, -0.5, 1.5, f64::NAN] {
            let params = DigesterParams {
                methane_fraction: y,
                ..DigesterParams::default()
            };
            assert!(CodAnaerobicDigester::new("U_AD", params).is_err(), "y = {y}");
        }
        let params = DigesterParams {
            cod_removal: 2.0,
            ..DigesterParams::default()
        };
        assert!(CodAnaerobicDigester::new("U_AD", params).is_err());
    }

    #[test]
    fn removed_cod_becomes_methane_at_four_grams_per_gram() {
        let components = components();
        let bw = make_blackwater(10_000.0, components.clone()).unwrap();
        let mut ad = CodAnaerobicDigester::new("U_AD", DigesterParams::default()).unwrap();
        let mut outs = outlets(&components);
        ad.run(&[&bw], &mut outs).unwrap();

        let bio_in = bw.imass("S_F").unwrap() + bw.imass("X_B_Subst").unwrap();
        let perf = ad.performance();
        assert!(close(perf.removed_cod, 0.6 * bio_in));
        assert!(close(outs[1].imass("CH4").unwrap(), 0.6 * bio_in / 4.0));
        assert!(close(outs[0].imass("S_F").unwrap(), 0.4 * bw.imass("S_F").unwrap()));
        assert_eq!(outs[1].phase(), Phase::Gas);
    }

    #[test]
    fn biogas_reaches_target_methane_fraction() {
        let components = components();
        let bw = make_blackwater(500.0, components.clone()).unwrap();
        let mut ad = CodAnaerobicDigester::new("U_AD", DigesterParams::default()).unwrap();
        let mut outs = outlets(&components);
        ad.run(&[&bw], &mut outs).unwrap();

        let n_ch4 = outs[1].imol("CH4").unwrap();
        let n_co2 = outs[1].imol("CO2").unwrap();
        assert!(close(n_ch4 / (n_ch4 + n_co2), 0.65));
    }

    #[test]
    fn cod_nitrogen_and_phosphorus_are_conserved() {
        let components = components();
        let bw = make_blackwater(2_500.0, components.clone()).unwrap();
        let mut ad = CodAnaerobicDigester::new("U_AD", DigesterParams::default()).unwrap();
        let mut outs = outlets(&components);
        ad.run(&[&bw], &mut outs).unwrap();

        for q in ad.conserved() {
            let inflow = bw.composite(*q);
            let outflow = outs[0].composite(*q) + outs[1].composite(*q);
            assert!(close(inflow, outflow), "{q}: {inflow} vs {outflow}");
        }
        assert_eq!(outs[0].imass("S_NH4").unwrap(), bw.imass("S_NH4").unwrap());
    }

    #[test]
    fn no_biodegradable_cod_is_a_pass_through() {
        let components = components();
        let feed = Stream::from_flows(
            "salty",
            components.clone(),
            &[("H2O", 1e6), ("S_K", 10.0)],
            "g/hr",
        )
        .unwrap();
        let mut ad = CodAnaerobicDigester::new("U_AD", DigesterParams::default()).unwrap();
        let mut outs = outlets(&components);
        ad.run(&[&feed], &mut outs).unwrap();

        assert!(outs[1].is_empty());
        assert_eq!(outs[0].mass(), feed.mass());
        assert_eq!(ad.performance(), DigesterPerformance::default());
    }

    #[test]
    fn pure_methane_biogas_has_no_carbon_dioxide() {
        let components = components();
        let bw = make_blackwater(100.0, components.clone()).unwrap();
        let params = DigesterParams {
            methane_fraction: 1.0,
            ..DigesterParams::default()
        };
        let mut ad = CodAnaerobicDigester::new("U_AD", params).unwrap();
        let mut outs = outlets(&components);
        ad.run(&[&bw], &mut outs).unwrap();
        assert_eq!(outs[1].imass("CO2").unwrap(), 0.0);
    }

    #[test]
    fn missing_biogas_components_are_reported() {
        let components = Arc::new(default_library().unwrap().compile().unwrap());
        let feed = Stream::new("feed", components.clone());
        let mut ad = CodAnaerobicDigester::new("U_AD", DigesterParams::default()).unwrap();
        let mut outs = outlets(&components);
        assert!(matches!(
            ad.run(&[&feed], &mut outs),
            Err(UnitError::MissingComponent { component, .. }) if component == "CH4"
        ));
    }

    #[test]
    fn kpis_report_volumes_and_energy() {
        let perf = DigesterPerformance {
            removed_cod: 64.16,
            ch4_g_h: 16.04,
            co2_g_h: 0.0,
            ch4_mol_h: 1.0,
            co2_mol_h: 1.0,
        };
        assert!(close(perf.ch4_nm3_h(), 0.022414));
        assert!(close(perf.biogas_nm3_h(), 0.044828));
        assert!(close(perf.methane_energy_kwh_h(), 0.01604 * 50.0 / 3.6));
    }
}
