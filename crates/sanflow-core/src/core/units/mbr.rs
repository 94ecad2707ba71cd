use super::error::UnitError;
use super::traits::{Arity, Kpi, UnitOperation, ensure_fraction, ensure_ports};
use crate::core::components::Phase;
use crate::core::streams::{Composite, Stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Sludge component that receives biologically removed COD.
const SLUDGE_BIOMASS_ID: &str = "X_B_Subst";
const AMMONIUM_ID: &str = "S_NH4";
const PHOSPHATE_ID: &str = "S_PO4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbrParams {
    /// Fraction of biodegradable COD removed biologically.
    pub cod_removal: f64,
    /// Fraction of each particulate component retained by the membrane.
    pub solids_capture: f64,
    pub nh4_removal: f64,
    pub po4_removal: f64,
    /// Components treated as solids for membrane capture.
    pub particulate_ids: Vec<String>,
    /// Components forming the biodegradable COD pool.
    pub biodegradable_ids: Vec<String>,
}

impl Default for MbrParams {
    fn default() -> Self {
        Self {
            cod_removal: 0.85,
            solids_capture: 0.995,
            nh4_removal: 0.0,
            po4_removal: 0.0,
            particulate_ids: vec!["X_B_Subst".to_string()],
            biodegradable_ids: vec!["S_F".to_string(), "X_B_Subst".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MbrPerformance {
    pub removed_cod: f64,
    pub captured_solids: f64,
    pub nh4_removed: f64,
    pub po4_removed: f64,
}

/// COD-based membrane bioreactor surrogate.
///
/// One inlet; outlets are `[effluent, sludge]`. A fraction of the biodegradable
/// COD is removed from the liquid and booked into the sludge as biomass, optional
/// ammonium and phosphate fractions are moved to the sludge, and the membrane
/// retains a fraction of every particulate component.
#[derive(Debug, Clone)]
pub struct CodMbr {
    id: String,
    params: MbrParams,
    performance: MbrPerformance,
}

impl CodMbr {
    pub fn new(id: &str, params: MbrParams) -> Result<Self, UnitError> {
        ensure_fraction(id, "cod-removal", params.cod_removal)?;
        ensure_fraction(id, "solids-capture", params.solids_capture)?;
        ensure_fraction(id, "nh4-removal", params.nh4_removal)?;
        ensure_fraction(id, "po4-removal", params.po4_removal)?;
        Ok(Self {
            id: id.to_string(),
            params,
            performance: MbrPerformance::default(),
        })
    }

    pub fn params(&self) -> &MbrParams {
        &self.params
    }

    pub fn performance(&self) -> MbrPerformance {
        self.performance
    }
}

impl UnitOperation for CodMbr {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "COD-based MBR"
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
        let (head, tail) = outs.split_at_mut(1);
        let (effluent, sludge) = (&mut head[0], &mut tail[0]);

        effluent.copy_like(influent)?;
        sludge.empty();
        sludge.set_phase(Phase::Liquid);
        sludge.set_temperature_k(influent.temperature_k());

        let components = influent.components().clone();
        let mut perf = MbrPerformance::default();

        // 1) Biological COD removal, proportional over the biodegradable pool.
        let bio_ids: Vec<&str> = self
            .params
            .biodegradable_ids
            .iter()
            .map(String::as_str)
            .filter(|cid| components.contains(cid))
            .collect();
        let bio_total = bio_ids
            .iter()
            .map(|cid| effluent.imass(cid))
            .sum::<Result<f64, _>>()?;

        if bio_total > 0.0 && self.params.cod_removal > 0.0 {
            let sink = components
                .contains(SLUDGE_BIOMASS_ID)
                .then_some(SLUDGE_BIOMASS_ID);
            for cid in &bio_ids {
                // removed * (m / bio_total) reduces to cod_removal * m.
                let d = self.params.cod_removal * effluent.imass(cid)?;
                effluent.add_imass(cid, -d)?;
                sludge.add_imass(sink.unwrap_or(*cid), d)?;
                perf.removed_cod += d;
            }
            trace!(
                "MBR '{}': removed {:.6} of {:.6} g COD/hr",
                self.id, perf.removed_cod, bio_total
            );
        }

        // 2) Optional nutrient removals.
        if self.params.nh4_removal > 0.0 && components.contains(AMMONIUM_ID) {
            let d = self.params.nh4_removal * effluent.imass(AMMONIUM_ID)?;
            effluent.transfer_to(sludge, AMMONIUM_ID, d)?;
            perf.nh4_removed = d;
        }
        if self.params.po4_removal > 0.0 && components.contains(PHOSPHATE_ID) {
            let d = self.params.po4_removal * effluent.imass(PHOSPHATE_ID)?;
            effluent.transfer_to(sludge, PHOSPHATE_ID, d)?;
            perf.po4_removed = d;
        }

        // 3) Membrane solids capture.
        for cid in &self.params.particulate_ids {
            if !components.contains(cid) {
                debug!("MBR '{}': particulate '{}' not in component set; skipped.", self.id, cid);
                continue;
            }
            let captured = self.params.solids_capture * effluent.imass(cid)?;
            effluent.transfer_to(sludge, cid, captured)?;
            perf.captured_solids += captured;
        }

        self.performance = perf;
        Ok(())
    }

    fn conserved(&self) -> &'static [Composite] {
        &[
            Composite::TotalMass,
            Composite::Cod,
            Composite::Nitrogen,
            Composite::Phosphorus,
        ]
    }

    fn kpis(&self) -> Vec<Kpi> {
        let p = &self.performance;
        vec![
            Kpi::new("removed COD", p.removed_cod, "g COD/hr"),
            Kpi::new("captured solids", p.captured_solids, "g/hr"),
            Kpi::new("NH4 removed", p.nh4_removed, "g N/hr"),
            Kpi::new("PO4 removed", p.po4_removed, "g P/hr"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::{ComponentSet, household};
    use crate::core::streams::make_greywater;
    use std::sync::Arc;

    fn setup() -> (Arc<ComponentSet>, Stream) {
        let components = Arc::new(household().unwrap());
        let gw = make_greywater(10_000.0, components.clone()).unwrap();
        (components, gw)
    }

    fn outlets(components: &Arc<ComponentSet>) -> Vec<Stream> {
        vec![
            Stream::new("mbr_effluent", components.clone()),
            Stream::new("mbr_sludge", components.clone()),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn new_rejects_fractions_outside_unit_interval() {
        let params = MbrParams {
            solids_capture: 1.5,
            ..MbrParams::default()
        };
        let err = CodMbr::new("U_MBR", params).unwrap_err();
        assert!(matches!(
            err,
            UnitError::InvalidParameter {
                name: "solids-capture",
                ..
            }
        ));
    }

    #[test]
    fn run_splits_cod_and_solids_as_configured() {
        let (components, gw) = setup();
        let params = MbrParams {
            nh4_removal: 0.2,
            ..MbrParams::default()
        };
        let mut mbr = CodMbr::new("U_MBR", params).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&gw], &mut outs).unwrap();

        let x_in = gw.imass("X_B_Subst").unwrap();
        let s_in = gw.imass("S_F").unwrap();
        let nh4_in = gw.imass("S_NH4").unwrap();
        let (eff, sludge) = (&outs[0], &outs[1]);

        assert!(close(eff.imass("S_F").unwrap(), 0.15 * s_in));
        assert!(close(eff.imass("X_B_Subst").unwrap(), 0.15 * x_in * 0.005));
        assert!(close(eff.imass("S_NH4").unwrap(), 0.8 * nh4_in));
        assert!(close(sludge.imass("S_NH4").unwrap(), 0.2 * nh4_in));
        // Removed COD plus captured particulate COD ends up as sludge X_B_Subst.
        let expected_sludge_x = 0.85 * (x_in + s_in) + 0.995 * 0.15 * x_in;
        assert!(close(sludge.imass("X_B_Subst").unwrap(), expected_sludge_x));
        assert_eq!(sludge.imass("S_F").unwrap(), 0.0);
        assert_eq!(sludge.imass("H2O").unwrap(), 0.0);

        let perf = mbr.performance();
        assert!(close(perf.removed_cod, 0.85 * (x_in + s_in)));
        assert!(close(perf.nh4_removed, 0.2 * nh4_in));
        assert_eq!(perf.po4_removed, 0.0);
    }

    #[test]
    fn run_conserves_declared_composites() {
        let (components, gw) = setup();
        let params = MbrParams {
            nh4_removal: 0.3,
            po4_removal: 0.4,
            ..MbrParams::default()
        };
        let mut mbr = CodMbr::new("U_MBR", params).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&gw], &mut outs).unwrap();

        for q in mbr.conserved() {
            let inflow = gw.composite(*q);
            let outflow = outs[0].composite(*q) + outs[1].composite(*q);
            assert!(close(inflow, outflow), "{q}: {inflow} vs {outflow}");
        }
    }

    #[test]
    fn micropollutants_pass_through_to_effluent() {
        let (components, gw) = setup();
        let mut mbr = CodMbr::new("U_MBR", MbrParams::default()).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&gw], &mut outs).unwrap();
        assert_eq!(outs[0].imass("Benzo").unwrap(), gw.imass("Benzo").unwrap());
        assert_eq!(outs[1].imass("Benzo").unwrap(), 0.0);
    }

    #[test]
    fn full_removal_leaves_no_negative_flows() {
        let (components, gw) = setup();
        let params = MbrParams {
            cod_removal: 1.0,
            solids_capture: 1.0,
            nh4_removal: 1.0,
            po4_removal: 1.0,
            ..MbrParams::default()
        };
        let mut mbr = CodMbr::new("U_MBR", params).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&gw], &mut outs).unwrap();
        assert_eq!(outs[0].imass("S_F").unwrap(), 0.0);
        assert_eq!(outs[0].imass("X_B_Subst").unwrap(), 0.0);
        assert!(outs[0].mass().iter().all(|m| *m >= 0.0));
    }

    #[test]
    fn run_rejects_wrong_port_count() {
        let (components, gw) = setup();
        let mut mbr = CodMbr::new("U_MBR", MbrParams::default()).unwrap();
        let mut outs = vec![Stream::new("only", components)];
        assert!(matches!(
            mbr.run(&[&gw], &mut outs),
            Err(UnitError::PortCount { .. })
        ));
    }

    #[test]
    fn unknown_particulate_ids_are_ignored() {
        let (components, gw) = setup();
        let params = MbrParams {
            particulate_ids: vec!["X_Not_There".to_string()],
            ..MbrParams::default()
        };
        let mut mbr = CodMbr::new("U_MBR", params).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&gw], &mut outs).unwrap();
        assert_eq!(mbr.performance().captured_solids, 0.0);
    }

    #[test]
    fn removed_cod_stays_on_its_own_id_without_biomass_component() {
        use crate::core::components::{ComponentSetBuilder, default_library};

        let kept: Vec<_> = default_library()
            .unwrap()
            .compile()
            .unwrap()
            .iter()
            .filter(|c| c.id != "X_B_Subst")
            .cloned()
            .collect();
        let components = Arc::new(ComponentSetBuilder::from_components(kept).compile().unwrap());
        assert!(!components.contains("X_B_Subst"));

        let influent = Stream::from_flows(
            "Greywater",
            components.clone(),
            &[("S_F", 400.0), ("S_NH4", 40.0), ("H2O", 1.0e6)],
            "g/hr",
        )
        .unwrap();
        let mut mbr = CodMbr::new("U_MBR", MbrParams::default()).unwrap();
        let mut outs = outlets(&components);
        mbr.run(&[&influent], &mut outs).unwrap();

        assert!(close(outs[1].imass("S_F").unwrap(), 0.85 * 400.0));
        assert!(close(outs[0].imass("S_F").unwrap(), 0.15 * 400.0));
        assert!(close(mbr.performance().removed_cod, 340.0));
        assert_eq!(mbr.performance().captured_solids, 0.0);
        for q in mbr.conserved() {
            let inflow = influent.composite(*q);
            let outflow = outs[0].composite(*q) + outs[1].composite(*q);
            assert!(close(inflow, outflow), "{q}: {inflow} vs {outflow}");
        }
        assert!(close(influent.composite(Composite::Cod), 400.0));
    }
}
