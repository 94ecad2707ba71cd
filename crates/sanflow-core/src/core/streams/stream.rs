use super::composite::{Composite, flow_unit_factor};
use super::error::StreamError;
use crate::core::components::{ComponentSet, Phase};
use nalgebra::DVector;
use std::sync::Arc;

pub const STANDARD_TEMPERATURE_K: f64 = 298.15;

/// A material flow: one mass flow (g/hr) per component of a shared set.
///
/// Streams are the only carriers of material between unit operations. Every
/// mutation keeps the flow vector finite and non-negative.
#[derive(Debug, Clone)]
pub struct Stream {
    id: String,
    phase: Phase,
    components: Arc<ComponentSet>,
    mass: DVector<f64>,
    temperature_k: f64,
}

impl Stream {
    /// Creates an empty liquid stream.
    pub fn new(id: &str, components: Arc<ComponentSet>) -> Self {
        let n = components.len();
        Self {
            id: id.to_string(),
            phase: Phase::Liquid,
            components,
            mass: DVector::zeros(n),
            temperature_k: STANDARD_TEMPERATURE_K,
        }
    }

    /// Creates a liquid stream from `(component, flow)` pairs given in `flow_unit`
    /// (e.g. `"g/hr"`, `"kg/d"`).
    pub fn from_flows(
        id: &str,
        components: Arc<ComponentSet>,
        flows: &[(&str, f64)],
        flow_unit: &str,
    ) -> Result<Self, StreamError> {
        let factor = flow_unit_factor(flow_unit)
            .ok_or_else(|| StreamError::UnknownFlowUnit(flow_unit.to_string()))?;
        let mut stream = Self::new(id, components);
        for (component, value) in flows {
            stream.add_imass(component, value * factor)?;
        }
        Ok(stream)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn set_temperature_k(&mut self, temperature_k: f64) {
        self.temperature_k = temperature_k;
    }

    pub fn components(&self) -> &Arc<ComponentSet> {
        &self.components
    }

    /// Mass flows in g/hr, indexed like the component set.
    pub fn mass(&self) -> &DVector<f64> {
        &self.mass
    }

    pub fn shares_components_with(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.components, &other.components)
    }

    fn index(&self, component: &str) -> Result<usize, StreamError> {
        self.components
            .index_of(component)
            .ok_or_else(|| StreamError::UnknownComponent {
                stream: self.id.clone(),
                component: component.to_string(),
            })
    }

    fn check_flow(&self, component: &str, value: f64) -> Result<(), StreamError> {
        if !value.is_finite() || value < 0.0 {
            return Err(StreamError::InvalidFlow {
                stream: self.id.clone(),
                component: component.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Mass flow of `component` in g/hr.
    pub fn imass(&self, component: &str) -> Result<f64, StreamError> {
        Ok(self.mass[self.index(component)?])
    }

    pub fn set_imass(&mut self, component: &str, value: f64) -> Result<(), StreamError> {
        let i = self.index(component)?;
        self.check_flow(component, value)?;
        self.mass[i] = value;
        Ok(())
    }

    /// Adds `delta` (which may be negative) to the mass flow of `component`.
    pub fn add_imass(&mut self, component: &str, delta: f64) -> Result<(), StreamError> {
        let i = self.index(component)?;
        let value = self.mass[i] + delta;
        self.check_flow(component, value)?;
        self.mass[i] = value;
        Ok(())
    }

    /// Moves `amount` g/hr of `component` from this stream into `target`.
    pub fn transfer_to(
        &mut self,
        target: &mut Stream,
        component: &str,
        amount: f64,
    ) -> Result<(), StreamError> {
        self.add_imass(component, -amount)?;
        target.add_imass(component, amount)
    }

    fn molecular_weight(&self, component: &str) -> Result<f64, StreamError> {
        self.components
            .get(component)
            .ok_or_else(|| StreamError::UnknownComponent {
                stream: self.id.clone(),
                component: component.to_string(),
            })?
            .molecular_weight
            .ok_or_else(|| StreamError::MissingMolecularWeight(component.to_string()))
    }

    /// Molar flow of `component` in mol/hr.
    pub fn imol(&self, component: &str) -> Result<f64, StreamError> {
        let mw = self.molecular_weight(component)?;
        Ok(self.imass(component)? / mw)
    }

    pub fn set_imol(&mut self, component: &str, moles: f64) -> Result<(), StreamError> {
        let mw = self.molecular_weight(component)?;
        self.set_imass(component, moles * mw)
    }

    /// Copies flows, phase and temperature of `other`, keeping this stream's id.
    pub fn copy_like(&mut self, other: &Stream) -> Result<(), StreamError> {
        if !self.shares_components_with(other) {
            return Err(StreamError::IncompatibleComponents {
                stream: self.id.clone(),
                other: other.id.clone(),
            });
        }
        self.mass.copy_from(&other.mass);
        self.phase = other.phase;
        self.temperature_k = other.temperature_k;
        Ok(())
    }

    /// Sets every flow to zero.
    pub fn empty(&mut self) {
        self.mass.fill(0.0);
    }

    pub fn is_empty(&self) -> bool {
        self.mass.iter().all(|m| *m == 0.0)
    }

    /// Replaces this stream's flows with the sum of `inlets`.
    ///
    /// The mixed temperature is the mass-weighted average of the inlets.
    pub fn mix_from(&mut self, inlets: &[&Stream]) -> Result<(), StreamError> {
        let mut total = DVector::zeros(self.components.len());
        let mut weighted_t = 0.0;
        let mut total_mass = 0.0;
        for inlet in inlets {
            if !self.shares_components_with(inlet) {
                return Err(StreamError::IncompatibleComponents {
                    stream: self.id.clone(),
                    other: inlet.id.clone(),
                });
            }
            total += &inlet.mass;
            let m = inlet.f_mass();
            weighted_t += m * inlet.temperature_k;
            total_mass += m;
        }
        self.mass = total;
        if total_mass > 0.0 {
            self.temperature_k = weighted_t / total_mass;
        }
        Ok(())
    }

    /// Total mass flow in g/hr.
    pub fn f_mass(&self) -> f64 {
        self.mass.sum()
    }

    /// Liquid volumetric flow in m³/hr; zero for gas-phase streams.
    pub fn f_vol(&self) -> f64 {
        if self.phase == Phase::Gas {
            return 0.0;
        }
        self.mass.dot(self.components.specific_volume())
    }

    /// Composite mass flow in g/hr, regardless of phase.
    pub fn composite(&self, quantity: Composite) -> f64 {
        match quantity {
            Composite::TotalMass => self.f_mass(),
            Composite::Cod => self.mass.dot(self.components.i_cod()),
            Composite::Nitrogen => self.mass.dot(self.components.i_n()),
            Composite::Phosphorus => self.mass.dot(self.components.i_p()),
            Composite::Tss => self.mass.dot(self.components.tss_mask()),
        }
    }

    /// Liquid-phase concentration in mg/L.
    ///
    /// `None` for gas-phase streams, for streams without volume and for
    /// [`Composite::TotalMass`].
    pub fn concentration(&self, quantity: Composite) -> Option<f64> {
        if self.phase == Phase::Gas || quantity == Composite::TotalMass {
            return None;
        }
        let volume = self.f_vol();
        if volume <= 0.0 {
            return None;
        }
        // g/hr over m3/hr is g/m3, which is mg/L.
        Some(self.composite(quantity) / volume)
    }

    pub fn cod(&self) -> Option<f64> {
        self.concentration(Composite::Cod)
    }

    pub fn tn(&self) -> Option<f64> {
        self.concentration(Composite::Nitrogen)
    }

    pub fn tp(&self) -> Option<f64> {
        self.concentration(Composite::Phosphorus)
    }

    pub fn tss(&self) -> Option<f64> {
        self.concentration(Composite::Tss)
    }

    /// Iterates over `(component id, g/hr)` pairs.
    pub fn flows(&self) -> impl Iterator<Item = (&str, f64)> {
        self.components.ids().zip(self.mass.iter().copied())
    }
}
