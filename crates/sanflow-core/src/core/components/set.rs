use super::component::{Component, Degradability, ParticleSize};
use super::error::ComponentError;
use nalgebra::DVector;
use std::collections::HashMap;
use tracing::debug;

/// An appendable, not yet validated list of components.
///
/// Built from a library, extended with project-specific constituents and then
/// compiled into an immutable [`ComponentSet`].
#[derive(Debug, Clone, Default)]
pub struct ComponentSetBuilder {
    components: Vec<Component>,
}

impl ComponentSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.iter().any(|c| c.id == id)
    }

    /// Appends `component` unless a component with the same id already exists.
    ///
    /// Returns `true` if the component was added.
    pub fn append(&mut self, component: Component) -> bool {
        if self.contains(&component.id) {
            debug!("Component '{}' already present; skipping.", component.id);
            return false;
        }
        self.components.push(component);
        true
    }

    pub fn append_dissolved(&mut self, id: &str, organic: bool, degradability: Degradability) -> bool {
        self.append(Component::dissolved(id, organic, degradability))
    }

    pub fn append_gas_chemical(
        &mut self,
        id: &str,
        molecular_weight: f64,
        organic: bool,
        i_cod: f64,
    ) -> bool {
        self.append(Component::gas_chemical(id, molecular_weight, organic, i_cod))
    }

    /// Appends every component of `other` whose id is not present yet.
    pub fn extend(&mut self, other: ComponentSetBuilder) -> usize {
        other
            .components
            .into_iter()
            .map(|c| self.append(c))
            .filter(|added| *added)
            .count()
    }

    pub fn compile(self) -> Result<ComponentSet, ComponentError> {
        ComponentSet::compile(self.components)
    }
}

/// A validated, immutable set of components.
///
/// Every stream holds a shared reference to the set it was created with; the
/// position of a component in the set is the position of its mass flow in the
/// stream's flow vector.
#[derive(Debug, Clone)]
pub struct ComponentSet {
    components: Vec<Component>,
    index: HashMap<String, usize>,
    i_cod: DVector<f64>,
    i_n: DVector<f64>,
    i_p: DVector<f64>,
    /// 1 for particulate components, 0 otherwise.
    tss_mask: DVector<f64>,
    /// m³ per g for liquid and solid components, 0 for gases.
    specific_volume: DVector<f64>,
}

impl ComponentSet {
    fn compile(components: Vec<Component>) -> Result<Self, ComponentError> {
        if components.is_empty() {
            return Err(ComponentError::Empty);
        }

        let mut index = HashMap::with_capacity(components.len());
        for (i, c) in components.iter().enumerate() {
            validate_component(c)?;
            if index.insert(c.id.clone(), i).is_some() {
                return Err(ComponentError::Duplicate(c.id.clone()));
            }
        }

        let n = components.len();
        let i_cod = DVector::from_iterator(n, components.iter().map(|c| c.i_cod));
        let i_n = DVector::from_iterator(n, components.iter().map(|c| c.i_n));
        let i_p = DVector::from_iterator(n, components.iter().map(|c| c.i_p));
        let tss_mask = DVector::from_iterator(
            n,
            components
                .iter()
                .map(|c| if c.is_particulate() { 1.0 } else { 0.0 }),
        );
        let specific_volume = DVector::from_iterator(
            n,
            components
                .iter()
                .map(|c| if c.is_gas() { 0.0 } else { 1.0 / (c.density * 1000.0) }),
        );

        debug!("Compiled component set with {} components.", n);
        Ok(Self {
            components,
            index,
            i_cod,
            i_n,
            i_p,
            tss_mask,
            specific_volume,
        })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.index_of(id).map(|i| &self.components[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.id.as_str())
    }

    pub fn i_cod(&self) -> &DVector<f64> {
        &self.i_cod
    }

    pub fn i_n(&self) -> &DVector<f64> {
        &self.i_n
    }

    pub fn i_p(&self) -> &DVector<f64> {
        &self.i_p
    }

    pub fn tss_mask(&self) -> &DVector<f64> {
        &self.tss_mask
    }

    pub fn specific_volume(&self) -> &DVector<f64> {
        &self.specific_volume
    }

    /// Returns an uncompiled copy that can be extended and compiled again.
    pub fn uncompile(&self) -> ComponentSetBuilder {
        ComponentSetBuilder::from_components(self.components.clone())
    }
}

fn validate_component(c: &Component) -> Result<(), ComponentError> {
    if c.id.trim().is_empty() {
        return Err(ComponentError::EmptyId);
    }
    for (name, value) in [("i-cod", c.i_cod), ("i-n", c.i_n), ("i-p", c.i_p)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ComponentError::InvalidCoefficient {
                id: c.id.clone(),
                name,
                value,
            });
        }
    }
    if !c.density.is_finite() || c.density <= 0.0 {
        return Err(ComponentError::InvalidCoefficient {
            id: c.id.clone(),
            name: "density",
            value: c.density,
        });
    }
    match c.molecular_weight {
        Some(mw) if !mw.is_finite() || mw <= 0.0 => {
            return Err(ComponentError::InvalidCoefficient {
                id: c.id.clone(),
                name: "molecular-weight",
                value: mw,
            });
        }
        _ => {}
    }
    if c.is_gas() && c.particle_size != ParticleSize::DissolvedGas {
        return Err(ComponentError::InconsistentPhase(c.id.clone()));
    }
    Ok(())
}
