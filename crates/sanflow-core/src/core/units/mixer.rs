use super::error::UnitError;
use super::traits::{Arity, UnitOperation, ensure_ports};
use crate::core::streams::{Composite, Stream};

/// Combines any number of inlets into one outlet.
#[derive(Debug, Clone)]
pub struct Mixer {
    id: String,
}

impl Mixer {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl UnitOperation for Mixer {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "Mixer"
    }

    fn inlets(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn outlets(&self) -> Arity {
        Arity::Exactly(1)
    }

    fn run(&mut self, ins: &[&Stream], outs: &mut [Stream]) -> Result<(), UnitError> {
        ensure_ports(&*self, ins.len(), outs.len())?;
        let outlet = &mut outs[0];
        outlet.mix_from(ins)?;
        // Phase of the first inlet wins; mixers only join liquids here.
        outlet.set_phase(ins[0].phase());
        Ok(())
    }

    fn conserved(&self) -> &'static [Composite] {
        &[
            Composite::TotalMass,
            Composite::Cod,
            Composite::Nitrogen,
            Composite::Phosphorus,
            Composite::Tss,
        ]
    }
}
