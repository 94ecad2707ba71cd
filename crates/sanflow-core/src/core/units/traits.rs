use super::error::UnitError;
use crate::core::streams::{Composite, Stream};
use serde::Serialize;
use std::fmt;

/// The number of streams a unit accepts on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "exactly {k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
        }
    }
}

/// A named key performance indicator of the last run of a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Kpi {
    pub fn new(name: &'static str, value: f64, unit: &'static str) -> Self {
        Self { name, value, unit }
    }
}

/// A steady-state unit operation.
///
/// `run` receives the inlet streams and the unit's own outlet streams, and
/// must overwrite every outlet. It is called once per simulation pass.
pub trait UnitOperation: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> &'static str;

    fn inlets(&self) -> Arity;

    fn outlets(&self) -> Arity;

    fn run(&mut self, ins: &[&Stream], outs: &mut [Stream]) -> Result<(), UnitError>;

    /// Composite quantities whose total inflow must equal total outflow.
    fn conserved(&self) -> &'static [Composite];

    fn kpis(&self) -> Vec<Kpi> {
        Vec::new()
    }
}

pub(crate) fn ensure_ports(
    unit: &dyn UnitOperation,
    n_ins: usize,
    n_outs: usize,
) -> Result<(), UnitError> {
    for (direction, arity, found) in [
        ("inlet(s)", unit.inlets(), n_ins),
        ("outlet(s)", unit.outlets(), n_outs),
    ] {
        if !arity.accepts(found) {
            return Err(UnitError::PortCount {
                unit: unit.id().to_string(),
                direction,
                expected: arity.to_string(),
                found,
            });
        }
    }
    Ok(())
}

pub(crate) fn ensure_fraction(
    unit: &str,
    name: &'static str,
    value: f64,
) -> Result<(), UnitError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(UnitError::InvalidParameter {
            unit: unit.to_string(),
            name,
            value,
            reason: "must be within [0, 1]",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_accepts_expected_counts() {
        assert!(Arity::Exactly(2).accepts(2));
        assert!(!Arity::Exactly(2).accepts(1));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));
    }

    #[test]
    fn fraction_bounds_are_inclusive() {
        assert!(ensure_fraction("U", "f", 0.0).is_ok());
        assert!(ensure_fraction("U", "f", 1.0).is_ok());
        assert!(ensure_fraction("U", "f", 1.0001).is_err());
        assert!(ensure_fraction("U", "f", -0.1).is_err());
        assert!(ensure_fraction("U", "f", f64::NAN).is_err());
    }
}
