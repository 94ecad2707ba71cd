//! Steady-state unit operations.
//!
//! Every unit implements [`UnitOperation`]: it reads its inlet streams, overwrites
//! its outlet streams, and declares the composite quantities it conserves so the
//! flowsheet can verify its mass balance after each run.

pub mod digester;
pub mod error;
pub mod mbr;
pub mod mixer;
pub mod traits;

pub use digester::{CodAnaerobicDigester, DigesterParams, DigesterPerformance};
pub use error::UnitError;
pub use mbr::{CodMbr, MbrParams, MbrPerformance};
pub use mixer::Mixer;
pub use traits::{Arity, Kpi, UnitOperation};
