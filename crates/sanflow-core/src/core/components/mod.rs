//! Tracked constituents and the compiled component set.
//!
//! A [`ComponentSet`] is built once, from the embedded default library plus any
//! project-specific additions, and then shared by every stream through an `Arc`.

pub mod component;
pub mod error;
pub mod library;
pub mod set;

pub use component::{Component, Degradability, MeasuredAs, ParticleSize, Phase};
pub use error::ComponentError;
pub use library::{default_library, household, household_with_library, load_library};
pub use set::{ComponentSet, ComponentSetBuilder};
