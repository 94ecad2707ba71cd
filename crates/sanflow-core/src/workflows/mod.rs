//! # Workflows Module
//!
//! High-level entry points that build, simulate and summarize complete
//! treatment trains.
//!
//! ## Overview
//!
//! Workflows take a validated [`crate::engine::config::HouseholdConfig`] and a
//! shared component set, assemble the flowsheet, run it, and return plain result
//! structures ready for printing or export. Progress is reported through the
//! engine's [`crate::engine::progress::ProgressReporter`].
//!
//! ## Architecture
//!
//! - **Household Workflow** ([`household`]) - Greywater through the MBR and
//!   blackwater through the anaerobic digester, with optional sludge co-digestion
//! - **Population Sweep** ([`sweep`]) - The household workflow evaluated in
//!   parallel over a list of populations

pub mod household;
pub mod sweep;
