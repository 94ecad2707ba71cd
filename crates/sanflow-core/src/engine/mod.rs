//! # Engine Module
//!
//! The stateful layer of SANFLOW: it assembles unit operations and streams into
//! a flowsheet, runs it, and checks that every unit keeps its books.
//!
//! ## Overview
//!
//! A [`system::System`] owns every stream and every unit of a flowsheet. Units
//! are added in an order where each inlet already exists, so the insertion
//! order is a valid single-pass simulation path. After each unit runs, its
//! declared conserved composites are compared between inlets and outlets.
//!
//! ## Architecture
//!
//! - **Flowsheet** ([`system`]) - Stream and unit ownership, wiring checks and simulation
//! - **Mass Balance** ([`balance`]) - Per-unit conservation records and verification
//! - **Configuration** ([`config`]) - Household scenario parameters and their builder
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod balance;
pub mod config;
pub mod error;
pub mod progress;
pub mod system;
