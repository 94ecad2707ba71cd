//! # SANFLOW Core Library
//!
//! A steady-state flowsheet library for household wastewater treatment trains:
//! greywater through a COD-based membrane bioreactor, blackwater through a
//! COD-based anaerobic digester.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models: the component set,
//!   streams and their composite metrics, influent builders, unit operations
//!   and report I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer. It owns the `System`
//!   flowsheet that orders unit operations into a single pass, verifies the
//!   mass balance of every unit, and carries configuration, progress reporting
//!   and error types.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures such as the
//!   household greywater/blackwater simulation and population sweeps.

pub mod core;
pub mod engine;
pub mod workflows;
