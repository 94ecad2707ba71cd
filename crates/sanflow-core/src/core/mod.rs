//! # Core Module
//!
//! Fundamental building blocks for steady-state process modeling.
//!
//! - **Constituents** ([`components`]) - Tracked components, their conversion
//!   coefficients and the compiled component set shared by every stream
//! - **Flows** ([`streams`]) - Mass-flow vectors, composite metrics (COD, TN, TP,
//!   TSS) and per-capita influent builders
//! - **Unit Operations** ([`units`]) - The COD-based MBR, the COD-based anaerobic
//!   digester and a mixer
//! - **Reporting** ([`io`]) - Stream summaries and CSV export

pub mod components;
pub mod ids;
pub mod io;
pub mod streams;
pub mod units;
