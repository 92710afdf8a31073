//! # Workflows Module
//!
//! End-to-end procedures built on the [`engine`](crate::engine).
//!
//! - **dE/dx table** ([`dedx_table`]) - Tabulates ionization and radiative loss rates
//!   against momentum and writes them to CSV.
//! - **Slab geometry** ([`slab`]) - A planar layer stack usable as the material oracle,
//!   together with a straight-line propagator.
//! - **Traversal** ([`traverse`]) - Runs the step-limit, advance and effects loop of a
//!   track through the oracle's material, accumulating momentum loss and process noise.

pub mod dedx_table;
pub mod slab;
pub mod traverse;
