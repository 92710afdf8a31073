//! # matfx Core Library
//!
//! Material effects for charged-particle track propagation: the mean energy lost by a
//! particle crossing layered matter, the process noise (covariance growth) produced by
//! ionization straggling, multiple Coulomb scattering and bremsstrahlung fluctuations,
//! and the step limiting that keeps a propagation step inside one material and inside
//! a momentum-loss budget.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless value types (`MaterialProperties`,
//!   `ParticleSpecies`, `StateVector`) and pure physics functions (energy-loss rate,
//!   momentum-loss integration, noise models).
//!
//! - **[`engine`]: The Logic Core.** The configurable `MaterialEffects` object, the
//!   traits for the external material oracle and trajectory propagator, the step
//!   limiter and the segment-level effects entry point.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures built on the engine: the
//!   dE/dx diagnostic table, a planar slab geometry and a full traversal driver.

pub mod core;
pub mod engine;
pub mod workflows;
