//! # Core Module
//!
//! Stateless building blocks of the material-effects computation.
//!
//! ## Architecture
//!
//! - **Value Types** ([`models`]) - Materials, particle species, track state vectors and
//!   the covariance types the noise models write into
//! - **Physics Models** ([`physics`]) - Energy-loss rates, momentum-loss integration and
//!   the three process-noise contributions
//!
//! Nothing in this module holds state between calls; every function receives the
//! material, species and kinematics it needs as arguments.

pub mod models;
pub mod physics;
