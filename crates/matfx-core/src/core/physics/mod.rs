//! # Physics Module
//!
//! Pure functions of the material, the particle species and its kinematics.
//!
//! ## Key Components
//!
//! - [`bethe_bloch`] - Mean ionization loss rate
//! - [`bremsstrahlung`] - Radiative loss rate and radiative energy-loss fluctuations
//! - [`energy_loss`] - The combined loss-rate model and its integration over a step
//! - [`straggling`] - Ionization energy-loss fluctuations (Vavilov, Landau, Urban regimes)
//! - [`scattering`] - Multiple Coulomb scattering angular variance and its 6×6 projection
//! - [`error`] - Physics-validity violations
//!
//! Lengths are in cm, energies and momenta in GeV (GeV/c), densities in g/cm³ and
//! mean excitation energies in eV. Empirical fits that dip below zero near the edge of
//! their validity range are clamped to zero rather than reported as errors.

pub mod bethe_bloch;
pub mod bremsstrahlung;
pub mod energy_loss;
pub mod error;
pub mod scattering;
pub mod straggling;

pub use energy_loss::{EnergyLossModel, Integration, Kinematics, LossEvaluation};
pub use error::PhysicsError;
