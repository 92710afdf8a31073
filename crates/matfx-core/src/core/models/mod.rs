//! # Models Module
//!
//! Plain value types shared by the physics models and the engine.
//!
//! - [`material`] - Material properties as reported by a material oracle, plus named presets
//! - [`particle`] - Particle species (PDG code, mass, charge) and their lookup tables
//! - [`state`] - The 7-component track state, the 7×7 noise matrix and step records

pub mod material;
pub mod particle;
pub mod state;
