use crate::core::physics::error::PhysicsError;
use phf::{Map, phf_map};
use std::fmt;

/// Electron rest mass in GeV, as used throughout the energy-loss formulas.
pub const ELECTRON_MASS: f64 = 0.510998910e-3;

/// A charged particle species, identified by its PDG Monte Carlo code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpecies {
    pub pdg: i32,
    pub mass: f64,   // GeV
    pub charge: i32, // in units of the elementary charge
}

struct SpeciesEntry {
    mass: f64,
    charge: i32,
}

// Particles only; antiparticles are derived by flipping the sign of the code and charge.
// Note that for leptons the particle (positive code) carries negative charge.
fn particle_entry(pdg: i32) -> Option<SpeciesEntry> {
    let entry = match pdg {
        11 => SpeciesEntry {
            mass: ELECTRON_MASS,
            charge: -1,
        },
        13 => SpeciesEntry {
            mass: 0.1056583755,
            charge: -1,
        },
        211 => SpeciesEntry {
            mass: 0.13957039,
            charge: 1,
        },
        321 => SpeciesEntry {
            mass: 0.493677,
            charge: 1,
        },
        2212 => SpeciesEntry {
            mass: 0.93827208816,
            charge: 1,
        },
        1000010020 => SpeciesEntry {
            mass: 1.87561294257,
            charge: 1,
        },
        _ => return None,
    };
    Some(entry)
}

static SPECIES_BY_NAME: Map<&'static str, i32> = phf_map! {
    "e-" => 11,
    "e+" => -11,
    "mu-" => 13,
    "mu+" => -13,
    "pi+" => 211,
    "pi-" => -211,
    "K+" => 321,
    "K-" => -321,
    "p" => 2212,
    "pbar" => -2212,
    "d" => 1000010020,
    "dbar" => -1000010020,
};

impl ParticleSpecies {
    pub fn from_pdg(pdg: i32) -> Result<Self, PhysicsError> {
        let entry = particle_entry(pdg.abs()).ok_or(PhysicsError::UnknownSpecies(pdg))?;
        let charge = if pdg < 0 { -entry.charge } else { entry.charge };
        Ok(Self {
            pdg,
            mass: entry.mass,
            charge,
        })
    }

    pub fn from_name(name: &str) -> Result<Self, PhysicsError> {
        let pdg = SPECIES_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| PhysicsError::UnknownParticleName(name.to_string()))?;
        Self::from_pdg(pdg)
    }

    /// Electrons and positrons are the only species subject to bremsstrahlung here.
    #[inline]
    pub fn is_electron_like(&self) -> bool {
        self.pdg.abs() == 11
    }

    #[inline]
    pub fn is_positron(&self) -> bool {
        self.pdg == -11
    }

    #[inline]
    pub fn energy(&self, momentum: f64) -> f64 {
        momentum.hypot(self.mass)
    }
}

impl fmt::Display for ParticleSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PDG {} (m = {} GeV, q = {})",
            self.pdg, self.mass, self.charge
        )
    }
}
