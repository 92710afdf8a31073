use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic numbers at or below this value are treated as vacuum.
pub const VACUUM_Z_THRESHOLD: f64 = 1e-3;

/// Bulk properties of the material at one point of the detector.
///
/// Units: density in g/cm³, atomic mass in g/mol, radiation length in cm and
/// mean excitation energy in eV. Two snapshots compare equal only when every
/// property matches, which is how a boundary between identical materials is detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MaterialProperties {
    pub density: f64,
    pub z: f64,
    pub a: f64,
    pub radiation_length: f64,
    pub mean_excitation_energy: f64,
}

impl MaterialProperties {
    pub const fn new(
        density: f64,
        z: f64,
        a: f64,
        radiation_length: f64,
        mean_excitation_energy: f64,
    ) -> Self {
        Self {
            density,
            z,
            a,
            radiation_length,
            mean_excitation_energy,
        }
    }

    pub const fn vacuum() -> Self {
        Self::new(0.0, 0.0, 0.0, 1e30, 0.0)
    }

    #[inline]
    pub fn is_vacuum(&self) -> bool {
        self.z <= VACUUM_Z_THRESHOLD
    }

    pub fn preset(name: &str) -> Option<Self> {
        MATERIAL_PRESETS.get(name).copied()
    }

    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        MATERIAL_PRESETS.keys().copied()
    }
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self::vacuum()
    }
}

impl fmt::Display for MaterialProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "density = {} g/cm3; Z = {}; A = {}; X0 = {} cm; I = {} eV",
            self.density, self.z, self.a, self.radiation_length, self.mean_excitation_energy
        )
    }
}

// Compounds use an effective Z and A that preserve Z/A.
static MATERIAL_PRESETS: Map<&'static str, MaterialProperties> = phf_map! {
    "silicon" => MaterialProperties::new(2.329, 14.0, 28.0855, 9.370, 173.0),
    "iron" => MaterialProperties::new(7.874, 26.0, 55.845, 1.757, 286.0),
    "copper" => MaterialProperties::new(8.96, 29.0, 63.546, 1.436, 322.0),
    "lead" => MaterialProperties::new(11.35, 82.0, 207.2, 0.5612, 823.0),
    "aluminium" => MaterialProperties::new(2.699, 13.0, 26.9815, 8.897, 166.0),
    "beryllium" => MaterialProperties::new(1.848, 4.0, 9.0122, 35.28, 63.7),
    "carbon" => MaterialProperties::new(2.21, 6.0, 12.011, 19.32, 78.0),
    "water" => MaterialProperties::new(1.0, 7.22, 13.0, 36.08, 75.0),
    "air" => MaterialProperties::new(1.205e-3, 7.3, 14.7, 30390.0, 85.7),
    "argon" => MaterialProperties::new(1.662e-3, 18.0, 39.948, 11760.0, 188.0),
};
