pub mod dedx;
pub mod traverse;

use crate::cli::MaterialSource;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use matfx::core::models::material::MaterialProperties;
use matfx::core::models::particle::ParticleSpecies;
use matfx::engine::effects::MaterialEffects;
use matfx::workflows::slab::SlabGeometry;
use tracing::debug;

/// Thickness (cm) of the slab built around the origin for a bare `--material`.
const SINGLE_MATERIAL_THICKNESS: f64 = 2.0;

/// Resolves a particle given by short name or PDG code.
pub fn parse_species(value: &str) -> Result<ParticleSpecies> {
    let species = match value.parse::<i32>() {
        Ok(pdg) => ParticleSpecies::from_pdg(pdg)?,
        Err(_) => ParticleSpecies::from_name(value)?,
    };
    debug!("Resolved particle '{}' to {}", value, species);
    Ok(species)
}

pub fn load_geometry(source: &MaterialSource) -> Result<SlabGeometry> {
    match (&source.geometry, &source.material) {
        (Some(path), _) => Ok(SlabGeometry::load(path)?),
        (None, Some(name)) => {
            let material = MaterialProperties::preset(name).ok_or_else(|| {
                let known: Vec<_> = MaterialProperties::preset_names().collect();
                CliError::Argument(format!(
                    "Unknown material '{}'. Known materials: {}",
                    name,
                    known.join(", ")
                ))
            })?;
            Ok(SlabGeometry::new(
                -SINGLE_MATERIAL_THICKNESS / 2.0,
                [(material, SINGLE_MATERIAL_THICKNESS)],
            )?)
        }
        (None, None) => Err(CliError::Argument(
            "Either --geometry or --material is required.".to_string(),
        )),
    }
}

pub fn build_engine(config: &AppConfig, geometry: SlabGeometry) -> Result<MaterialEffects> {
    let mut effects = MaterialEffects::new(config.effects);
    effects.initialize(Box::new(geometry))?;
    effects.set_debug_level(config.debug_level);
    Ok(effects)
}
