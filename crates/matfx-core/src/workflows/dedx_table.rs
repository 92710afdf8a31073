use crate::core::models::particle::ParticleSpecies;
use crate::core::physics::energy_loss::EnergyLossModel;
use crate::engine::effects::MaterialEffects;
use crate::engine::error::EngineError;
use nalgebra::Vector3;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

const MIN_MOMENTUM: f64 = 1e-5;
const MAX_MOMENTUM: f64 = 1e4;
const SAMPLES: usize = 10_000;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Loss rates at one momentum; a rate that could not be evaluated is left empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DedxRow {
    pub momentum: f64,
    pub log10_momentum: f64,
    pub ionization: Option<f64>,
    pub bremsstrahlung: Option<f64>,
}

pub fn table_file_name(species: &ParticleSpecies) -> String {
    format!("dEdx_{}.csv", species.pdg)
}

/// Tabulates the ionization-only and radiative-only loss rates (GeV/cm) of `species` in
/// the material found at the origin, on log-spaced momenta from 10 keV/c to 10 TeV/c.
pub fn tabulate_dedx(
    effects: &mut MaterialEffects,
    species: &ParticleSpecies,
) -> Result<Vec<DedxRow>, EngineError> {
    let material = effects.material_at(&Vector3::zeros(), &Vector3::new(1.0, 1.0, 1.0))?;
    let ionization = EnergyLossModel::new(true, false);
    let radiative = EnergyLossModel::new(false, true);

    let log_min = MIN_MOMENTUM.log10();
    let log_step = (MAX_MOMENTUM.log10() - log_min) / (SAMPLES - 1) as f64;

    let rows = (0..SAMPLES)
        .map(|i| {
            let log10_momentum = log_min + i as f64 * log_step;
            let momentum = 10f64.powf(log10_momentum);
            let energy = species.energy(momentum);
            DedxRow {
                momentum,
                log10_momentum,
                ionization: ionization.loss_rate(energy, species, &material).ok(),
                bremsstrahlung: radiative.loss_rate(energy, species, &material).ok(),
            }
        })
        .collect();
    Ok(rows)
}

/// Writes the dE/dx table of `species` to `dEdx_<pdg>.csv` inside `directory`.
#[instrument(skip_all, name = "dedx_export", fields(pdg = species.pdg))]
pub fn write_dedx_table(
    effects: &mut MaterialEffects,
    species: &ParticleSpecies,
    directory: &Path,
) -> Result<PathBuf, ExportError> {
    let rows = tabulate_dedx(effects, species)?;

    std::fs::create_dir_all(directory).map_err(|e| ExportError::Io {
        path: directory.to_string_lossy().to_string(),
        source: e,
    })?;
    let path = directory.join(table_file_name(species));
    let csv_error = |e: csv::Error| ExportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
    for row in &rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    info!(rows = rows.len(), path = %path.display(), "dE/dx table written");
    Ok(path)
}

/// Best-effort variant of [`write_dedx_table`]: failures are logged and swallowed.
pub fn export_dedx_table(
    effects: &mut MaterialEffects,
    species: &ParticleSpecies,
    directory: &Path,
) -> Option<PathBuf> {
    match write_dedx_table(effects, species, directory) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, pdg = species.pdg, "dE/dx table export failed");
            None
        }
    }
}
