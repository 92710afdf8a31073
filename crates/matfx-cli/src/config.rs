use crate::error::{CliError, Result};
use matfx::engine::config::{
    BoundarySearchPolicy, EffectFlags, MaterialEffectsConfig, MaterialEffectsConfigBuilder,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialStepperConfig {
    max_relative_momentum_loss: Option<f64>,
    min_momentum: Option<f64>,
    min_step: Option<f64>,
    max_boundary_iterations: Option<usize>,
    boundary_search: Option<BoundarySearchPolicy>,
}

/// Contents of a settings file; every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsFile {
    effects: Option<EffectFlags>,
    msc_model: Option<String>,
    stepper: Option<PartialStepperConfig>,
    debug_level: Option<u32>,
}

/// Engine configuration plus the debug level to apply to the engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub effects: MaterialEffectsConfig,
    pub debug_level: u32,
}

impl SettingsFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading settings from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn into_config(self) -> Result<AppConfig> {
        let mut builder =
            MaterialEffectsConfigBuilder::new().flags(self.effects.unwrap_or_default());

        if let Some(name) = &self.msc_model {
            builder = builder
                .msc_model_name(name)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }

        let stepper = self.stepper.unwrap_or_default();
        if let Some(fraction) = stepper.max_relative_momentum_loss {
            builder = builder.max_relative_momentum_loss(fraction);
        }
        if let Some(momentum) = stepper.min_momentum {
            builder = builder.min_momentum(momentum);
        }
        if let Some(step) = stepper.min_step {
            builder = builder.min_step(step);
        }
        if let Some(iterations) = stepper.max_boundary_iterations {
            builder = builder.max_boundary_iterations(iterations);
        }
        if let Some(policy) = stepper.boundary_search {
            builder = builder.boundary_search(policy);
        }

        let effects = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(AppConfig {
            effects,
            debug_level: self.debug_level.unwrap_or(0),
        })
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => SettingsFile::from_file(path)?.into_config(),
        None => SettingsFile::default().into_config(),
    }
}
