use crate::core::physics::scattering::{MscModel, UnknownMscModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error(
        "There is no MSC model called \"{0}\". Maybe it is not implemented or you misspelled the model name"
    )]
    UnknownScatteringModel(String),

    #[error("Material effects already initialized with a material oracle")]
    AlreadyInitialized,

    #[error("Material effects haven't been initialized with a material oracle")]
    NotInitialized,

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl From<UnknownMscModel> for ConfigError {
    fn from(err: UnknownMscModel) -> Self {
        ConfigError::UnknownScatteringModel(err.0)
    }
}

/// Switches for the individual material effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EffectFlags {
    pub no_effects: bool,
    pub energy_loss_bethe_bloch: bool,
    pub noise_bethe_bloch: bool,
    pub noise_coulomb: bool,
    pub energy_loss_brems: bool,
    pub noise_brems: bool,
    pub ignore_boundaries_between_equal_materials: bool,
}

impl Default for EffectFlags {
    fn default() -> Self {
        Self {
            no_effects: false,
            energy_loss_bethe_bloch: true,
            noise_bethe_bloch: true,
            noise_coulomb: true,
            energy_loss_brems: true,
            noise_brems: true,
            ignore_boundaries_between_equal_materials: true,
        }
    }
}

/// What to do when the boundary search hits its iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundarySearchPolicy {
    /// Use the distance accumulated so far.
    #[default]
    Truncate,
    /// Abort the step with [`EngineError::BoundarySearchExhausted`](super::error::EngineError).
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepperSettings {
    /// Relative momentum loss allowed before the step limiter forces a stop.
    pub max_relative_momentum_loss: f64,
    /// Minimum trackable momentum, GeV/c.
    pub min_momentum: f64,
    /// Smallest resolvable step, cm.
    pub min_step: f64,
    pub max_boundary_iterations: usize,
    pub boundary_search: BoundarySearchPolicy,
}

impl Default for StepperSettings {
    fn default() -> Self {
        Self {
            max_relative_momentum_loss: 0.01,
            min_momentum: 4e-3,
            min_step: 1e-4,
            max_boundary_iterations: 100,
            boundary_search: BoundarySearchPolicy::Truncate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialEffectsConfig {
    pub flags: EffectFlags,
    pub msc_model: MscModel,
    pub stepper: StepperSettings,
}

#[derive(Default)]
pub struct MaterialEffectsConfigBuilder {
    flags: Option<EffectFlags>,
    msc_model: Option<MscModel>,
    max_relative_momentum_loss: Option<f64>,
    min_momentum: Option<f64>,
    min_step: Option<f64>,
    max_boundary_iterations: Option<usize>,
    boundary_search: Option<BoundarySearchPolicy>,
}

impl MaterialEffectsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: EffectFlags) -> Self {
        self.flags = Some(flags);
        self
    }
    pub fn msc_model(mut self, model: MscModel) -> Self {
        self.msc_model = Some(model);
        self
    }
    pub fn msc_model_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.msc_model = Some(name.parse()?);
        Ok(self)
    }
    pub fn max_relative_momentum_loss(mut self, fraction: f64) -> Self {
        self.max_relative_momentum_loss = Some(fraction);
        self
    }
    pub fn min_momentum(mut self, momentum: f64) -> Self {
        self.min_momentum = Some(momentum);
        self
    }
    pub fn min_step(mut self, step: f64) -> Self {
        self.min_step = Some(step);
        self
    }
    pub fn max_boundary_iterations(mut self, iterations: usize) -> Self {
        self.max_boundary_iterations = Some(iterations);
        self
    }
    pub fn boundary_search(mut self, policy: BoundarySearchPolicy) -> Self {
        self.boundary_search = Some(policy);
        self
    }

    pub fn build(self) -> Result<MaterialEffectsConfig, ConfigError> {
        let defaults = StepperSettings::default();
        let stepper = StepperSettings {
            max_relative_momentum_loss: self
                .max_relative_momentum_loss
                .unwrap_or(defaults.max_relative_momentum_loss),
            min_momentum: self.min_momentum.unwrap_or(defaults.min_momentum),
            min_step: self.min_step.unwrap_or(defaults.min_step),
            max_boundary_iterations: self
                .max_boundary_iterations
                .unwrap_or(defaults.max_boundary_iterations),
            boundary_search: self.boundary_search.unwrap_or(defaults.boundary_search),
        };

        if !(stepper.max_relative_momentum_loss > 0.0 && stepper.max_relative_momentum_loss <= 1.0)
        {
            return Err(ConfigError::InvalidParameter {
                name: "max_relative_momentum_loss",
                reason: format!("{} is not in (0, 1]", stepper.max_relative_momentum_loss),
            });
        }
        if !(stepper.min_momentum > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "min_momentum",
                reason: format!("{} is not positive", stepper.min_momentum),
            });
        }
        if !(stepper.min_step > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "min_step",
                reason: format!("{} is not positive", stepper.min_step),
            });
        }
        if stepper.max_boundary_iterations == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_boundary_iterations",
                reason: "at least one iteration is required".to_string(),
            });
        }

        Ok(MaterialEffectsConfig {
            flags: self.flags.unwrap_or_default(),
            msc_model: self.msc_model.unwrap_or_default(),
            stepper,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_the_standard_settings() {
        let config = MaterialEffectsConfigBuilder::new().build().unwrap();
        assert_eq!(config, MaterialEffectsConfig::default());
        assert_eq!(config.stepper.max_relative_momentum_loss, 0.01);
        assert_eq!(config.stepper.min_momentum, 4e-3);
        assert_eq!(config.stepper.min_step, 1e-4);
        assert_eq!(config.stepper.max_boundary_iterations, 100);
        assert_eq!(config.msc_model, MscModel::Geane);
        assert!(config.flags.energy_loss_brems && !config.flags.no_effects);
    }

    #[test]
    fn builder_accepts_known_model_names_only() {
        let config = MaterialEffectsConfigBuilder::new()
            .msc_model_name("Highland")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.msc_model, MscModel::Highland);

        let result = MaterialEffectsConfigBuilder::new().msc_model_name("Moliere");
        assert!(matches!(
            result,
            Err(ConfigError::UnknownScatteringModel(name)) if name == "Moliere"
        ));
    }

    #[test]
    fn builder_rejects_out_of_range_parameters() {
        let err = MaterialEffectsConfigBuilder::new()
            .max_relative_momentum_loss(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "max_relative_momentum_loss",
                ..
            }
        ));

        assert!(MaterialEffectsConfigBuilder::new().min_step(0.0).build().is_err());
        assert!(MaterialEffectsConfigBuilder::new().min_momentum(-1.0).build().is_err());
        assert!(
            MaterialEffectsConfigBuilder::new()
                .max_boundary_iterations(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn effect_flags_deserialize_with_defaults_for_missing_keys() {
        let flags: EffectFlags = toml::from_str("noise-brems = false").unwrap();
        assert!(!flags.noise_brems);
        assert!(flags.noise_coulomb);
        assert!(flags.ignore_boundaries_between_equal_materials);
    }
}
