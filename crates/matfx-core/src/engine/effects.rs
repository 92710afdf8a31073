use super::config::{ConfigError, EffectFlags, MaterialEffectsConfig};
use super::error::EngineError;
use super::interface::MaterialOracle;
use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::ParticleSpecies;
use crate::core::models::state::{NoiseMatrix, StepRecord};
use crate::core::physics::energy_loss::{EnergyLossModel, Integration, Kinematics, LossEvaluation};
use crate::core::physics::error::PhysicsError;
use crate::core::physics::scattering::{self, MscModel};
use crate::core::physics::{bremsstrahlung, straggling};
use nalgebra::Vector3;
use std::fmt;
use tracing::debug;

/// Sub-steps shorter than this (cm) carry no material effects.
const NEGLIGIBLE_STEP: f64 = 1e-8;

/// Configured material-effects calculator.
///
/// Owns the material oracle once [`initialize`](Self::initialize)d. One instance serves one
/// propagation at a time: the step-limit, momentum-loss and noise calls of a step run
/// in that order and must not be interleaved with another track's calls.
pub struct MaterialEffects {
    config: MaterialEffectsConfig,
    oracle: Option<Box<dyn MaterialOracle>>,
    debug_level: u32,
}

impl fmt::Debug for MaterialEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialEffects")
            .field("config", &self.config)
            .field("initialized", &self.oracle.is_some())
            .field("debug_level", &self.debug_level)
            .finish()
    }
}

impl Default for MaterialEffects {
    fn default() -> Self {
        Self::new(MaterialEffectsConfig::default())
    }
}

impl MaterialEffects {
    pub fn new(config: MaterialEffectsConfig) -> Self {
        Self {
            config,
            oracle: None,
            debug_level: 0,
        }
    }

    /// Installs the material oracle. A second call is rejected and the first oracle stays active.
    pub fn initialize(&mut self, oracle: Box<dyn MaterialOracle>) -> Result<(), EngineError> {
        if self.oracle.is_some() {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.oracle = Some(oracle);
        if self.debug_level > 1 {
            self.forward_debug_level();
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn config(&self) -> &MaterialEffectsConfig {
        &self.config
    }

    pub fn flags(&self) -> &EffectFlags {
        &self.config.flags
    }

    pub fn flags_mut(&mut self) -> &mut EffectFlags {
        &mut self.config.flags
    }

    pub fn scattering_model(&self) -> MscModel {
        self.config.msc_model
    }

    /// Selects the multiple-scattering model by name ("GEANE" or "Highland").
    pub fn select_scattering_model(&mut self, name: &str) -> Result<(), EngineError> {
        let model: MscModel = name.parse().map_err(ConfigError::from)?;
        self.config.msc_model = model;
        Ok(())
    }

    pub fn debug_level(&self) -> u32 {
        self.debug_level
    }

    /// Sets the debug level; levels above 1 are forwarded to the oracle as `level - 1`.
    pub fn set_debug_level(&mut self, level: u32) {
        self.debug_level = level;
        if level > 1 {
            self.forward_debug_level();
        }
    }

    fn forward_debug_level(&mut self) {
        let level = self.debug_level - 1;
        if let Some(oracle) = self.oracle.as_deref_mut() {
            oracle.set_debug_level(level);
        }
    }

    pub(crate) fn oracle_mut(&mut self) -> Result<&mut dyn MaterialOracle, EngineError> {
        match self.oracle.as_deref_mut() {
            Some(oracle) => Ok(oracle),
            None => Err(ConfigError::NotInitialized.into()),
        }
    }

    fn require_initialized(&self) -> Result<(), EngineError> {
        if !self.is_initialized() {
            return Err(ConfigError::NotInitialized.into());
        }
        Ok(())
    }

    /// Asks the oracle for the material at a point.
    pub fn material_at(
        &mut self,
        position: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Result<MaterialProperties, EngineError> {
        Ok(self.oracle_mut()?.properties(position, direction))
    }

    /// The loss-rate model with the currently enabled energy-loss terms.
    pub fn energy_loss_model(&self) -> EnergyLossModel {
        EnergyLossModel::new(
            self.config.flags.energy_loss_bethe_bloch,
            self.config.flags.energy_loss_brems,
        )
    }

    pub fn momentum_loss(
        &self,
        species: &ParticleSpecies,
        material: &MaterialProperties,
        step: f64,
        momentum: f64,
        integration: Integration,
    ) -> Result<LossEvaluation, EngineError> {
        let evaluation = self.energy_loss_model().momentum_loss(
            species,
            material,
            step,
            momentum,
            integration,
        )?;

        if self.debug_level > 0 {
            debug!(
                momentum,
                energy = species.energy(momentum),
                dedx = evaluation.mean_loss_rate,
                energy_loss = step * evaluation.mean_loss_rate,
                mass = species.mass,
                "momentum loss"
            );
        }
        Ok(evaluation)
    }

    /// Adds the enabled process-noise contributions of one evaluated sub-step.
    pub fn add_noise(
        &self,
        noise: &mut NoiseMatrix,
        evaluation: &LossEvaluation,
        species: &ParticleSpecies,
        material: &MaterialProperties,
        direction: &Vector3<f64>,
    ) -> Result<(), EngineError> {
        let flags = &self.config.flags;
        let kinematics = Kinematics::from_energy(evaluation.mid_energy, species.mass)?;
        let momentum_square = kinematics.momentum * kinematics.momentum;

        if flags.energy_loss_bethe_bloch && flags.noise_bethe_bloch {
            straggling::add_ionization_straggling(noise, &kinematics, species, material, evaluation);
        }

        if flags.noise_coulomb {
            scattering::add_multiple_scattering(
                noise,
                self.config.msc_model,
                species.charge,
                momentum_square,
                kinematics.beta_square,
                material,
                evaluation.path_length,
                direction,
            );
        }

        if flags.energy_loss_brems && flags.noise_brems {
            bremsstrahlung::add_radiative_fluctuation(
                noise,
                momentum_square,
                kinematics.beta_square,
                species,
                material,
                evaluation.path_length,
            );
        }
        Ok(())
    }

    /// Applies the material effects of already-taken sub-steps.
    ///
    /// Returns the total momentum loss over `steps` and, when `noise` is given, adds the
    /// process noise of every sub-step to it. A particle that stops inside the segment is
    /// reported as [`PhysicsError::ParticleStopped`].
    pub fn effects(
        &self,
        steps: &[StepRecord],
        momentum: f64,
        species: &ParticleSpecies,
        mut noise: Option<&mut NoiseMatrix>,
    ) -> Result<f64, EngineError> {
        if self.debug_level > 0 {
            debug!(sub_steps = steps.len(), with_noise = noise.is_some(), "material effects");
        }

        if self.config.flags.no_effects {
            return Ok(0.0);
        }
        self.require_initialized()?;

        let mut momentum_loss = 0.0;

        for record in steps {
            let path_length = record.step_size;
            if path_length.abs() < NEGLIGIBLE_STEP {
                continue;
            }

            if self.debug_level > 0 {
                debug!(step_size = path_length, material = %record.material, "calculate material effects");
            }

            if record.material.is_vacuum() {
                continue;
            }

            let remaining = momentum - momentum_loss;
            let evaluation = self.momentum_loss(
                species,
                &record.material,
                path_length,
                remaining,
                Integration::RungeKutta4,
            )?;
            momentum_loss += evaluation.momentum_loss;

            if evaluation.stops_particle(remaining) {
                break;
            }

            if let Some(noise) = noise.as_deref_mut() {
                self.add_noise(
                    noise,
                    &evaluation,
                    species,
                    &record.material,
                    &record.state.direction(),
                )?;
            }
        }

        if momentum_loss >= momentum {
            return Err(PhysicsError::ParticleStopped {
                loss: momentum_loss,
                momentum,
            }
            .into());
        }

        Ok(momentum_loss)
    }
}
