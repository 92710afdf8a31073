use super::config::BoundarySearchPolicy;
use super::context::StepContext;
use super::effects::MaterialEffects;
use super::error::EngineError;
use super::interface::TrajectoryPropagator;
use super::limits::{StepLimitKind, StepLimits};
use crate::core::models::particle::ParticleSpecies;
use crate::core::models::state::StateVector;
use crate::core::physics::energy_loss::Integration;
use crate::core::physics::error::PhysicsError;
use tracing::{debug, warn};

impl MaterialEffects {
    /// Installs the momentum-loss and boundary limits for the next step.
    ///
    /// `limits` must already carry the caller's own limits and the step sign. The material
    /// found just ahead of `state` is stored in `context`, and the relative momentum loss
    /// expected over the resulting step is added to `context.relative_momentum_loss`.
    #[allow(clippy::too_many_arguments)]
    pub fn limit_step(
        &mut self,
        context: &mut StepContext,
        propagator: &dyn TrajectoryPropagator,
        state: &StateVector,
        momentum: f64,
        species: &ParticleSpecies,
        limits: &mut StepLimits,
        non_uniform_field: bool,
    ) -> Result<(), EngineError> {
        let settings = self.config().stepper;
        let flags = *self.flags();

        if momentum < settings.min_momentum {
            return Err(PhysicsError::MomentumTooLow {
                momentum_mev: momentum * 1000.0,
            }
            .into());
        }

        if flags.no_effects {
            return Ok(());
        }

        let loss_model = self.energy_loss_model();
        let verbose = self.debug_level() > 0;
        let oracle = self.oracle_mut()?;

        if context.relative_momentum_loss > settings.max_relative_momentum_loss {
            limits.set(StepLimitKind::MomentumLoss, 0.0);
            return Ok(());
        }

        let sign = limits.step_sign();
        let max_step = limits.lowest_signed();
        if max_step.abs() < settings.min_step {
            return Ok(());
        }

        let mut ahead = *state;
        ahead.nudge(sign * settings.min_step);
        let current = oracle.properties(&ahead.position(), &(ahead.direction() * sign));
        context.material = current;

        if verbose {
            debug!(material = %current, "material ahead of the track");
        }

        let mut loss_per_cm = 0.0;
        if !current.is_vacuum() {
            let evaluation = loss_model.momentum_loss(
                species,
                &current,
                sign,
                momentum,
                Integration::Linear,
            )?;
            loss_per_cm = evaluation.momentum_loss.abs() / momentum;

            if loss_per_cm > 0.0 {
                let budget = settings.max_relative_momentum_loss - context.relative_momentum_loss.abs();
                limits.set(StepLimitKind::MomentumLoss, (budget / loss_per_cm).abs());
            }
        }

        let max_step = limits.lowest_signed();
        let mut distance = sign * settings.min_step;
        let mut remaining = max_step;
        let mut trial = ahead;
        let mut resolved = false;

        for _ in 0..settings.max_boundary_iterations {
            let step = oracle.find_next_boundary(&trial, remaining, non_uniform_field);
            if verbose && step == 0.0 {
                debug!("material oracle returned a zero boundary distance");
            }

            distance += step;
            remaining -= step;

            if !flags.ignore_boundaries_between_equal_materials || distance.abs() >= max_step.abs() {
                resolved = true;
                break;
            }

            trial = propagator.advance(&trial, step, non_uniform_field);
            trial.nudge(sign * settings.min_step);
            let next = oracle.properties(&trial.position(), &(trial.direction() * sign));

            if verbose {
                debug!(material = %next, distance, "material behind the boundary");
            }

            if next != current {
                resolved = true;
                break;
            }
        }

        if !resolved {
            match settings.boundary_search {
                BoundarySearchPolicy::Truncate => {
                    warn!(
                        iterations = settings.max_boundary_iterations,
                        distance, "boundary search exhausted; truncating the step"
                    );
                }
                BoundarySearchPolicy::Fail => {
                    return Err(EngineError::BoundarySearchExhausted {
                        iterations: settings.max_boundary_iterations,
                        distance,
                    });
                }
            }
        }

        limits.set(StepLimitKind::Boundary, distance);
        context.relative_momentum_loss += loss_per_cm * limits.lowest_value();

        if verbose {
            let (kind, value) = limits.lowest();
            debug!(
                limit = %kind,
                step = value,
                relative_momentum_loss = context.relative_momentum_loss,
                "step limited"
            );
        }

        Ok(())
    }
}
