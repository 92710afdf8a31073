use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::ParticleSpecies;
use crate::core::models::state::{NoiseMatrix, Q_OVER_P, StateVector, StepRecord};
use crate::engine::context::StepContext;
use crate::engine::effects::MaterialEffects;
use crate::engine::error::EngineError;
use crate::engine::interface::TrajectoryPropagator;
use crate::engine::limits::{StepLimitKind, StepLimits};
use serde::Serialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraverseSettings {
    /// Total path length to cover, cm.
    pub max_distance: f64,
    pub max_steps: usize,
    pub with_noise: bool,
    /// Propagate against the direction of flight.
    pub backward: bool,
}

impl Default for TraverseSettings {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            max_steps: 10_000,
            with_noise: true,
            backward: false,
        }
    }
}

/// One propagation step as taken by [`traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraversalStep {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub step_size: f64,
    pub limit: StepLimitKind,
    pub material_z: f64,
    pub material_density: f64,
    /// Momentum at the start of the step, GeV/c.
    pub momentum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalResult {
    pub steps: Vec<TraversalStep>,
    pub final_state: StateVector,
    pub final_momentum: f64,
    pub path_length: f64,
    /// Accumulated process noise; `None` unless requested.
    pub noise: Option<NoiseMatrix>,
}

impl TraversalResult {
    pub fn momentum_loss(&self, initial_momentum: f64) -> f64 {
        initial_momentum - self.final_momentum
    }
}

struct Segment {
    records: Vec<StepRecord>,
    momentum: f64,
}

impl Segment {
    fn flush(
        &mut self,
        effects: &MaterialEffects,
        species: &ParticleSpecies,
        state: &mut StateVector,
        noise: Option<&mut NoiseMatrix>,
    ) -> Result<(), EngineError> {
        if self.records.is_empty() {
            return Ok(());
        }
        let loss = effects.effects(&self.records, self.momentum, species, noise)?;
        self.momentum -= loss;
        state[Q_OVER_P] = f64::from(species.charge) / self.momentum;
        debug!(
            sub_steps = self.records.len(),
            loss,
            momentum = self.momentum,
            "segment effects applied"
        );
        self.records.clear();
        Ok(())
    }
}

/// Propagates a track through the material of `effects`' oracle.
///
/// Each step is limited by [`MaterialEffects::limit_step`] and the remaining distance,
/// then taken with `propagator`. Momentum loss and noise are applied segment-wise, whenever
/// the relative momentum-loss budget is used up and once more at the end. A budget that
/// leaves less than the minimum step also closes the segment.
#[instrument(skip_all, name = "traverse_workflow")]
pub fn traverse(
    effects: &mut MaterialEffects,
    propagator: &dyn TrajectoryPropagator,
    start: &StateVector,
    momentum: f64,
    species: &ParticleSpecies,
    settings: &TraverseSettings,
) -> Result<TraversalResult, EngineError> {
    info!(
        species = %species,
        momentum,
        max_distance = settings.max_distance,
        "Starting traversal."
    );

    let sign = if settings.backward { -1.0 } else { 1.0 };
    let min_step = effects.config().stepper.min_step;
    let mut state = *start;
    let mut context = StepContext::new();
    let mut segment = Segment {
        records: Vec::new(),
        momentum,
    };
    let mut noise = settings.with_noise.then(NoiseMatrix::zeros);
    let mut steps = Vec::new();
    let mut path_length = 0.0;
    let mut iterations = 0;
    let mut limits = StepLimits::new(sign);

    while path_length < settings.max_distance && iterations < settings.max_steps {
        iterations += 1;

        limits.reset();
        limits.set(StepLimitKind::MaxDistance, settings.max_distance - path_length);
        effects.limit_step(
            &mut context,
            propagator,
            &state,
            segment.momentum,
            species,
            &mut limits,
            false,
        )?;

        let (limit, step) = limits.lowest();
        if limit == StepLimitKind::MomentumLoss && step < min_step {
            segment.flush(effects, species, &mut state, noise.as_mut())?;
            context.reset();
            continue;
        }

        // The limiter returns before looking up the material for steps this short.
        if step < min_step && !effects.flags().no_effects {
            context.material = effects.material_at(&state.position(), &(state.direction() * sign))?;
        }

        let material: MaterialProperties = context.material;
        let position = state.position();
        steps.push(TraversalStep {
            index: steps.len(),
            x: position.x,
            y: position.y,
            z: position.z,
            step_size: sign * step,
            limit,
            material_z: material.z,
            material_density: material.density,
            momentum: segment.momentum,
        });

        segment
            .records
            .push(StepRecord::new(state, sign * step, material));
        state = propagator.advance(&state, sign * step, false);
        path_length += step;
    }

    segment.flush(effects, species, &mut state, noise.as_mut())?;

    info!(
        steps = steps.len(),
        path_length,
        final_momentum = segment.momentum,
        "Traversal finished."
    );

    Ok(TraversalResult {
        steps,
        final_state: state,
        final_momentum: segment.momentum,
        path_length,
        noise,
    })
}
