use crate::core::models::material::MaterialProperties;

/// Scratch state threaded through the step-limit calls of one extrapolation.
///
/// The step limiter records the material it found in front of the track and adds the
/// relative momentum loss it budgeted for each step; the caller resets the context
/// (or starts a new one) once the accumulated loss has been applied to the track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepContext {
    pub material: MaterialProperties,
    pub relative_momentum_loss: f64,
}

impl StepContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
