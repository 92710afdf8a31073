use crate::core::models::material::MaterialProperties;
use crate::core::models::state::StateVector;
use nalgebra::Vector3;

/// Geometry and material lookup service.
///
/// Implementations may keep navigation state between calls; the engine owns its oracle
/// exclusively and calls it synchronously.
pub trait MaterialOracle {
    /// Material at `position` for a track heading along `direction`.
    fn properties(&mut self, position: &Vector3<f64>, direction: &Vector3<f64>)
    -> MaterialProperties;

    /// Signed distance along the trajectory from `state` to the next material boundary,
    /// never exceeding `max_distance` in magnitude and carrying its sign.
    fn find_next_boundary(
        &mut self,
        state: &StateVector,
        max_distance: f64,
        non_uniform_field: bool,
    ) -> f64;

    fn set_debug_level(&mut self, _level: u32) {}
}

/// Pure geometric transport of a track state; no material physics.
pub trait TrajectoryPropagator {
    fn advance(&self, state: &StateVector, distance: f64, non_uniform_field: bool) -> StateVector;
}
