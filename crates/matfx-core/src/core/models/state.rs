use super::material::MaterialProperties;
use nalgebra::{Matrix6, SMatrix, SVector, Vector3};
use std::ops::{Index, IndexMut};

/// Symmetric 7×7 covariance increment, indexed like [`StateVector`].
pub type NoiseMatrix = SMatrix<f64, 7, 7>;

/// The position/direction part of a [`NoiseMatrix`].
pub type ScatteringBlock = Matrix6<f64>;

/// Index of the charge-over-momentum component in the state vector and noise matrix.
pub const Q_OVER_P: usize = 6;

/// Global track state: position (x, y, z), unit direction (ax, ay, az) and q/p.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector(pub SVector<f64, 7>);

impl StateVector {
    pub fn new(position: Vector3<f64>, direction: Vector3<f64>, q_over_p: f64) -> Self {
        let direction = direction.normalize();
        Self(SVector::<f64, 7>::from_column_slice(&[
            position.x,
            position.y,
            position.z,
            direction.x,
            direction.y,
            direction.z,
            q_over_p,
        ]))
    }

    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).into_owned()
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(3).into_owned()
    }

    #[inline]
    pub fn q_over_p(&self) -> f64 {
        self.0[Q_OVER_P]
    }

    /// Moves the position by `distance` along the current direction, ignoring curvature.
    pub fn nudge(&mut self, distance: f64) {
        let offset = self.direction() * distance;
        let mut position = self.0.fixed_rows_mut::<3>(0);
        position += offset;
    }
}

impl Index<usize> for StateVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for StateVector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

/// One propagation sub-step that has already been taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub state: StateVector,
    pub step_size: f64, // signed path length, cm
    pub material: MaterialProperties,
}

impl StepRecord {
    pub fn new(state: StateVector, step_size: f64, material: MaterialProperties) -> Self {
        Self {
            state,
            step_size,
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_the_direction() {
        let state = StateVector::new(Vector3::zeros(), Vector3::new(0.0, 3.0, 4.0), 1.0);
        assert!((state.direction().norm() - 1.0).abs() < 1e-12);
        assert!((state[4] - 0.6).abs() < 1e-12);
        assert!((state[5] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn nudge_moves_along_direction_only() {
        let mut state = StateVector::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            -0.5,
        );
        state.nudge(-2.0);
        assert_eq!(state.position(), Vector3::new(1.0, 2.0, 1.0));
        assert_eq!(state.direction(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(state.q_over_p(), -0.5);
    }
}
