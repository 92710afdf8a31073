//! Multiple Coulomb scattering.
//!
//! The angular variance from either model is projected into the position/direction
//! block of the global 7×7 covariance. The deflection is isotropic in the plane
//! perpendicular to the direction `a`, so every 3×3 sub-block is a multiple of the
//! projector `I - a aᵀ`: `s²/3` for position-position, `s/2` for position-direction
//! and `1` for direction-direction (PDG 2010, Sec. 27.3).

use crate::core::models::material::MaterialProperties;
use crate::core::models::state::{NoiseMatrix, ScatteringBlock};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MscModel {
    /// Linear in path length (PANDA report PV/01-07, eq. 43).
    #[default]
    #[serde(rename = "GEANE")]
    Geane,
    /// Highland formula with its logarithmic correction (PDG 2011).
    Highland,
}

impl MscModel {
    pub fn name(&self) -> &'static str {
        match self {
            MscModel::Geane => "GEANE",
            MscModel::Highland => "Highland",
        }
    }
}

impl fmt::Display for MscModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMscModel(pub String);

impl FromStr for MscModel {
    type Err = UnknownMscModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GEANE" => Ok(MscModel::Geane),
            "Highland" => Ok(MscModel::Highland),
            other => Err(UnknownMscModel(other.to_string())),
        }
    }
}

/// Variance of the projected scattering angle over `path_length`, in rad².
pub fn angular_variance(
    model: MscModel,
    charge: i32,
    momentum_square: f64,
    beta_square: f64,
    material: &MaterialProperties,
    path_length: f64,
) -> f64 {
    let step = path_length.abs();
    let charge_square = f64::from(charge * charge);
    let z = material.z;

    let sigma2 = match model {
        MscModel::Geane => {
            225e-6 * charge_square / (beta_square * momentum_square) * step
                / material.radiation_length
                * z
                / (z + 1.0)
                * (159.0 * z.powf(-1.0 / 3.0)).ln()
                / (287.0 * z.powf(-0.5)).ln()
        }
        MscModel::Highland => {
            let step_over_rad_length = step / material.radiation_length;
            let log_correction = 1.0 + 0.038 * step_over_rad_length.ln();
            0.0136 * 0.0136 * charge_square / (beta_square * momentum_square)
                * step_over_rad_length
                * log_correction
                * log_correction
        }
    };

    sigma2.max(0.0)
}

/// Position/direction covariance produced by an angular variance `sigma2` over `path_length`.
pub fn covariance_block(sigma2: f64, path_length: f64, direction: &Vector3<f64>) -> ScatteringBlock {
    let step = path_length.abs();
    let projector = Matrix3::identity() - direction * direction.transpose();

    let mut block = ScatteringBlock::zeros();
    block
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(projector * (sigma2 * step * step / 3.0)));
    let cross = projector * (sigma2 * step * 0.5);
    block.fixed_view_mut::<3, 3>(0, 3).copy_from(&cross);
    block.fixed_view_mut::<3, 3>(3, 0).copy_from(&cross);
    block
        .fixed_view_mut::<3, 3>(3, 3)
        .copy_from(&(projector * sigma2));
    block
}

#[allow(clippy::too_many_arguments)]
pub fn add_multiple_scattering(
    noise: &mut NoiseMatrix,
    model: MscModel,
    charge: i32,
    momentum_square: f64,
    beta_square: f64,
    material: &MaterialProperties,
    path_length: f64,
    direction: &Vector3<f64>,
) {
    if material.is_vacuum() {
        return;
    }
    let sigma2 = angular_variance(
        model,
        charge,
        momentum_square,
        beta_square,
        material,
        path_length,
    );
    let block = covariance_block(sigma2, path_length, direction);
    let mut target = noise.fixed_view_mut::<6, 6>(0, 0);
    target += block;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOLERANCE: f64 = 1e-12;

    fn silicon() -> MaterialProperties {
        MaterialProperties::new(2.33, 14.0, 28.0, 9.37, 173.0)
    }

    #[test]
    fn model_names_parse_exactly() {
        assert_eq!("GEANE".parse::<MscModel>(), Ok(MscModel::Geane));
        assert_eq!("Highland".parse::<MscModel>(), Ok(MscModel::Highland));
        assert!("highland".parse::<MscModel>().is_err());
        assert!("Unrecognized".parse::<MscModel>().is_err());
    }

    #[test]
    fn geane_variance_is_linear_in_path_length() {
        let one = angular_variance(MscModel::Geane, 1, 1.0, 1.0, &silicon(), 1.0);
        let two = angular_variance(MscModel::Geane, 1, 1.0, 1.0, &silicon(), 2.0);
        assert!((two - 2.0 * one).abs() < TOLERANCE);
    }

    #[test]
    fn highland_matches_the_textbook_value_at_one_radiation_length() {
        let variance = angular_variance(MscModel::Highland, 1, 1.0, 1.0, &silicon(), 9.37);
        assert!((variance - 0.0136 * 0.0136).abs() < TOLERANCE);
    }

    #[test]
    fn highland_is_clamped_at_zero_for_extremely_thin_layers() {
        // The log correction crosses zero near x/X0 = exp(-1/0.038); squared it stays >= 0.
        let variance = angular_variance(MscModel::Highland, 1, 1.0, 1.0, &silicon(), 1e-20);
        assert!(variance >= 0.0);
    }

    #[test]
    fn block_has_no_spread_along_the_direction_of_motion() {
        let direction = Vector3::new(0.0, 0.0, 1.0);
        let block = covariance_block(1e-4, 2.0, &direction);
        for i in 0..6 {
            assert_eq!(block[(i, 2)], 0.0);
            assert_eq!(block[(i, 5)], 0.0);
        }
        assert!((block[(0, 0)] - 1e-4 * 4.0 / 3.0).abs() < TOLERANCE);
        assert!((block[(0, 3)] - 1e-4).abs() < TOLERANCE);
        assert!((block[(3, 3)] - 1e-4).abs() < TOLERANCE);
    }

    #[test]
    fn cross_terms_are_symmetric_under_axis_exchange() {
        let direction = Vector3::new(0.3, -0.5, 0.8).normalize();
        let block = covariance_block(2e-5, 1.5, &direction);
        // Cov(x, a_y) = Cov(y, a_x), Cov(x, a_z) = Cov(z, a_x), Cov(y, a_z) = Cov(z, a_y)
        assert!((block[(0, 4)] - block[(1, 3)]).abs() < TOLERANCE);
        assert!((block[(0, 5)] - block[(2, 3)]).abs() < TOLERANCE);
        assert!((block[(1, 5)] - block[(2, 4)]).abs() < TOLERANCE);
        assert!((block[(5, 0)] + 2e-5 * 1.5 * 0.5 * direction.x * direction.z).abs() < TOLERANCE);
    }

    #[test]
    fn add_multiple_scattering_accumulates_without_touching_q_over_p() {
        let mut noise = NoiseMatrix::zeros();
        noise[(6, 6)] = 7.0;
        let direction = Vector3::new(1.0, 0.0, 0.0);
        add_multiple_scattering(&mut noise, MscModel::Geane, 1, 1.0, 1.0, &silicon(), 1.0, &direction);
        let first = noise;
        add_multiple_scattering(&mut noise, MscModel::Geane, 1, 1.0, 1.0, &silicon(), 1.0, &direction);
        assert_eq!(noise[(6, 6)], 7.0);
        assert!((noise[(1, 1)] - 2.0 * first[(1, 1)]).abs() < TOLERANCE);
        assert_eq!(noise.row(6).iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn vacuum_adds_nothing() {
        let mut noise = NoiseMatrix::zeros();
        let direction = Vector3::new(0.0, 1.0, 0.0);
        add_multiple_scattering(
            &mut noise,
            MscModel::Highland,
            1,
            1.0,
            1.0,
            &MaterialProperties::vacuum(),
            10.0,
            &direction,
        );
        assert_eq!(noise, NoiseMatrix::zeros());
    }

    proptest! {
        #[test]
        fn block_is_symmetric_and_positive_semi_definite(
            theta in 0.0f64..std::f64::consts::PI,
            phi in 0.0f64..(2.0 * std::f64::consts::PI),
            step in 1e-4f64..100.0,
            momentum in 0.05f64..100.0,
            highland in any::<bool>(),
        ) {
            let direction = Vector3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            );
            let model = if highland { MscModel::Highland } else { MscModel::Geane };
            let sigma2 = angular_variance(model, 1, momentum * momentum, 0.9, &silicon(), step);
            let block = covariance_block(sigma2, step, &direction);

            let scale = block.amax().max(f64::MIN_POSITIVE);
            prop_assert!((block - block.transpose()).amax() <= 1e-12 * scale);
            let eigenvalues = block.symmetric_eigen().eigenvalues;
            for value in eigenvalues.iter() {
                prop_assert!(*value >= -1e-9 * scale);
            }
        }
    }
}
