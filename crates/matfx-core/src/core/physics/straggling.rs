//! Ionization energy-loss fluctuations (GEANT3 `erland` model).

use super::energy_loss::{Kinematics, LossEvaluation};
use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::{ELECTRON_MASS, ParticleSpecies};
use crate::core::models::state::{NoiseMatrix, Q_OVER_P};

/// Above this ratio of the collision energy scale to the maximum single transfer the
/// loss distribution is close enough to Gaussian.
const VAVILOV_KAPPA: f64 = 0.01;
/// Above this expected number of collisions the truncated Landau width is used.
const MANY_COLLISIONS: f64 = 50.0;
/// Width cap; corresponds to a 0.9996 cut on the Landau tail.
const MAX_SIGMA_ALPHA: f64 = 54.6;
const URBAN_ALPHA: f64 = 0.996;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StragglingRegime {
    VavilovGaussian,
    TruncatedLandau,
    Urban,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StragglingEstimate {
    pub variance: f64, // GeV^2
    pub regime: StragglingRegime,
}

pub fn energy_variance(
    kinematics: &Kinematics,
    species: &ParticleSpecies,
    material: &MaterialProperties,
    path_length: f64,
    mean_loss_rate: f64,
) -> StragglingEstimate {
    let Kinematics {
        gamma,
        gamma_square,
        beta_square,
        ..
    } = *kinematics;
    let mass = species.mass;
    let step = path_length.abs();
    let z = material.z;

    let charge_square = f64::from(species.charge * species.charge);
    let zeta = 153.4e3 * charge_square / beta_square * z / material.a * material.density * step; // eV
    let mass_ratio = ELECTRON_MASS / mass;
    let e_max = 2e9 * ELECTRON_MASS * beta_square * gamma_square
        / (1.0 + 2.0 * gamma * mass_ratio + mass_ratio * mass_ratio); // eV
    let kappa = zeta / e_max;

    let (sigma2_e, regime) = if kappa > VAVILOV_KAPPA {
        (
            zeta * e_max * (1.0 - beta_square / 2.0),
            StragglingRegime::VavilovGaussian,
        )
    } else {
        // Urban/Landau: number of collisions from the two-level atom model.
        let i = 16.0 * z.powf(0.9); // eV
        let f2 = if z > 2.0 { 2.0 / z } else { 0.0 };
        let f1 = 1.0 - f2;
        let e2 = 10.0 * z * z; // eV
        let e1 = (i / e2.powf(f2)).powf(1.0 / f1); // eV

        let mbbgg2 = 2e9 * mass * beta_square * gamma_square; // eV
        let log_i = (mbbgg2 / i).ln() - beta_square;
        let rate_ev = mean_loss_rate * 1e9;
        let sigma1 = rate_ev * f1 / e1 * ((mbbgg2 / e1).ln() - beta_square) / log_i * 0.6; // 1/cm
        let sigma2 = rate_ev * f2 / e2 * ((mbbgg2 / e2).ln() - beta_square) / log_i * 0.6; // 1/cm
        let sigma3 = rate_ev * e_max / (i * (e_max + i) * ((e_max + i) / i).ln()) * 0.4; // 1/cm

        let collisions = (sigma1 + sigma2 + sigma3) * step;

        if collisions > MANY_COLLISIONS {
            let sigma_alpha = landau_width(beta_square, zeta / e_max);
            (
                sigma_alpha * sigma_alpha * zeta * zeta,
                StragglingRegime::TruncatedLandau,
            )
        } else {
            let e_alpha = i / (1.0 - (URBAN_ALPHA * e_max / (e_max + i))); // eV
            let mean_e32 = i * (e_max + i) / e_max * (e_alpha - i); // eV^2
            (
                step * (sigma1 * e1 * e1 + sigma2 * e2 * e2 + sigma3 * mean_e32),
                StragglingRegime::Urban,
            )
        }
    };

    StragglingEstimate {
        variance: (sigma2_e * 1e-18).max(0.0), // eV^2 -> GeV^2
        regime,
    }
}

// Width of the truncated Landau distribution from the most probable lambda
// (GEANT3 manual W5013), empirical polynomial.
fn landau_width(beta_square: f64, kappa: f64) -> f64 {
    let lambda_mean = -0.422784 - beta_square - kappa.ln();
    let lambda_max = 0.60715
        + 1.1934 * lambda_mean
        + (0.67794 + 0.052382 * lambda_mean) * (0.94753 + 0.74442 * lambda_mean).exp();

    let sigma_alpha = if lambda_max <= 1010.0 {
        1.975560 + 9.898841e-02 * lambda_max - 2.828670e-04 * lambda_max.powi(2)
            + 5.345406e-07 * lambda_max.powi(3)
            - 4.942035e-10 * lambda_max.powi(4)
            + 1.729807e-13 * lambda_max.powi(5)
    } else {
        1.871887e+01 + 1.296254e-02 * lambda_max
    };

    sigma_alpha.min(MAX_SIGMA_ALPHA)
}

/// Adds the ionization straggling to the q/p variance by linear error propagation.
pub fn add_ionization_straggling(
    noise: &mut NoiseMatrix,
    kinematics: &Kinematics,
    species: &ParticleSpecies,
    material: &MaterialProperties,
    evaluation: &LossEvaluation,
) {
    if material.is_vacuum() {
        return;
    }
    let estimate = energy_variance(
        kinematics,
        species,
        material,
        evaluation.path_length,
        evaluation.mean_loss_rate,
    );
    let charge_square = f64::from(species.charge * species.charge);
    noise[(Q_OVER_P, Q_OVER_P)] +=
        charge_square / kinematics.beta_square / kinematics.momentum.powi(4) * estimate.variance;
}
