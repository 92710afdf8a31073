use super::energy_loss::Kinematics;
use super::error::PhysicsError;
use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::ELECTRON_MASS;

/// Below this beta*gamma the Bethe-Bloch formula is no longer valid.
pub const BETA_GAMMA_MIN: f64 = 0.05;

// K = 4 pi N_A r_e^2 m_e c^2 in MeV cm^2/mol
const K_BETHE: f64 = 0.307075;

/// Mean ionization energy loss per unit length, in GeV/cm.
///
/// Clamped to zero where the logarithm turns the formula negative close to the
/// validity threshold.
pub fn loss_rate(
    kinematics: &Kinematics,
    mass: f64,
    charge: i32,
    material: &MaterialProperties,
) -> Result<f64, PhysicsError> {
    let Kinematics {
        gamma,
        gamma_square,
        beta_square,
        ..
    } = *kinematics;

    if beta_square * gamma_square < BETA_GAMMA_MIN * BETA_GAMMA_MIN {
        return Err(PhysicsError::BetaGammaTooLow {
            beta_gamma: (beta_square * gamma_square).sqrt(),
            minimum: BETA_GAMMA_MIN,
        });
    }

    let charge_square = f64::from(charge * charge);
    let mut result =
        K_BETHE * material.z / material.a * material.density / beta_square * charge_square;

    let mass_ratio = ELECTRON_MASS / mass;
    let argument = gamma_square * beta_square * ELECTRON_MASS * 1e3 * 2.0
        / ((1e-6 * material.mean_excitation_energy)
            * (1.0 + 2.0 * gamma * mass_ratio + mass_ratio * mass_ratio).sqrt());

    result *= argument.ln() - beta_square; // MeV/cm
    result *= 1e-3; // GeV/cm

    Ok(result.max(0.0))
}
