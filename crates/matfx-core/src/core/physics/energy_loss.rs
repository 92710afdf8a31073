use super::bethe_bloch::{self, BETA_GAMMA_MIN};
use super::bremsstrahlung;
use super::error::PhysicsError;
use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::ParticleSpecies;

/// Relativistic kinematics of a particle with a given total energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub energy: f64,
    pub gamma: f64,
    pub gamma_square: f64,
    pub beta_square: f64,
    pub momentum: f64,
}

impl Kinematics {
    pub fn from_energy(energy: f64, mass: f64) -> Result<Self, PhysicsError> {
        if energy <= mass {
            return Err(PhysicsError::EnergyBelowMass { energy, mass });
        }
        let gamma = energy / mass;
        let gamma_square = gamma * gamma;
        let beta_square = 1.0 - 1.0 / gamma_square;
        Ok(Self {
            energy,
            gamma,
            gamma_square,
            beta_square,
            momentum: energy * beta_square.sqrt(),
        })
    }

}

/// How the loss rate is integrated over a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    /// A single evaluation at the initial energy; cheap, used for step budgeting.
    Linear,
    /// Classic fourth-order Runge-Kutta over the energy domain.
    RungeKutta4,
}

/// Result of integrating the loss rate over one step.
///
/// Every process-noise contribution is computed from this value, so noise can only be
/// evaluated after the momentum loss of the same step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossEvaluation {
    /// Momentum lost over the step in GeV/c; negative for backward steps.
    pub momentum_loss: f64,
    /// Mean loss rate over the step in GeV/cm.
    pub mean_loss_rate: f64,
    /// Total energy at the middle of the step in GeV.
    pub mid_energy: f64,
    /// Signed path length in cm.
    pub path_length: f64,
}

impl LossEvaluation {
    #[inline]
    pub fn stops_particle(&self, momentum: f64) -> bool {
        self.momentum_loss >= momentum
    }
}

/// Energy-loss rate model with independently switchable ionization and radiative terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyLossModel {
    pub bethe_bloch: bool,
    pub bremsstrahlung: bool,
}

impl Default for EnergyLossModel {
    fn default() -> Self {
        Self {
            bethe_bloch: true,
            bremsstrahlung: true,
        }
    }
}

impl EnergyLossModel {
    pub fn new(bethe_bloch: bool, bremsstrahlung: bool) -> Self {
        Self {
            bethe_bloch,
            bremsstrahlung,
        }
    }

    /// Energy loss per unit length in GeV/cm at total energy `energy`.
    pub fn loss_rate(
        &self,
        energy: f64,
        species: &ParticleSpecies,
        material: &MaterialProperties,
    ) -> Result<f64, PhysicsError> {
        let kinematics = Kinematics::from_energy(energy, species.mass)?;

        let mut rate = 0.0;
        if self.bethe_bloch {
            rate += bethe_bloch::loss_rate(&kinematics, species.mass, species.charge, material)?;
        }
        if self.bremsstrahlung {
            rate += bremsstrahlung::loss_rate(kinematics.momentum, species, material);
        }
        Ok(rate)
    }

    /// Lowest total energy at which this model can still be evaluated.
    fn stopping_energy(&self, mass: f64) -> f64 {
        if self.bethe_bloch {
            mass * (1.0 + BETA_GAMMA_MIN * BETA_GAMMA_MIN).sqrt()
        } else {
            mass
        }
    }

    /// Momentum lost over a signed step of length `step` starting at `momentum`.
    ///
    /// A step that would bring the energy to or below the rest mass stops the particle:
    /// the loss saturates at the full incoming momentum. An intermediate RK4 stage that
    /// falls below the ionization validity floor counts as stopping too.
    pub fn momentum_loss(
        &self,
        species: &ParticleSpecies,
        material: &MaterialProperties,
        step: f64,
        momentum: f64,
        integration: Integration,
    ) -> Result<LossEvaluation, PhysicsError> {
        let mass = species.mass;
        let e0 = species.energy(momentum);
        let initial_rate = self.loss_rate(e0, species, material)?;

        let mean_loss_rate = match integration {
            Integration::Linear => initial_rate,
            Integration::RungeKutta4 => {
                let stopping_energy = self.stopping_energy(mass);
                let mut rates = [initial_rate, 0.0, 0.0, 0.0];
                for (stage, fraction) in [0.5, 0.5, 1.0].into_iter().enumerate() {
                    let stage_energy = e0 - rates[stage] * step * fraction;
                    if stage_energy <= stopping_energy {
                        return Ok(LossEvaluation {
                            momentum_loss: momentum,
                            mean_loss_rate: initial_rate,
                            mid_energy: e0 - initial_rate * step * 0.5,
                            path_length: step,
                        });
                    }
                    rates[stage + 1] = self.loss_rate(stage_energy, species, material)?;
                }
                (rates[0] + 2.0 * rates[1] + 2.0 * rates[2] + rates[3]) / 6.0
            }
        };

        let mid_energy = e0 - mean_loss_rate * step * 0.5;
        let energy_loss = step * mean_loss_rate; // positive for forward steps
        let final_energy = e0 - energy_loss;

        let momentum_loss = if final_energy <= mass {
            momentum
        } else {
            momentum - (final_energy * final_energy - mass * mass).sqrt()
        };

        Ok(LossEvaluation {
            momentum_loss,
            mean_loss_rate,
            mid_energy,
            path_length: step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn silicon() -> MaterialProperties {
        MaterialProperties::new(2.33, 14.0, 28.0, 9.37, 173.0)
    }

    fn proton() -> ParticleSpecies {
        ParticleSpecies::from_pdg(2212).unwrap()
    }

    #[test]
    fn kinematics_rejects_energy_at_or_below_mass() {
        assert!(matches!(
            Kinematics::from_energy(0.5, 0.5),
            Err(PhysicsError::EnergyBelowMass { .. })
        ));
    }

    #[test]
    fn kinematics_recovers_the_momentum_from_the_energy() {
        let kinematics = Kinematics::from_energy(proton().energy(1.0), proton().mass).unwrap();
        assert!((kinematics.momentum - 1.0).abs() < 1e-12);
        assert!(kinematics.beta_square > 0.0 && kinematics.beta_square < 1.0);
    }

    #[test]
    fn loss_rate_rejects_energy_below_mass() {
        let result = EnergyLossModel::default().loss_rate(0.9, &proton(), &silicon());
        assert!(matches!(result, Err(PhysicsError::EnergyBelowMass { .. })));
    }

    #[test]
    fn proton_through_one_cm_of_silicon_loses_under_one_percent() {
        let evaluation = EnergyLossModel::default()
            .momentum_loss(&proton(), &silicon(), 1.0, 1.0, Integration::RungeKutta4)
            .unwrap();
        assert!(evaluation.momentum_loss > 0.0);
        assert!(evaluation.momentum_loss < 0.01, "{evaluation:?}");
        assert!((evaluation.momentum_loss - 0.0076726).abs() < 1e-5);
    }

    #[test]
    fn electron_loses_more_than_a_non_radiating_muon_at_the_same_momentum() {
        let model = EnergyLossModel::default();
        let electron = ParticleSpecies::from_pdg(11).unwrap();
        let muon = ParticleSpecies::from_pdg(13).unwrap();
        let electron_rate = model
            .loss_rate(electron.energy(1.0), &electron, &silicon())
            .unwrap();
        let muon_rate = model.loss_rate(muon.energy(1.0), &muon, &silicon()).unwrap();
        assert!(electron_rate > muon_rate);

        let ionization_only = EnergyLossModel::new(true, false)
            .loss_rate(electron.energy(1.0), &electron, &silicon())
            .unwrap();
        assert!(electron_rate > ionization_only);
    }

    #[test]
    fn runge_kutta_converges_to_the_linear_estimate_faster_than_linearly() {
        let model = EnergyLossModel::default();
        let difference = |step: f64| {
            let rk4 = model
                .momentum_loss(&proton(), &silicon(), step, 0.3, Integration::RungeKutta4)
                .unwrap();
            let linear = model
                .momentum_loss(&proton(), &silicon(), step, 0.3, Integration::Linear)
                .unwrap();
            (rk4.momentum_loss - linear.momentum_loss).abs()
        };

        let coarse = difference(0.5);
        let medium = difference(0.25);
        let fine = difference(0.125);
        assert!(coarse / medium > 3.0, "{coarse} / {medium}");
        assert!(medium / fine > 3.0, "{medium} / {fine}");
        assert!(fine < 1e-3);
    }

    #[test]
    fn oversized_step_saturates_at_incoming_momentum() {
        let model = EnergyLossModel::default();
        for integration in [Integration::Linear, Integration::RungeKutta4] {
            let evaluation = model
                .momentum_loss(&proton(), &silicon(), 100.0, 0.3, integration)
                .unwrap();
            assert_eq!(evaluation.momentum_loss, 0.3);
            assert!(evaluation.stops_particle(0.3));
        }
    }

    #[test]
    fn every_step_past_the_range_saturates_instead_of_failing() {
        let model = EnergyLossModel::default();
        for integration in [Integration::Linear, Integration::RungeKutta4] {
            for i in 0..20_000 {
                let step = 0.5 + f64::from(i) * 0.01;
                let evaluation = model
                    .momentum_loss(&proton(), &silicon(), step, 0.3, integration)
                    .unwrap_or_else(|e| panic!("step {step} cm failed: {e}"));
                assert!(evaluation.momentum_loss > 0.0);
                assert!(evaluation.momentum_loss <= 0.3);
                if step >= 5.0 {
                    assert_eq!(evaluation.momentum_loss, 0.3, "step {step} cm");
                }
            }
        }
    }

    #[test]
    fn ionization_floor_only_stops_the_particle_when_ionization_is_modelled() {
        let ionization = EnergyLossModel::default();
        let radiative_only = EnergyLossModel::new(false, true);
        let mass = proton().mass;
        assert!(ionization.stopping_energy(mass) > mass);
        assert_eq!(radiative_only.stopping_energy(mass), mass);
    }

    #[test]
    fn backward_step_gains_momentum() {
        let evaluation = EnergyLossModel::default()
            .momentum_loss(&proton(), &silicon(), -1.0, 1.0, Integration::RungeKutta4)
            .unwrap();
        assert!(evaluation.momentum_loss < 0.0);
        assert!(evaluation.mid_energy > proton().energy(1.0));
    }

    #[test]
    fn mid_energy_lies_between_initial_and_final_energy() {
        let e0 = proton().energy(1.0);
        let evaluation = EnergyLossModel::default()
            .momentum_loss(&proton(), &silicon(), 1.0, 1.0, Integration::RungeKutta4)
            .unwrap();
        let final_energy = proton().energy(1.0 - evaluation.momentum_loss);
        assert!(evaluation.mid_energy < e0);
        assert!(evaluation.mid_energy > final_energy);
    }

    proptest! {
        #[test]
        fn loss_rate_is_non_negative_for_valid_inputs(
            momentum in 0.05f64..1000.0,
            pdg in prop::sample::select(vec![11, -11, 13, -13, 211, 2212]),
            z in 1.0f64..92.0,
            density in 1e-3f64..20.0,
            excitation in 10.0f64..900.0,
        ) {
            let species = ParticleSpecies::from_pdg(pdg).unwrap();
            let material = MaterialProperties::new(density, z, 2.2 * z, 10.0, excitation);
            prop_assume!(momentum / species.mass >= 0.051);
            let rate = EnergyLossModel::default()
                .loss_rate(species.energy(momentum), &species, &material)
                .unwrap();
            prop_assert!(rate >= 0.0);
        }
    }
}
