use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Energy {energy} GeV does not exceed the rest mass {mass} GeV")]
    EnergyBelowMass { energy: f64, mass: f64 },

    #[error("beta*gamma = {beta_gamma} is below {minimum}; Bethe-Bloch formula not valid anymore")]
    BetaGammaTooLow { beta_gamma: f64, minimum: f64 },

    #[error("Momentum too low: {momentum_mev} MeV")]
    MomentumTooLow { momentum_mev: f64 },

    #[error("Momentum loss {loss} GeV meets or exceeds the momentum {momentum} GeV; particle stopped")]
    ParticleStopped { loss: f64, momentum: f64 },

    #[error("Unknown particle species with PDG code {0}")]
    UnknownSpecies(i32),

    #[error("Unknown particle name '{0}'")]
    UnknownParticleName(String),
}
