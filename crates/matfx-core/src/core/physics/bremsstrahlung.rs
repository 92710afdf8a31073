//! Radiative (bremsstrahlung) energy loss of electrons and positrons.
//!
//! The loss rate is a polynomial fit in `ln(T / m_e)` and `ln(k_c / (E v_l))` with a
//! Migdal density correction and, for positrons, an annihilation suppression factor.
//! The fluctuation model is a simplified Bethe-Heitler variance.

use crate::core::models::material::MaterialProperties;
use crate::core::models::particle::{ELECTRON_MASS, ParticleSpecies};
use crate::core::models::state::{NoiseMatrix, Q_OVER_P};
use std::f64::consts::PI;

// Fit coefficients, 1-based: entries 1..=60 feed the S sum (37..=60 replace 13..=36 when
// Y > 0), entries 61..=100 feed the Z-weighted SS sum (86..=100 replace 71..=85 when Y > 0).
#[rustfmt::skip]
static FIT_COEFFICIENTS: [f64; 101] = [
    0.0,
    -0.960613E-01, 0.631029E-01, -0.142819E-01, 0.150437E-02, -0.733286E-04, 0.131404E-05,
    0.859343E-01, -0.529023E-01, 0.131899E-01, -0.159201E-02, 0.926958E-04, -0.208439E-05,
    -0.684096E+01, 0.370364E+01, -0.786752E+00, 0.822670E-01, -0.424710E-02, 0.867980E-04,
    -0.200856E+01, 0.129573E+01, -0.306533E+00, 0.343682E-01, -0.185931E-02, 0.392432E-04,
    0.127538E+01, -0.515705E+00, 0.820644E-01, -0.641997E-02, 0.245913E-03, -0.365789E-05,
    0.115792E+00, -0.463143E-01, 0.725442E-02, -0.556266E-03, 0.208049E-04, -0.300895E-06,
    -0.271082E-01, 0.173949E-01, -0.452531E-02, 0.569405E-03, -0.344856E-04, 0.803964E-06,
    0.419855E-02, -0.277188E-02, 0.737658E-03, -0.939463E-04, 0.569748E-05, -0.131737E-06,
    -0.318752E-03, 0.215144E-03, -0.579787E-04, 0.737972E-05, -0.441485E-06, 0.994726E-08,
    0.938233E-05, -0.651642E-05, 0.177303E-05, -0.224680E-06, 0.132080E-07, -0.288593E-09,
    -0.245667E-03, 0.833406E-04, -0.129217E-04, 0.915099E-06, -0.247179E-07,
    0.147696E-03, -0.498793E-04, 0.402375E-05, 0.989281E-07, -0.133378E-07,
    -0.737702E-02, 0.333057E-02, -0.553141E-03, 0.402464E-04, -0.107977E-05,
    -0.641533E-02, 0.290113E-02, -0.477641E-03, 0.342008E-04, -0.900582E-06,
    0.574303E-05, 0.908521E-04, -0.256900E-04, 0.239921E-05, -0.741271E-07,
    -0.341260E-04, 0.971711E-05, -0.172031E-06, -0.119455E-06, 0.704166E-08,
    0.341740E-05, -0.775867E-06, -0.653231E-07, 0.225605E-07, -0.114860E-08,
    -0.119391E-06, 0.194885E-07, 0.588959E-08, -0.127589E-08, 0.608247E-10,
];

const XI: f64 = 2.51;
const BETA: f64 = 0.99;
const VL: f64 = 0.00004;

/// Energy up to which soft bremsstrahlung loss is accounted, GeV.
const PHOTON_CUT: f64 = 10000.0;
const T_HIGH: f64 = 100.0;
const C_HIGH: f64 = 50.0;

const MIGDAL_CONSTANT: f64 = 0.805485e-10;
const AVOGADRO_BARN: f64 = 0.60221367;

/// Mean radiative energy loss per unit length, in GeV/cm.
///
/// Zero for every species other than electrons and positrons.
pub fn loss_rate(momentum: f64, species: &ParticleSpecies, material: &MaterialProperties) -> f64 {
    if !species.is_electron_like() {
        return 0.0;
    }

    let cut = PHOTON_CUT.min(momentum);
    let rate = electron_loss_rate(momentum, cut, material).max(0.0);

    let factor = if species.is_positron() {
        positron_factor(momentum, cut, material.z)
    } else {
        1.0
    };

    factor * rate
}

fn electron_loss_rate(momentum: f64, cut: f64, material: &MaterialProperties) -> f64 {
    let (t, mut kc) = if momentum > T_HIGH {
        (T_HIGH, if cut >= T_HIGH { C_HIGH } else { cut })
    } else {
        (momentum, cut)
    };

    let energy = t + ELECTRON_MASS; // total electron energy
    if cut > t {
        kc = t;
    }

    let x = (t / ELECTRON_MASS).ln();
    let y = (kc / (energy * VL)).ln();
    let c = &FIT_COEFFICIENTS;

    let mut s = 0.0;
    let mut yy = 1.0;
    for i in 1..=6 {
        let mut xx = 1.0;
        for j in 1..=6 {
            let mut k = 6 * i + j - 6;
            if i > 2 && y > 0.0 {
                k += 24;
            }
            s += c[k] * xx * yy;
            xx *= x;
        }
        yy *= y;
    }

    let mut ss = 0.0;
    yy = 1.0;
    for i in 1..=5 {
        let mut xx = 1.0;
        for j in 1..=5 {
            let mut k = 5 * i + j + 55;
            if i > 2 && y > 0.0 {
                k += 15;
            }
            ss += c[k] * xx * yy;
            xx *= x;
        }
        yy *= y;
    }

    s += material.z * ss;

    if s <= 0.0 {
        return 0.0;
    }

    let migdal = 1.0
        / (1.0
            + MIGDAL_CONSTANT * material.density * material.z * energy * energy
                / (material.a * kc * kc));

    let mut fac = material.z * (material.z + XI) * energy * energy / (energy + ELECTRON_MASS);
    fac *= (BETA * (kc * migdal / t).ln()).exp();
    if fac <= 0.0 {
        return 0.0;
    }
    let mut rate = fac * s;

    if momentum >= T_HIGH {
        let scale = if cut < T_HIGH {
            cut_shape(cut / momentum) / cut_shape(cut / t)
        } else {
            cut * cut_shape(cut / momentum) / (kc * cut_shape(kc / t))
        };
        rate *= scale; // GeV barn
    }

    rate * AVOGADRO_BARN * material.density / material.a
}

#[inline]
fn cut_shape(ratio: f64) -> f64 {
    1.0 - 0.5 * ratio + 2.0 * ratio * ratio / 9.0
}

// Empirical suppression of positron bremsstrahlung relative to electrons.
fn positron_factor(momentum: f64, cut: f64, z: f64) -> f64 {
    const AA: f64 = 7522100.0;
    const A1: f64 = 0.415;
    const A3: f64 = 0.0021;
    const A5: f64 = 0.00054;

    let mut eta = 0.0;
    if z > 0.0 {
        let x = (AA * momentum / (z * z)).ln();
        if x > -8.0 {
            eta = if x >= 9.0 {
                1.0
            } else {
                let w = A1 * x + A3 * x.powi(3) + A5 * x.powi(5);
                0.5 + w.atan() / PI
            };
        }
    }

    if eta < 0.0001 {
        1e-10
    } else if eta > 0.9999 {
        1.0
    } else {
        let e0 = (cut / momentum).min(1.0);
        if e0 < 1e-8 {
            1.0
        } else {
            eta * (1.0 - (1.0 - e0).powf(1.0 / eta)) / e0
        }
    }
}

/// Variance of the radiative energy loss over `path_length`, in GeV².
///
/// Bethe-Heitler model with E ≈ p; the 1.44 scale is an empirical correction.
pub fn energy_variance(momentum_square: f64, path_length: f64, radiation_length: f64) -> f64 {
    let minus_x_over_ln2 = -1.442695 * path_length.abs() / radiation_length;
    let variance =
        1.44 * (3f64.powf(minus_x_over_ln2) - 4f64.powf(minus_x_over_ln2)) * momentum_square;
    variance.max(0.0)
}

/// Adds the bremsstrahlung fluctuation to the q/p variance by linear error propagation.
pub fn add_radiative_fluctuation(
    noise: &mut NoiseMatrix,
    momentum_square: f64,
    beta_square: f64,
    species: &ParticleSpecies,
    material: &MaterialProperties,
    path_length: f64,
) {
    if !species.is_electron_like() || material.is_vacuum() {
        return;
    }

    let sigma2_e = energy_variance(momentum_square, path_length, material.radiation_length);
    let charge_square = f64::from(species.charge * species.charge);
    noise[(Q_OVER_P, Q_OVER_P)] +=
        charge_square / beta_square / (momentum_square * momentum_square) * sigma2_e;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn silicon() -> MaterialProperties {
        MaterialProperties::new(2.33, 14.0, 28.0, 9.37, 173.0)
    }

    fn electron() -> ParticleSpecies {
        ParticleSpecies::from_pdg(11).unwrap()
    }

    #[test]
    fn non_electrons_have_no_radiative_loss() {
        let muon = ParticleSpecies::from_pdg(13).unwrap();
        let proton = ParticleSpecies::from_pdg(2212).unwrap();
        assert_eq!(loss_rate(10.0, &muon, &silicon()), 0.0);
        assert_eq!(loss_rate(10.0, &proton, &silicon()), 0.0);
    }

    #[test]
    fn electron_at_one_gev_loses_roughly_energy_over_radiation_length() {
        let rate = loss_rate(1.0, &electron(), &silicon());
        assert!((rate - 0.10259635).abs() < TOLERANCE, "rate = {rate}");
        assert!((rate - 1.0 / 9.37).abs() < 0.01);
    }

    #[test]
    fn rate_grows_linearly_above_the_high_energy_cut() {
        let at_100 = loss_rate(100.0, &electron(), &silicon());
        let at_1000 = loss_rate(1000.0, &electron(), &silicon());
        assert!((at_1000 / at_100 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn positron_is_suppressed_only_at_low_momentum() {
        let positron = ParticleSpecies::from_pdg(-11).unwrap();
        let low_e = loss_rate(0.01, &electron(), &silicon());
        let low_p = loss_rate(0.01, &positron, &silicon());
        assert!(low_p < low_e);
        assert!(low_p > 0.0);

        let high_e = loss_rate(1.0, &electron(), &silicon());
        let high_p = loss_rate(1.0, &positron, &silicon());
        assert!((high_e - high_p).abs() < 1e-15);
    }

    #[test]
    fn energy_variance_is_non_negative_and_vanishes_for_zero_path() {
        assert_eq!(energy_variance(1.0, 0.0, 9.37), 0.0);
        assert!(energy_variance(1.0, 1.0, 9.37) > 0.0);
        assert!(energy_variance(1.0, -1.0, 9.37) > 0.0);
    }

    #[test]
    fn radiative_fluctuation_only_touches_the_q_over_p_diagonal() {
        let mut noise = NoiseMatrix::zeros();
        add_radiative_fluctuation(&mut noise, 1.0, 1.0, &electron(), &silicon(), 1.0);
        assert!(noise[(6, 6)] > 0.0);
        let mut expected = NoiseMatrix::zeros();
        expected[(6, 6)] = noise[(6, 6)];
        assert_eq!(noise, expected);
    }

    #[test]
    fn radiative_fluctuation_is_a_no_op_for_muons() {
        let mut noise = NoiseMatrix::identity();
        let muon = ParticleSpecies::from_pdg(13).unwrap();
        add_radiative_fluctuation(&mut noise, 1.0, 1.0, &muon, &silicon(), 1.0);
        assert_eq!(noise, NoiseMatrix::identity());
    }
}
