// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! Numeric strategies for the closed-form conversion probability.

The van Bibber relation multiplies a resonance factor `M = 1 / (phi^2 +
(Gamma L / 2)^2)` by an oscillation term `1 + exp(-Gamma L) - 2 exp(-Gamma
L / 2) cos(phi)`. When the axion and photon masses nearly coincide, or when
the absorption is tiny, both of these approach zero together and naive
double-precision evaluation loses everything to cancellation.

The double-precision path therefore uses the equivalent form

```text
(1 - exp(-Gamma L / 2))^2 + 4 exp(-Gamma L / 2) sin^2(phi / 2)
```

whose terms are all non-negative, and computes the mass difference as `(ma -
mg)(ma + mg)`. With the `mpfr` feature enabled, the whole chain can also be
evaluated with MPFR floats at an arbitrary number of decimal digits.

*/

use crate::conversion::PhysicsParameters;


/// The number of decimal digits used by extended-precision evaluation unless
/// told otherwise.
pub const DEFAULT_EXTENDED_DIGITS: u32 = 100;

/// Masses closer than this (relative) are treated as near-degenerate by
/// [`Precision::Auto`].
const NEAR_DEGENERATE_MASSES: f64 = 1e-6;

/// [`Precision::Auto`] switches to extended precision when `Gamma L` is
/// non-zero but outside this range.
const GAMMA_L_RANGE: (f64, f64) = (1e-8, 1e3);


/// Which arithmetic to use for the closed-form probability.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum Precision {
    /// Ordinary `f64` arithmetic.
    Double,

    /// MPFR arithmetic with the given number of decimal digits.
    #[cfg(feature = "mpfr")]
    Extended {
        /// Decimal digits of precision.
        digits: u32,
    },

    /// Use extended precision (if it was compiled in) only where the inputs
    /// call for it, and `f64` otherwise.
    Auto,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Double
    }
}

impl Precision {
    /// Whether these parameters, over `gamma_l`, fall in a regime where
    /// double precision is not to be trusted.
    pub fn is_cancellation_prone(params: &PhysicsParameters, gamma_l: f64) -> bool {
        let m_max = params.axion_mass.max(params.photon_mass);
        let near_degenerate = m_max > 0. &&
            (params.axion_mass - params.photon_mass).abs() <= NEAR_DEGENERATE_MASSES * m_max;
        let extreme_absorption = gamma_l > 0. &&
            (gamma_l < GAMMA_L_RANGE.0 || gamma_l > GAMMA_L_RANGE.1);
        near_degenerate || extreme_absorption
    }

    /// Compute `M` times the oscillation term for the given parameters over
    /// a coherence length of `length_m` meters. Returns `None` if `M` is
    /// singular, which happens only when both the phase and the absorption
    /// vanish.
    pub fn resonance_factor(&self, params: &PhysicsParameters, length_m: f64) -> Option<f64> {
        match *self {
            Precision::Double => resonance_factor_double(params, length_m),

            #[cfg(feature = "mpfr")]
            Precision::Extended { digits } => extended::resonance_factor(params, length_m, digits),

            Precision::Auto => resonance_factor_auto(params, length_m),
        }
    }
}


#[cfg(feature = "mpfr")]
fn resonance_factor_auto(params: &PhysicsParameters, length_m: f64) -> Option<f64> {
    let gamma_l = params.absorption_exponent(length_m * 1000.);

    if Precision::is_cancellation_prone(params, gamma_l) {
        extended::resonance_factor(params, length_m, DEFAULT_EXTENDED_DIGITS)
    } else {
        resonance_factor_double(params, length_m)
    }
}

#[cfg(not(feature = "mpfr"))]
fn resonance_factor_auto(params: &PhysicsParameters, length_m: f64) -> Option<f64> {
    resonance_factor_double(params, length_m)
}


fn resonance_factor_double(params: &PhysicsParameters, length_m: f64) -> Option<f64> {
    let phi = params.phase(length_m * 1000.);
    let gamma_l = params.absorption_exponent(length_m * 1000.);

    let denom = phi * phi + 0.25 * gamma_l * gamma_l;

    if denom == 0. {
        return None;
    }

    let half_exp = (-0.5 * gamma_l).exp();
    let one_minus = -(-0.5 * gamma_l).exp_m1();
    let sin_half = (0.5 * phi).sin();

    Some((one_minus * one_minus + 4. * half_exp * sin_half * sin_half) / denom)
}


#[cfg(feature = "mpfr")]
mod extended {
    use rug::Float;

    use crate::METER_IN_INV_EV;
    use crate::conversion::PhysicsParameters;

    /// The MPFR precision in bits needed to hold `digits` decimal digits.
    pub fn digits_to_bits(digits: u32) -> u32 {
        (digits as f64 * std::f64::consts::LOG2_10).ceil() as u32
    }

    pub fn resonance_factor(params: &PhysicsParameters, length_m: f64, digits: u32) -> Option<f64> {
        let prec = digits_to_bits(digits);

        let ma = Float::with_val(prec, params.axion_mass);
        let mg = Float::with_val(prec, params.photon_mass);
        let length = Float::with_val(prec, length_m);

        let q = Float::with_val(prec, &ma * &ma) - Float::with_val(prec, &mg * &mg);
        let q = q / (2. * params.energy) / 1000u32;
        let phi = q * length.clone() * METER_IN_INV_EV;
        let gamma_l = Float::with_val(prec, params.absorption) * length * 100u32;

        let denom = Float::with_val(prec, &phi * &phi) + Float::with_val(prec, &gamma_l * &gamma_l) / 4u32;

        if denom.is_zero() {
            return None;
        }

        let half = gamma_l.clone() / 2u32;
        let osc = Float::with_val(prec, 1) + (-gamma_l).exp()
            - Float::with_val(prec, 2) * (-half).exp() * phi.cos();

        Some((osc / denom).to_f64())
    }
}


#[cfg(test)]
mod tests {
    use crate::conversion::PhysicsParameters;
    use super::Precision;

    fn naive(params: &PhysicsParameters, length_m: f64) -> f64 {
        let phi = params.phase(length_m * 1000.);
        let gl = params.absorption_exponent(length_m * 1000.);
        (1. + (-gl).exp() - 2. * (-gl / 2.).exp() * phi.cos()) / (phi * phi + gl * gl / 4.)
    }

    #[test]
    fn double_matches_naive_form_when_well_conditioned() {
        let p = PhysicsParameters { energy: 4.2, axion_mass: 0.02, photon_mass: 0.01, absorption: 1e-3 };
        let f = Precision::Double.resonance_factor(&p, 10.).unwrap();
        assert_approx_eq!(f, naive(&p, 10.), 1e-9 * f);
    }

    #[test]
    fn coherent_limit_is_one() {
        // phi and Gamma L both tiny: M times the oscillation term tends to 1.
        let p = PhysicsParameters { energy: 4.2, axion_mass: 1e-7, photon_mass: 0., absorption: 0. };
        let f = Precision::Double.resonance_factor(&p, 1.).unwrap();
        assert_approx_eq!(f, 1., 1e-9);
    }

    #[test]
    fn singular_factor() {
        let p = PhysicsParameters { energy: 4.2, axion_mass: 0.1, photon_mass: 0.1, absorption: 0. };
        assert_eq!(Precision::Double.resonance_factor(&p, 1.), None);
        assert!(Precision::is_cancellation_prone(&p, 0.));
    }

    #[test]
    fn auto_falls_back_sensibly() {
        let p = PhysicsParameters { energy: 4.2, axion_mass: 0.02, photon_mass: 0.01, absorption: 1e-3 };
        let a = Precision::Auto.resonance_factor(&p, 10.).unwrap();
        let d = Precision::Double.resonance_factor(&p, 10.).unwrap();
        assert_approx_eq!(a, d, 1e-12 * d);
    }

    #[cfg(feature = "mpfr")]
    #[test]
    fn extended_agrees_with_double() {
        let p = PhysicsParameters { energy: 4.2, axion_mass: 0.02, photon_mass: 0.01, absorption: 1e-3 };
        let e = Precision::Extended { digits: 100 }.resonance_factor(&p, 10.).unwrap();
        let d = Precision::Double.resonance_factor(&p, 10.).unwrap();
        assert_approx_eq!(e, d, 1e-9 * d);
    }

    #[cfg(feature = "mpfr")]
    #[test]
    fn extended_resolves_near_degenerate_masses() {
        let p = PhysicsParameters { energy: 4.2, axion_mass: 0.1 + 1e-12, photon_mass: 0.1, absorption: 0. };
        let e = Precision::Extended { digits: 100 }.resonance_factor(&p, 10.).unwrap();
        assert_approx_eq!(e, 1., 1e-6);
    }
}
