// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! The axion-photon conversion probability.

We use the relation of [van Bibber et al. (1989;
DOI:10.1103/PhysRevD.39.2089)](https://dx.doi.org/10.1103/PhysRevD.39.2089)
for an axion of energy `Ea` and mass `ma` crossing a transverse field `B`
over a coherence length `L`, inside a medium that gives the photon a mass
`mg` and absorbs it with coefficient `Gamma`:

```text
P = (B L / 2)^2 M (1 + exp(-Gamma L) - 2 exp(-Gamma L / 2) cos(q L))
M = 1 / ((q L)^2 + (Gamma L / 2)^2)
q = (ma^2 - mg^2) / (2 Ea)
```

All probabilities are normalized to an axion-photon coupling of 1e-10
GeV^-1; they scale with the square of the coupling.

There are two ways to evaluate this. [`probability_average_field`] plugs an
average field straight into the closed form. [`probability_field_profile`]
instead integrates the complex conversion amplitude along a sampled field
profile, which handles fields that vary along the track. For a uniform
profile the two agree.

*/

use num_complex::Complex64;
use slog::Logger;

use crate::{Medium, METER_IN_INV_EV, REFERENCE_COUPLING, TESLA_METER_IN_GEV};
use crate::error::InvalidInputError;
use crate::precision::Precision;
use crate::profile::FieldProfile;


/// The physical inputs to a conversion probability, apart from the field.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct PhysicsParameters {
    /// The axion energy, in keV.
    pub energy: f64,

    /// The axion mass, in eV.
    pub axion_mass: f64,

    /// The effective photon mass in the medium, in eV.
    pub photon_mass: f64,

    /// The photon absorption coefficient of the medium, in cm^-1.
    pub absorption: f64,
}

impl PhysicsParameters {
    /// Parameters for an axion travelling through vacuum.
    pub fn vacuum(energy: f64, axion_mass: f64) -> Self {
        PhysicsParameters {
            energy,
            axion_mass,
            photon_mass: 0.,
            absorption: 0.,
        }
    }

    /// Parameters for an axion travelling through `medium`, which is queried
    /// at the axion energy.
    pub fn in_medium<M: Medium + ?Sized>(energy: f64, axion_mass: f64, medium: &M) -> Self {
        PhysicsParameters {
            energy,
            axion_mass,
            photon_mass: medium.photon_mass(energy),
            absorption: medium.absorption_coefficient(energy),
        }
    }

    /// Check that every parameter is in its physical range.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        InvalidInputError::check_positive("axion energy", self.energy)?;
        InvalidInputError::check_non_negative("axion mass", self.axion_mass)?;
        InvalidInputError::check_non_negative("photon mass", self.photon_mass)?;
        InvalidInputError::check_non_negative("absorption coefficient", self.absorption)?;
        Ok(())
    }

    /// Whether both the axion and the photon are massless, in which case the
    /// conversion is fully coherent.
    pub fn is_massless(&self) -> bool {
        self.axion_mass == 0. && self.photon_mass == 0.
    }

    /// The momentum transfer `q = (ma^2 - mg^2) / 2 Ea`, in eV.
    pub fn momentum_transfer(&self) -> f64 {
        (self.axion_mass - self.photon_mass) * (self.axion_mass + self.photon_mass)
            / (2. * self.energy * 1000.)
    }

    /// The phase mismatch `q L` accumulated over `length` mm.
    pub fn phase(&self, length: f64) -> f64 {
        self.momentum_transfer() * length * 1e-3 * METER_IN_INV_EV
    }

    /// The absorption exponent `Gamma L` over `length` mm.
    pub fn absorption_exponent(&self, length: f64) -> f64 {
        self.absorption * length * 0.1
    }

    /// The fraction of photons that survive `length` mm of the medium.
    pub fn transmission(&self, length: f64) -> f64 {
        (-self.absorption_exponent(length)).exp()
    }
}


/// The outcome of a conversion probability calculation.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ConversionResult {
    /// The conversion probability for a coupling of 1e-10 GeV^-1. This is
    /// not clamped, so at extreme parameters rounding can push it a hair
    /// outside of [0, 1].
    pub probability: f64,

    /// The coherence length that was used, in mm.
    pub coherence_length: f64,

    /// The field strength that was used, or the profile average, in T.
    pub field_average: f64,
}


/// The product `B L` in natural units (GeV^2 times the reference coupling,
/// so dimensionless). `b` is in T and `length` in mm.
pub fn bl(b: f64, length: f64) -> f64 {
    length * 1e-3 * b * TESLA_METER_IN_GEV * REFERENCE_COUPLING
}

/// The fully coherent conversion probability `(B L / 2)^2`. `b` is in T and
/// `length` in mm.
pub fn bl_half_squared(b: f64, length: f64) -> f64 {
    let half = 0.5 * bl(b, length);
    half * half
}


fn finite_probability(p: f64) -> Result<f64, InvalidInputError> {
    if p.is_finite() {
        Ok(p)
    } else {
        Err(InvalidInputError::NonFinite("conversion probability"))
    }
}


/// Compute the conversion probability for a field of strength `b` (in T)
/// that is uniform over `length` mm.
///
/// When both the axion and the photon are massless and nothing is absorbed,
/// this is exactly `(B L / 2)^2`. That value is also returned, with a warning, if the masses are
/// equal and there is no absorption; it is the limit of the general formula
/// there, which itself cannot be evaluated.
pub fn probability_average_field(
    b: f64, length: f64, params: &PhysicsParameters, precision: Precision, logger: &Logger
) -> Result<ConversionResult, InvalidInputError> {
    InvalidInputError::check_non_negative("field strength", b)?;
    InvalidInputError::check_non_negative("coherence length", length)?;
    params.validate()?;

    let result = |probability| ConversionResult {
        probability,
        coherence_length: length,
        field_average: b,
    };

    trace!(logger, "van Bibber probability";
           "b" => b,
           "length" => length,
           "energy" => params.energy,
           "axion_mass" => params.axion_mass,
           "photon_mass" => params.photon_mass,
           "absorption" => params.absorption,
           "precision" => ?precision,
    );

    if b == 0. || length == 0. {
        return Ok(result(0.));
    }

    let coherent = bl_half_squared(b, length);

    if params.is_massless() && params.absorption == 0. {
        trace!(logger, "massless case"; "bl_half_squared" => coherent);
        return Ok(result(coherent));
    }

    trace!(logger, ". intermediate values";
           "q" => params.momentum_transfer(),
           "phi" => params.phase(length),
           "gamma_l" => params.absorption_exponent(length),
    );

    let factor = match precision.resonance_factor(params, length * 1e-3) {
        Some(f) => f,
        None => {
            warn!(logger, "phase and absorption both vanish; using the coherent limit";
                  "axion_mass" => params.axion_mass, "photon_mass" => params.photon_mass,
                  "energy" => params.energy, "length" => length);
            1.
        },
    };

    let p = finite_probability(factor * coherent)?;
    trace!(logger, ". result"; "factor" => factor, "bl_half_squared" => coherent, "probability" => p);
    Ok(result(p))
}


/// Compute the conversion probability by integrating the conversion
/// amplitude along a sampled transverse field profile.
///
/// The amplitude picked up at position `x` is attenuated by the absorption
/// over the remaining `L - x` and rotated by the phase `q x`. The real and
/// imaginary parts are integrated with the trapezoidal rule.
pub fn probability_field_profile(
    profile: &FieldProfile, params: &PhysicsParameters, logger: &Logger
) -> Result<ConversionResult, InvalidInputError> {
    params.validate()?;

    let values = profile.values();
    let length = profile.length();
    let last = (values.len() - 1) as f64;

    let phi = params.phase(length);
    let gamma_l = params.absorption_exponent(length);

    trace!(logger, "profile-integrated probability";
           "n" => values.len(),
           "length" => length,
           "energy" => params.energy,
           "axion_mass" => params.axion_mass,
           "phi" => phi,
           "gamma_l" => gamma_l,
    );

    let amplitude = |i: usize, b: f64| {
        let x = i as f64 / last;
        let attenuation = (0.5 * gamma_l * (x - 1.)).exp();
        Complex64::from_polar(b * attenuation, -phi * x)
    };

    let mut sum = Complex64::new(0., 0.);

    for (i, b) in values.iter().enumerate() {
        sum += amplitude(i, *b);
    }

    sum -= 0.5 * (amplitude(0, values[0]) + amplitude(values.len() - 1, values[values.len() - 1]));

    // The integral is over meters, in which the (B L / 2)^2 normalization is
    // expressed.
    let integral = sum * (profile.step() * 1e-3);
    let norm = 0.5 * TESLA_METER_IN_GEV * REFERENCE_COUPLING;
    let p = finite_probability(norm * norm * integral.norm_sqr())?;

    trace!(logger, ". result"; "re" => integral.re, "im" => integral.im, "probability" => p);

    Ok(ConversionResult {
        probability: p,
        coherence_length: length,
        field_average: profile.average(),
    })
}
