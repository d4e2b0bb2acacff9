// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! Propagate axions through magnetic field volumes and compute their
probability of converting into photons.

A relativistic axion travelling through a transverse magnetic field has a
small probability of turning into an X-ray photon. Helioscopes and
laboratory experiments exploit this, and simulation pipelines need to know,
particle by particle, how large that probability is given an arbitrary field
map and an optional buffer gas filling the magnet bore.

The computation runs in three stages:

1. [`boundary`] walks along the particle track and brackets every contiguous
   region where the field is non-zero.
2. [`profile`] samples the field component transverse to the track inside
   each region.
3. [`conversion`] evaluates the van Bibber relation, either with the average
   field over the coherence length or by integrating the complex amplitude
   along the sampled profile.

[`propagation`] strings these together for one particle at a time.

The field model and the buffer gas are external to this crate. They are
reached through the [`FieldSampler`] and [`Medium`] traits and are only ever
borrowed, so a single field map can serve any number of particles (and
threads).

Units are fixed throughout: millimetres for positions and lengths, tesla for
fields, keV for the axion energy, eV for masses and inverse centimetres for
absorption coefficients.

*/

#![deny(missing_docs)]

#[cfg(test)] #[macro_use] extern crate assert_approx_eq;
#[macro_use] extern crate slog;

pub use nalgebra::Vector3;

pub mod boundary;
pub mod conversion;
pub mod error;
pub mod geometry;
pub mod precision;
pub mod profile;
pub mod propagation;

pub use boundary::{trace_boundaries, TraceSettings};
pub use conversion::{ConversionResult, PhysicsParameters};
pub use error::{ConfigurationError, InvalidInputError, PropagationError};
pub use geometry::{FieldSegment, Ray};
pub use precision::Precision;
pub use profile::{FieldProfile, ProfileResolution};
pub use propagation::{Axion, FieldPropagation, FieldPropagationBuilder, Observables,
                      ProbabilityMode, SegmentObservables};


/// The speed of light in SI (meters per second).
pub const SPEED_LIGHT: f64 = 2.99792458e8;

/// The electron charge in natural (Heaviside-Lorentz) units, `sqrt(4 pi alpha)`.
pub const NATURAL_ELECTRON: f64 = 0.30282212;

/// The reduced Planck constant times the speed of light, in eV meters.
pub const HBAR_C: f64 = 1.973269804e-7;

/// One meter expressed in inverse eV.
pub const METER_IN_INV_EV: f64 = 1. / HBAR_C;

/// The axion-photon coupling that all probabilities are normalized to, in
/// inverse GeV.
pub const REFERENCE_COUPLING: f64 = 1e-10;

/// One tesla meter expressed in GeV.
pub const TESLA_METER_IN_GEV: f64 = SPEED_LIGHT / NATURAL_ELECTRON * 1e-9;


/// A magnetic field model that can be queried at arbitrary points.
///
/// Positions are in millimetres and the returned field is in tesla. A zero
/// vector means that there is no field at that point; the boundary tracer
/// relies on exact zeros to find where field regions begin and end, so
/// models should not return tiny residual values outside their volumes.
///
/// Implementations must be pure: the same point always gives the same field.
pub trait FieldSampler {
    /// Evaluate the magnetic field vector at `point`.
    fn field_at(&self, point: &Vector3<f64>) -> Vector3<f64>;
}

impl<F> FieldSampler for F where F: Fn(&Vector3<f64>) -> Vector3<f64> {
    fn field_at(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self(point)
    }
}


/// A field that is constant everywhere inside an axis-aligned box and zero
/// outside it.
///
/// This is the simplest model of a dipole magnet bore and is mostly useful
/// for checking results against the closed-form probability.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct UniformField {
    field: Vector3<f64>,
    lower: Vector3<f64>,
    upper: Vector3<f64>,
}

impl UniformField {
    /// Create a field of value `field` (in T) filling the box spanned by the
    /// corners `a` and `b` (in mm). The corners may be given in any order.
    pub fn new(field: Vector3<f64>, a: Vector3<f64>, b: Vector3<f64>) -> Self {
        UniformField {
            field: field,
            lower: a.inf(&b),
            upper: a.sup(&b),
        }
    }

    /// Whether `point` lies inside the box, boundaries included.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.lower[i] && point[i] <= self.upper[i])
    }
}

impl FieldSampler for UniformField {
    fn field_at(&self, point: &Vector3<f64>) -> Vector3<f64> {
        if self.contains(point) {
            self.field
        } else {
            Vector3::zeros()
        }
    }
}


/// The medium filling the field volume, typically a buffer gas.
///
/// The medium gives the photon an effective mass and absorbs it. Both depend
/// on the photon energy, which equals the axion energy (in keV).
pub trait Medium {
    /// The effective photon mass in eV.
    fn photon_mass(&self, energy: f64) -> f64;

    /// The photon absorption coefficient in inverse centimetres.
    fn absorption_coefficient(&self, energy: f64) -> f64;
}

/// Empty space: massless photons and no absorption.
#[derive(Copy,Clone,Debug,Default,Eq,Hash,PartialEq)]
pub struct Vacuum;

impl Medium for Vacuum {
    fn photon_mass(&self, _energy: f64) -> f64 {
        0.
    }

    fn absorption_coefficient(&self, _energy: f64) -> f64 {
        0.
    }
}

/// A medium whose photon mass and absorption do not depend on energy.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ConstantMedium {
    /// The effective photon mass in eV.
    pub photon_mass: f64,

    /// The absorption coefficient in inverse centimetres.
    pub absorption: f64,
}

impl Medium for ConstantMedium {
    fn photon_mass(&self, _energy: f64) -> f64 {
        self.photon_mass
    }

    fn absorption_coefficient(&self, _energy: f64) -> f64 {
        self.absorption
    }
}
