// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! Sample the transverse magnetic field along a field segment.

Only the component of the field perpendicular to the direction of travel
couples the axion to the photon, so that is what we record.

*/

use nalgebra::Vector3;

use crate::FieldSampler;
use crate::error::InvalidInputError;
use crate::geometry::FieldSegment;


/// The number of samples taken along a segment when nothing else is asked
/// for.
pub const DEFAULT_SAMPLES: usize = 10_000;


/// How densely to sample a segment.
#[derive(Copy,Clone,Debug,PartialEq)]
pub enum ProfileResolution {
    /// A fixed number of samples, endpoints included.
    Samples(usize),

    /// A maximum spacing between samples, in mm. The segment is split into
    /// as many equal steps as needed to stay at or below it.
    Step(f64),
}

impl Default for ProfileResolution {
    fn default() -> Self {
        ProfileResolution::Samples(DEFAULT_SAMPLES)
    }
}

impl ProfileResolution {
    /// The number of samples to take along a segment of the given length.
    pub fn samples_for(&self, length: f64) -> Result<usize, InvalidInputError> {
        match *self {
            ProfileResolution::Samples(n) => Ok(n),
            ProfileResolution::Step(step) => {
                let step = InvalidInputError::check_positive("integration step", step)?;
                let length = InvalidInputError::check_non_negative("segment length", length)?;
                Ok(((length / step).ceil() as usize + 1).max(2))
            },
        }
    }
}


/// The transverse field strength sampled at equal arc-length intervals
/// along a path.
#[derive(Clone,Debug,PartialEq)]
pub struct FieldProfile {
    values: Vec<f64>,
    step: f64,
}

impl FieldProfile {
    /// Wrap a set of samples taken `step` mm apart.
    ///
    /// There must be at least two samples, the step must be positive, and
    /// the field strengths cannot be negative.
    pub fn new(values: Vec<f64>, step: f64) -> Result<Self, InvalidInputError> {
        if values.len() < 2 {
            return Err(InvalidInputError::ProfileTooShort(values.len()));
        }

        InvalidInputError::check_positive("profile step", step)?;

        for v in &values {
            InvalidInputError::check_non_negative("transverse field", *v)?;
        }

        Ok(FieldProfile { values, step })
    }

    /// A profile of `n` identical samples covering `length` mm.
    pub fn uniform(b: f64, length: f64, n: usize) -> Result<Self, InvalidInputError> {
        if n < 2 {
            return Err(InvalidInputError::ProfileTooShort(n));
        }

        FieldProfile::new(vec![b; n], length / (n - 1) as f64)
    }

    /// The samples, in tesla.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The spacing between samples, in mm.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// The distance from the first to the last sample, in mm.
    pub fn length(&self) -> f64 {
        self.step * (self.values.len() - 1) as f64
    }

    /// The mean of the samples.
    pub fn average(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}


/// The magnitude of the part of `b` perpendicular to `direction`.
///
/// `direction` does not need to be normalized but must not be zero.
pub fn transverse_component(b: &Vector3<f64>, direction: &Vector3<f64>) -> f64 {
    let u = direction.normalize();
    (b - u * b.dot(&u)).norm()
}


/// Sample the transverse field at `n` evenly spaced points from the entry of
/// `segment` to its exit, both included.
pub fn sample_profile<F: FieldSampler + ?Sized>(
    field: &F, segment: &FieldSegment, direction: &Vector3<f64>, n: usize
) -> Result<FieldProfile, InvalidInputError> {
    if n < 2 {
        return Err(InvalidInputError::ProfileTooShort(n));
    }

    if direction.norm() == 0. {
        return Err(InvalidInputError::ZeroDirection);
    }

    let last = (n - 1) as f64;

    let values = (0..n)
        .map(|i| {
            let b = field.field_at(&segment.interpolate(i as f64 / last));
            transverse_component(&b, direction)
        })
        .collect();

    FieldProfile::new(values, segment.length() / last)
}
