// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

//! Particle tracks and the pieces of them that lie inside a field.

use nalgebra::Vector3;

use crate::error::InvalidInputError;


/// A straight particle track: an origin and a direction of travel.
///
/// The direction does not have to be normalized, but it cannot be zero.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Ray {
    origin: Vector3<f64>,
    direction: Vector3<f64>,
    unit: Vector3<f64>,
}

impl Ray {
    /// Create a new ray, failing if the direction is zero or anything is not
    /// finite.
    pub fn new(origin: Vector3<f64>, direction: Vector3<f64>) -> Result<Self, InvalidInputError> {
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(InvalidInputError::NonFinite("ray origin"));
        }

        if !direction.iter().all(|c| c.is_finite()) {
            return Err(InvalidInputError::NonFinite("ray direction"));
        }

        let norm = direction.norm();

        if norm == 0. {
            return Err(InvalidInputError::ZeroDirection);
        }

        Ok(Ray { origin, direction, unit: direction / norm })
    }

    /// The starting point of the ray.
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    /// The direction as it was given.
    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    /// The normalized direction.
    pub fn unit_direction(&self) -> &Vector3<f64> {
        &self.unit
    }

    /// The point at arc length `t` (mm) from the origin.
    pub fn at(&self, t: f64) -> Vector3<f64> {
        self.origin + self.unit * t
    }

    /// The index of the direction component with the largest magnitude. Ties
    /// go to the later axis, so a ray along the diagonal scans in *z*.
    pub fn dominant_axis(&self) -> usize {
        let mut best = 0;

        for i in 1..3 {
            if self.unit[i].abs() >= self.unit[best].abs() {
                best = i;
            }
        }

        best
    }

    /// The same track travelled the other way, starting from `origin`.
    pub fn reversed_from(&self, origin: Vector3<f64>) -> Self {
        Ray { origin, direction: -self.direction, unit: -self.unit }
    }
}


/// The stretch of a track between the point where it enters a region of
/// non-zero field and the point where it leaves it again.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct FieldSegment {
    entry: Vector3<f64>,
    exit: Vector3<f64>,
}

impl FieldSegment {
    /// Create a segment. Returns `None` if the two points coincide, since
    /// such a segment has no length to integrate over.
    pub fn new(entry: Vector3<f64>, exit: Vector3<f64>) -> Option<Self> {
        if entry == exit {
            None
        } else {
            Some(FieldSegment { entry, exit })
        }
    }

    /// Where the track enters the field region.
    pub fn entry(&self) -> &Vector3<f64> {
        &self.entry
    }

    /// Where the track leaves the field region.
    pub fn exit(&self) -> &Vector3<f64> {
        &self.exit
    }

    /// The distance between entry and exit, in mm.
    pub fn length(&self) -> f64 {
        (self.exit - self.entry).norm()
    }

    /// The point a fraction `f` of the way from entry to exit.
    pub fn interpolate(&self, f: f64) -> Vector3<f64> {
        self.entry + (self.exit - self.entry) * f
    }
}
