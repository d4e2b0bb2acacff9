// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

//! Error types.
//!
//! Configuration problems are fatal and are detected when a
//! [`FieldPropagation`](crate::FieldPropagation) is built. Invalid input only
//! affects the particle it came with; batch processing records the error and
//! moves on. A particle that never crosses a field region is not an error at
//! all.

use nalgebra::Vector3;
use thiserror::Error;


/// Problems with how a propagation was set up.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// No magnetic field model was assigned.
    #[error("no magnetic field model was defined")]
    MissingField,

    /// A numeric setting is outside of its allowed range.
    #[error("invalid setting `{name}` = {value}: {reason}")]
    InvalidSetting {
        /// The name of the setting.
        name: &'static str,
        /// The offending value.
        value: f64,
        /// What the value should have been.
        reason: &'static str,
    },
}


/// Problems with the inputs describing a single particle or computation.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum InvalidInputError {
    /// A ray direction was the zero vector.
    #[error("ray direction is the zero vector")]
    ZeroDirection,

    /// A quantity that must be finite was NaN or infinite.
    #[error("`{0}` is not finite")]
    NonFinite(&'static str),

    /// A quantity that must be non-negative was negative.
    #[error("`{name}` must not be negative (got {value})")]
    Negative {
        /// The name of the quantity.
        name: &'static str,
        /// Its value.
        value: f64,
    },

    /// A quantity that must be strictly positive was not.
    #[error("`{name}` must be positive (got {value})")]
    NotPositive {
        /// The name of the quantity.
        name: &'static str,
        /// Its value.
        value: f64,
    },

    /// A field profile had too few samples to be integrated.
    #[error("a field profile needs at least 2 samples (got {0})")]
    ProfileTooShort(usize),
}

impl InvalidInputError {
    /// Check that `value` is finite and not negative.
    pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            Err(InvalidInputError::NonFinite(name))
        } else if value < 0. {
            Err(InvalidInputError::Negative { name, value })
        } else {
            Ok(value)
        }
    }

    /// Check that `value` is finite and strictly positive.
    pub fn check_positive(name: &'static str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            Err(InvalidInputError::NonFinite(name))
        } else if value <= 0. {
            Err(InvalidInputError::NotPositive { name, value })
        } else {
            Ok(value)
        }
    }
}


/// A failure to propagate one particle, with enough context to reproduce it.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("cannot propagate axion (position {position:?} mm, direction {direction:?}, \
         energy {energy} keV, mass {mass} eV): {source}")]
pub struct PropagationError {
    /// The particle position.
    pub position: [f64; 3],
    /// The particle direction.
    pub direction: [f64; 3],
    /// The particle energy.
    pub energy: f64,
    /// The axion mass.
    pub mass: f64,
    /// What went wrong.
    #[source]
    pub source: InvalidInputError,
}

impl PropagationError {
    /// Attach particle context to an input error.
    pub fn new(position: &Vector3<f64>, direction: &Vector3<f64>, energy: f64, mass: f64,
               source: InvalidInputError) -> Self {
        PropagationError {
            position: [position.x, position.y, position.z],
            direction: [direction.x, direction.y, direction.z],
            energy,
            mass,
            source,
        }
    }
}
