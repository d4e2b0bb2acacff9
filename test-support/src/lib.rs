// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

//! Helpers shared by the tests, benchmarks, and demo programs.

#[macro_use] extern crate slog;

use nalgebra::Vector3;
use slog::Drain;

/// Create a simple `slog` logger for use in test programs.
///
/// It logs to the terminal using default parameters, as per the `slog` basic
/// example. This just saves us ~8 lines of boilerplate in all of our
/// test/demo programs.
pub fn default_log() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build().fuse();
    slog::Logger::root(drain, o!())
}


/// A simple utility for sampling random numbers.
///
/// The distribution can be uniform or log-uniform.
pub struct Sampler {
    is_log: bool,
    low: f64,
    range: f64
}

impl Sampler {
    /// Create a new Sampler.
    pub fn new(is_log: bool, mut low: f64, mut high: f64) -> Self {
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }

        if is_log {
            low = low.ln();
            high = high.ln();
        }

        Sampler { is_log, low, range: high - low }
    }

    /// Sample a number from the distribution.
    pub fn get(&self) -> f64 {
        let n = self.low + rand::random::<f64>() * self.range;

        if self.is_log {
            n.exp()
        } else {
            n
        }
    }
}


/// A synthetic magnet bore: the field `b` (T) fills the box `|x|, |y| <=
/// half_width` and `z0 <= z <= z1` (mm), and is zero elsewhere.
///
/// Closures of this shape can be handed straight to the propagation code as
/// field models.
pub fn box_field(b: Vector3<f64>, half_width: f64, z0: f64, z1: f64)
    -> impl Fn(&Vector3<f64>) -> Vector3<f64> + Copy
{
    move |p: &Vector3<f64>| {
        if p.x.abs() <= half_width && p.y.abs() <= half_width && p.z >= z0 && p.z <= z1 {
            b
        } else {
            Vector3::zeros()
        }
    }
}


/// Two bores of the same cross-section lined up along z, separated by a
/// field-free gap.
pub fn two_boxes(b: Vector3<f64>, half_width: f64, first: (f64, f64), second: (f64, f64))
    -> impl Fn(&Vector3<f64>) -> Vector3<f64> + Copy
{
    let one = box_field(b, half_width, first.0, first.1);
    let two = box_field(b, half_width, second.0, second.1);
    move |p: &Vector3<f64>| one(p) + two(p)
}


/// A field map with no field anywhere.
pub fn zero_field(_p: &Vector3<f64>) -> Vector3<f64> {
    Vector3::zeros()
}


/// A bore whose transverse field ramps linearly from `b0` at `z0` to `b1` at
/// `z1`, pointing along x.
pub fn ramp_field(b0: f64, b1: f64, half_width: f64, z0: f64, z1: f64)
    -> impl Fn(&Vector3<f64>) -> Vector3<f64> + Copy
{
    move |p: &Vector3<f64>| {
        if p.x.abs() <= half_width && p.y.abs() <= half_width && p.z >= z0 && p.z <= z1 {
            let f = (p.z - z0) / (z1 - z0);
            Vector3::new(b0 + f * (b1 - b0), 0., 0.)
        } else {
            Vector3::zeros()
        }
    }
}
