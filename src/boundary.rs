// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! Find where a particle track enters and leaves regions of magnetic field.

The field model is a black box, so the only thing we can ask it is whether
the field is zero at a given point. We walk along the track in coarse steps
until that answer changes, then bisect the last step until the bracket is
smaller than the requested resolution. The search is confined to a slab
`|x_k| <= search_domain`, where `x_k` is the coordinate along which the
track advances fastest; outside the slab the field is assumed to vanish.

Boundaries are always reported on the zero-field side of the final bracket,
so a traced segment contains the whole region it brackets and overshoots it
by less than `min_step` at each end. Tracing the same track backwards
therefore gives the same two points to within `min_step`.

A zero-field gap shorter than `coarse_step` can be stepped over, in which
case the regions on either side are merged into one segment.

*/

use slog::Logger;

use crate::FieldSampler;
use crate::error::ConfigurationError;
use crate::geometry::{FieldSegment, Ray};


/// Numerical settings for the boundary search. All values are in mm.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct TraceSettings {
    /// The half-width of the slab, along the dominant axis of the track,
    /// outside of which the field is taken to be zero.
    pub search_domain: f64,

    /// The length of the coarse steps taken along the track.
    pub coarse_step: f64,

    /// The precision to which boundaries are resolved.
    pub min_step: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        TraceSettings {
            search_domain: 10_000.,
            coarse_step: 5.,
            min_step: 0.01,
        }
    }
}

impl TraceSettings {
    /// Check that the settings describe a search that terminates.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        fn check(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
            if value.is_finite() && value > 0. {
                Ok(())
            } else {
                Err(ConfigurationError::InvalidSetting {
                    name,
                    value,
                    reason: "must be finite and positive",
                })
            }
        }

        check("search_domain", self.search_domain)?;
        check("coarse_step", self.coarse_step)?;
        check("min_step", self.min_step)?;

        if self.coarse_step < self.min_step {
            return Err(ConfigurationError::InvalidSetting {
                name: "coarse_step",
                value: self.coarse_step,
                reason: "must not be smaller than min_step",
            });
        }

        Ok(())
    }
}


/// Trace `ray` through `field` and return every segment along which the
/// field is non-zero, in the order the ray crosses them.
///
/// An empty result means that the ray does not cross any field region; that
/// is a perfectly good answer, not an error.
pub fn trace_boundaries<F: FieldSampler + ?Sized>(
    field: &F, ray: &Ray, settings: &TraceSettings, logger: &Logger
) -> Result<Vec<FieldSegment>, ConfigurationError> {
    settings.validate()?;
    Ok(trace_validated(field, ray, settings, logger))
}


/// The body of [`trace_boundaries`], for callers that have already
/// validated `settings`.
pub(crate) fn trace_validated<F: FieldSampler + ?Sized>(
    field: &F, ray: &Ray, settings: &TraceSettings, logger: &Logger
) -> Vec<FieldSegment> {
    let mut segments = Vec::new();

    let tracer = match Tracer::new(field, ray, settings, logger) {
        Some(t) => t,
        None => {
            debug!(logger, "track never enters the search domain";
                   "origin" => ?ray.origin(), "direction" => ?ray.direction());
            return segments;
        }
    };

    let mut t = tracer.t_lo;

    while let Some((entry, exit)) = tracer.next_segment(t) {
        match FieldSegment::new(ray.at(entry), ray.at(exit)) {
            Some(seg) => {
                debug!(logger, "found field segment";
                       "entry" => ?seg.entry(), "exit" => ?seg.exit(), "length" => seg.length());
                segments.push(seg);
            },
            None => {
                warn!(logger, "dropping field region with no resolvable length";
                      "origin" => ?ray.origin(), "direction" => ?ray.direction(),
                      "t" => entry, "min_step" => settings.min_step);
            },
        }

        if exit >= tracer.t_hi {
            break;
        }

        t = exit;
    }

    segments
}


struct Tracer<'a, F: 'a + ?Sized> {
    field: &'a F,
    ray: &'a Ray,
    logger: &'a Logger,
    coarse_step: f64,
    min_step: f64,
    t_lo: f64,
    t_hi: f64,
}

impl<'a, F: 'a + FieldSampler + ?Sized> Tracer<'a, F> {
    /// Work out the range of arc lengths that lie inside the search slab.
    /// Returns `None` if the forward ray never touches it.
    fn new(field: &'a F, ray: &'a Ray, settings: &TraceSettings, logger: &'a Logger) -> Option<Self> {
        let axis = ray.dominant_axis();
        let o = ray.origin()[axis];
        let u = ray.unit_direction()[axis];

        // `u` is the largest component of a unit vector, so it is at least
        // 1/sqrt(3) in magnitude.
        let t1 = (-settings.search_domain - o) / u;
        let t2 = (settings.search_domain - o) / u;
        let t_lo = t1.min(t2).max(0.);
        let t_hi = t1.max(t2);

        trace!(logger, "search interval"; "axis" => axis, "t_lo" => t_lo, "t_hi" => t_hi);

        if t_hi < t_lo {
            return None;
        }

        Some(Tracer {
            field,
            ray,
            logger,
            coarse_step: settings.coarse_step,
            min_step: settings.min_step,
            t_lo,
            t_hi,
        })
    }

    fn in_field(&self, t: f64) -> bool {
        self.field.field_at(&self.ray.at(t)).iter().any(|c| *c != 0.)
    }

    /// Find the next segment at or after arc length `start`, returning the
    /// arc lengths of its entry and exit.
    fn next_segment(&self, start: f64) -> Option<(f64, f64)> {
        let mut t = start;

        let (entry, inside) = if self.in_field(t) {
            (t, t)
        } else {
            loop {
                if t >= self.t_hi {
                    return None;
                }

                let probe = (t + self.coarse_step).min(self.t_hi);

                if probe <= t {
                    self.stalled(t);
                    return None;
                }

                if self.in_field(probe) {
                    break self.refine(t, probe);
                }

                t = probe;
            }
        };

        let mut t = inside;

        let exit = loop {
            if t >= self.t_hi {
                break self.t_hi;
            }

            let probe = (t + self.coarse_step).min(self.t_hi);

            if probe <= t {
                self.stalled(t);
                break self.t_hi;
            }

            if !self.in_field(probe) {
                break self.refine(probe, t).0;
            }

            t = probe;
        };

        Some((entry, exit))
    }

    /// The coarse step has vanished below the resolution of `t`; the scan is
    /// abandoned as though the domain bound had been reached.
    fn stalled(&self, t: f64) {
        warn!(self.logger, "coarse step not resolvable along the track; ending the scan";
              "origin" => ?self.ray.origin(), "direction" => ?self.ray.direction(),
              "t" => t, "coarse_step" => self.coarse_step);
    }

    /// Bisect between a zero-field point `outside` and a non-zero point
    /// `inside` until they are no more than `min_step` apart. Returns the
    /// final `(outside, inside)` pair.
    fn refine(&self, mut outside: f64, mut inside: f64) -> (f64, f64) {
        while (inside - outside).abs() > self.min_step {
            let mid = 0.5 * (outside + inside);

            // Below the resolution of f64 the bracket cannot shrink further.
            if mid == outside || mid == inside {
                break;
            }

            if self.in_field(mid) {
                inside = mid;
            } else {
                outside = mid;
            }
        }

        trace!(self.logger, ". resolved boundary"; "outside" => outside, "inside" => inside);
        (outside, inside)
    }
}
