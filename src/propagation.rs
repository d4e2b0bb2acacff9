// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/*! Propagate individual axions through a field map.

A [`FieldPropagation`] borrows a field model and, optionally, a buffer gas,
and turns each incoming [`Axion`] into a small set of [`Observables`]:

* `field_average`: the mean transverse field along the crossed regions (T);
* `probability`: the axion-photon conversion probability;
* `coherence_length`: the length of field traversed (mm);
* `transmission`: the photon survival probability through an extra stretch
  of buffer gas beyond the magnet. It is reported separately and not folded
  into `probability`.

When a track crosses several disjoint field regions, the probabilities of
the regions are simply added. This ignores any phase coherence between the
regions and is only a good approximation when they are far apart; it has
not been validated beyond the single-volume case.

*/

use nalgebra::Vector3;
use slog::{Discard, Logger};

use crate::{FieldSampler, Medium, Vacuum};
use crate::boundary::{self, TraceSettings};
use crate::conversion::{self, ConversionResult, PhysicsParameters};
use crate::error::{ConfigurationError, InvalidInputError, PropagationError};
use crate::geometry::{FieldSegment, Ray};
use crate::precision::Precision;
use crate::profile::{self, ProfileResolution};


/// An axion to propagate.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Axion {
    /// Where the axion starts, in mm.
    pub position: Vector3<f64>,

    /// Its direction of travel; need not be normalized.
    pub direction: Vector3<f64>,

    /// Its energy, in keV.
    pub energy: f64,

    /// Its mass, in eV.
    pub mass: f64,
}


/// How to compute the probability within each field region.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum ProbabilityMode {
    /// Use the closed-form relation with the average of the sampled profile.
    AverageField,

    /// Integrate the conversion amplitude along the sampled profile.
    FieldProfile,
}

impl Default for ProbabilityMode {
    fn default() -> Self {
        ProbabilityMode::AverageField
    }
}


/// The result for one field region crossed by a track.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct SegmentObservables {
    /// Where the track enters and leaves the region.
    pub segment: FieldSegment,

    /// The mean transverse field in the region, in T.
    pub field_average: f64,

    /// The conversion probability within the region.
    pub probability: f64,

    /// The length of the region along the track, in mm.
    pub coherence_length: f64,
}

impl SegmentObservables {
    fn new(segment: FieldSegment, r: ConversionResult) -> Self {
        SegmentObservables {
            segment,
            field_average: r.field_average,
            probability: r.probability,
            coherence_length: r.coherence_length,
        }
    }
}


/// Everything we learn about one axion.
#[derive(Clone,Debug,PartialEq)]
pub struct Observables {
    /// The transverse field averaged over all crossed regions, weighted by
    /// their lengths, in T.
    pub field_average: f64,

    /// The total conversion probability.
    pub probability: f64,

    /// The total length of field crossed, in mm.
    pub coherence_length: f64,

    /// The photon transmission through the additional buffer gas length.
    pub transmission: f64,

    /// The breakdown by field region, in the order they are crossed.
    pub segments: Vec<SegmentObservables>,
}

impl Observables {
    /// Whether the track crossed any field at all.
    pub fn crosses_field(&self) -> bool {
        !self.segments.is_empty()
    }
}


/// Configures a [`FieldPropagation`].
///
/// The field model must be set; everything else has a default.
pub struct FieldPropagationBuilder<'a, F: 'a + ?Sized, M: 'a + ?Sized> {
    field: Option<&'a F>,
    medium: Option<&'a M>,
    logger: Option<Logger>,
    settings: TraceSettings,
    resolution: ProfileResolution,
    mode: ProbabilityMode,
    precision: Precision,
    additional_length: f64,
}

impl<'a, F: 'a + FieldSampler + ?Sized, M: 'a + Medium + ?Sized> FieldPropagationBuilder<'a, F, M> {
    /// Use `field` as the magnetic field model.
    pub fn field<G: 'a + FieldSampler + ?Sized>(self, field: &'a G) -> FieldPropagationBuilder<'a, G, M> {
        FieldPropagationBuilder {
            field: Some(field),
            medium: self.medium,
            logger: self.logger,
            settings: self.settings,
            resolution: self.resolution,
            mode: self.mode,
            precision: self.precision,
            additional_length: self.additional_length,
        }
    }

    /// Fill the field volume with `medium`. Without this, the propagation
    /// happens in vacuum.
    pub fn medium<N: 'a + Medium + ?Sized>(self, medium: &'a N) -> FieldPropagationBuilder<'a, F, N> {
        FieldPropagationBuilder {
            field: self.field,
            medium: Some(medium),
            logger: self.logger,
            settings: self.settings,
            resolution: self.resolution,
            mode: self.mode,
            precision: self.precision,
            additional_length: self.additional_length,
        }
    }

    /// Log through `logger`. By default nothing is logged.
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Alter the boundary search settings.
    pub fn settings(mut self, settings: TraceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Alter how densely field regions are sampled.
    pub fn resolution(mut self, resolution: ProfileResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Choose how the probability is computed within each region.
    pub fn mode(mut self, mode: ProbabilityMode) -> Self {
        self.mode = mode;
        self
    }

    /// Choose the arithmetic used by the closed-form relation.
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the length of buffer gas, in mm, that photons cross after leaving
    /// the field. It only matters if a medium is set.
    pub fn buffer_gas_additional_length(mut self, length: f64) -> Self {
        self.additional_length = length;
        self
    }

    /// Check the configuration and create the propagation.
    pub fn build(self) -> Result<FieldPropagation<'a, F, M>, ConfigurationError> {
        let field = self.field.ok_or(ConfigurationError::MissingField)?;
        let logger = self.logger.unwrap_or_else(|| Logger::root(Discard, o!()));

        self.settings.validate()?;

        match self.resolution {
            ProfileResolution::Samples(n) if n < 2 => {
                return Err(ConfigurationError::InvalidSetting {
                    name: "samples",
                    value: n as f64,
                    reason: "at least 2 samples are needed",
                });
            },
            ProfileResolution::Step(s) if !(s.is_finite() && s > 0.) => {
                return Err(ConfigurationError::InvalidSetting {
                    name: "integration_step",
                    value: s,
                    reason: "must be finite and positive",
                });
            },
            _ => {},
        }

        if !(self.additional_length.is_finite() && self.additional_length >= 0.) {
            return Err(ConfigurationError::InvalidSetting {
                name: "buffer_gas_additional_length",
                value: self.additional_length,
                reason: "must be finite and non-negative",
            });
        }

        let additional_length = if self.medium.is_some() {
            self.additional_length
        } else {
            if self.additional_length > 0. {
                debug!(logger, "no buffer gas defined; ignoring the additional length";
                       "length" => self.additional_length);
            }
            0.
        };

        debug!(logger, "field propagation configured";
               "medium" => self.medium.is_some(),
               "settings" => ?self.settings,
               "resolution" => ?self.resolution,
               "mode" => ?self.mode,
               "precision" => ?self.precision,
               "additional_length" => additional_length,
        );

        Ok(FieldPropagation {
            field,
            medium: self.medium,
            logger,
            settings: self.settings,
            resolution: self.resolution,
            mode: self.mode,
            precision: self.precision,
            additional_length,
        })
    }
}


/// Computes conversion observables for axions crossing a field map.
///
/// This only holds shared references, so one instance can process
/// particles from several threads at once as long as the field and medium
/// models are `Sync`.
pub struct FieldPropagation<'a, F: 'a + ?Sized, M: 'a + ?Sized> {
    field: &'a F,
    medium: Option<&'a M>,
    logger: Logger,
    settings: TraceSettings,
    resolution: ProfileResolution,
    mode: ProbabilityMode,
    precision: Precision,
    additional_length: f64,
}

impl<'a> FieldPropagation<'a, dyn FieldSampler + 'a, Vacuum> {
    /// Start configuring a propagation.
    pub fn builder() -> FieldPropagationBuilder<'a, dyn FieldSampler + 'a, Vacuum> {
        FieldPropagationBuilder {
            field: None,
            medium: None,
            logger: None,
            settings: TraceSettings::default(),
            resolution: ProfileResolution::default(),
            mode: ProbabilityMode::default(),
            precision: Precision::default(),
            additional_length: 0.,
        }
    }
}

impl<'a, F: 'a + FieldSampler + ?Sized, M: 'a + Medium + ?Sized> FieldPropagation<'a, F, M> {
    /// The physics parameters for an axion of the given energy and mass in
    /// our medium.
    pub fn parameters(&self, energy: f64, mass: f64) -> PhysicsParameters {
        match self.medium {
            Some(m) => PhysicsParameters::in_medium(energy, mass, m),
            None => PhysicsParameters::vacuum(energy, mass),
        }
    }

    /// Trace the field regions crossed by a track.
    pub fn segments(&self, ray: &Ray) -> Vec<FieldSegment> {
        boundary::trace_validated(self.field, ray, &self.settings, &self.logger)
    }

    /// Compute the observables of one axion.
    ///
    /// An axion that never meets any field comes back with zero probability;
    /// that is not an error.
    pub fn propagate(&self, axion: &Axion) -> Result<Observables, PropagationError> {
        self.propagate_inner(axion).map_err(|e| {
            PropagationError::new(&axion.position, &axion.direction, axion.energy, axion.mass, e)
        })
    }

    /// Compute the observables of many axions. A bad axion yields an `Err`
    /// in its slot without affecting the others.
    pub fn propagate_all(&self, axions: &[Axion]) -> Vec<Result<Observables, PropagationError>> {
        axions.iter()
            .map(|a| {
                let r = self.propagate(a);

                if let Err(ref e) = r {
                    warn!(self.logger, "skipping axion"; "error" => %e);
                }

                r
            })
            .collect()
    }

    /// The photon transmission through the additional buffer gas length for
    /// an axion of the given energy.
    pub fn transmission(&self, energy: f64) -> f64 {
        match self.medium {
            Some(m) if self.additional_length > 0. => {
                PhysicsParameters::in_medium(energy, 0., m).transmission(self.additional_length)
            },
            _ => 1.,
        }
    }

    fn propagate_inner(&self, axion: &Axion) -> Result<Observables, InvalidInputError> {
        let ray = Ray::new(axion.position, axion.direction)?;
        let params = self.parameters(axion.energy, axion.mass);
        params.validate()?;

        let transmission = self.transmission(axion.energy);
        let segments = self.segments(&ray);

        if segments.is_empty() {
            debug!(self.logger, "track does not cross the field volume";
                   "position" => ?axion.position, "direction" => ?axion.direction);

            return Ok(Observables {
                field_average: 0.,
                probability: 0.,
                coherence_length: 0.,
                transmission,
                segments: Vec::new(),
            });
        }

        let mut per_segment = Vec::with_capacity(segments.len());

        for segment in segments {
            let r = self.segment_probability(&segment, ray.unit_direction(), &params)?;
            per_segment.push(SegmentObservables::new(segment, r));
        }

        let probability: f64 = per_segment.iter().map(|s| s.probability).sum();
        let coherence_length: f64 = per_segment.iter().map(|s| s.coherence_length).sum();
        let field_average = if coherence_length > 0. {
            per_segment.iter().map(|s| s.field_average * s.coherence_length).sum::<f64>() / coherence_length
        } else {
            0.
        };

        if per_segment.len() > 1 {
            debug!(self.logger, "combining field regions incoherently"; "n" => per_segment.len());
        }

        debug!(self.logger, "process observables";
               "field_average" => field_average,
               "probability" => probability,
               "coherence_length" => coherence_length,
               "transmission" => transmission,
        );

        Ok(Observables {
            field_average,
            probability,
            coherence_length,
            transmission,
            segments: per_segment,
        })
    }

    fn segment_probability(
        &self, segment: &FieldSegment, direction: &Vector3<f64>, params: &PhysicsParameters
    ) -> Result<ConversionResult, InvalidInputError> {
        let n = self.resolution.samples_for(segment.length())?;
        let profile = profile::sample_profile(self.field, segment, direction, n)?;

        match self.mode {
            ProbabilityMode::AverageField => conversion::probability_average_field(
                profile.average(), profile.length(), params, self.precision, &self.logger
            ),
            ProbabilityMode::FieldProfile => conversion::probability_field_profile(
                &profile, params, &self.logger
            ),
        }
    }
}
