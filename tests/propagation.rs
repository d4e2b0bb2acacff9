// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

//! Properties of the full propagation chain on synthetic field maps.

#[macro_use] extern crate assert_approx_eq;

use axionprop::{Axion, ConfigurationError, ConstantMedium, FieldPropagation, FieldProfile,
                Observables, PhysicsParameters, Precision, ProbabilityMode, Ray, TraceSettings, Vector3};
use axionprop::conversion::{bl_half_squared, probability_average_field, probability_field_profile};
use axionprop_test_support::{box_field, ramp_field, two_boxes, zero_field};
use slog::{Discard, Logger};


fn log() -> Logger {
    Logger::root(Discard, slog::o!())
}

fn axion(position: Vector3<f64>, direction: Vector3<f64>, mass: f64) -> Axion {
    Axion { position, direction, energy: 4.2, mass }
}

fn dipole() -> Vector3<f64> {
    Vector3::new(0., 2., 0.)
}

fn propagate_one<F: Fn(&Vector3<f64>) -> Vector3<f64>>(field: &F, a: &Axion) -> Observables {
    FieldPropagation::builder().field(field).build().unwrap().propagate(a).unwrap()
}


#[test]
fn reference_scenario() {
    // 2 T over 4 m, 4.2 keV massless axion, vacuum.
    const EXPECTED: f64 = 1.5681449269814518e-19;

    let p = PhysicsParameters::vacuum(4.2, 0.);
    let r = probability_average_field(2., 4000., &p, Precision::Double, &log()).unwrap();
    assert_approx_eq!(r.probability, EXPECTED, 1e-6 * EXPECTED);
}


#[test]
fn vacuum_degeneracy_is_exact() {
    let p = PhysicsParameters::vacuum(4.2, 0.);
    let log = log();

    for &(b, l) in &[(0.5, 10.), (2., 4000.), (9., 9260.), (12.5, 20_000.)] {
        let r = probability_average_field(b, l, &p, Precision::Double, &log).unwrap();
        assert_eq!(r.probability, bl_half_squared(b, l));
        assert!(r.probability.is_finite());
    }
}


#[test]
fn uniform_profile_equivalence() {
    let log = log();
    let media = [
        ConstantMedium { photon_mass: 0., absorption: 0. },
        ConstantMedium { photon_mass: 0.01, absorption: 0. },
        ConstantMedium { photon_mass: 0.02, absorption: 1e-3 },
        ConstantMedium { photon_mass: 0., absorption: 1e-3 },
    ];

    for medium in &media {
        for &mass in &[0., 1e-4, 0.012, 0.021] {
            let p = PhysicsParameters::in_medium(4.2, mass, medium);
            let prof = FieldProfile::uniform(2.5, 3000., 10_000).unwrap();
            let a = probability_average_field(2.5, 3000., &p, Precision::Double, &log).unwrap();
            let b = probability_field_profile(&prof, &p, &log).unwrap();
            assert_approx_eq!(b.probability, a.probability, 1e-6 * a.probability);
        }
    }
}


#[test]
fn zero_field_has_no_segments() {
    let s = TraceSettings::default();
    let rays = [
        (Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.)),
        (Vector3::new(10., -3., 0.), Vector3::new(0.3, 1., -0.2)),
        (Vector3::new(1e5, 0., 0.), Vector3::new(-1., 0., 0.)),
        (Vector3::new(0., 0., 20_000.), Vector3::new(0., 0., 1.)),
    ];

    for (o, d) in &rays {
        let ray = Ray::new(*o, *d).unwrap();
        let segs = axionprop::trace_boundaries(&zero_field, &ray, &s, &log()).unwrap();
        assert!(segs.is_empty());
    }

    let prop = FieldPropagation::builder().field(&zero_field).build().unwrap();
    let obs = prop.propagate(&axion(Vector3::zeros(), Vector3::new(0., 0., 1.), 0.)).unwrap();
    assert_eq!(obs.probability, 0.);
    assert_eq!(obs.field_average, 0.);
    assert_eq!(obs.coherence_length, 0.);
    assert_eq!(obs.transmission, 1.);
}


#[test]
fn modes_agree_for_massless_axion_in_gas() {
    let field = box_field(dipole(), 25., -2000., 2000.);
    let gas = ConstantMedium { photon_mass: 0., absorption: 1e-3 };
    let a = axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 0.);

    let avg = FieldPropagation::builder().field(&field).medium(&gas).build().unwrap();
    let prof = FieldPropagation::builder()
        .field(&field)
        .medium(&gas)
        .mode(ProbabilityMode::FieldProfile)
        .build()
        .unwrap();

    let pa = avg.propagate(&a).unwrap().probability;
    let pb = prof.propagate(&a).unwrap().probability;
    assert_approx_eq!(pa, pb, 1e-3 * pa);
    assert!(pa < 0.9 * bl_half_squared(2., 4000.));
}


#[test]
fn distant_origin_terminates() {
    let field = box_field(dipole(), 25., -2000., 2000.);
    let prop = FieldPropagation::builder().field(&field).build().unwrap();
    let obs = prop.propagate(&axion(Vector3::new(0., 0., 1e17), Vector3::new(0., 0., -1.), 0.)).unwrap();
    assert!(!obs.crosses_field());
}


#[test]
fn boundaries_agree_in_both_directions() {
    let s = TraceSettings::default();
    let field = box_field(dipole(), 25., -2000., 2000.);
    let log = log();

    let forward = Ray::new(Vector3::new(3., -2., -5000.), Vector3::new(0.001, 0.0005, 1.)).unwrap();
    let segs = axionprop::trace_boundaries(&field, &forward, &s, &log).unwrap();
    assert_eq!(segs.len(), 1);

    let backward = forward.reversed_from(forward.at(10_000.));
    let back = axionprop::trace_boundaries(&field, &backward, &s, &log).unwrap();
    assert_eq!(back.len(), 1);

    let d_entry = (segs[0].entry() - back[0].exit()).norm();
    let d_exit = (segs[0].exit() - back[0].entry()).norm();
    assert!(d_entry <= s.min_step + 1e-9, "entry mismatch {}", d_entry);
    assert!(d_exit <= s.min_step + 1e-9, "exit mismatch {}", d_exit);
}


#[test]
fn refining_never_moves_a_boundary_far() {
    let field = box_field(dipole(), 25., -1234.5678, 987.654321);
    let ray = Ray::new(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.)).unwrap();
    let log = log();

    let mut previous: Option<(f64, f64, f64)> = None;

    for &min_step in &[1., 0.1, 0.01, 0.001] {
        let s = TraceSettings { min_step, ..TraceSettings::default() };
        let segs = axionprop::trace_boundaries(&field, &ray, &s, &log).unwrap();
        assert_eq!(segs.len(), 1);

        let entry = segs[0].entry().z;
        let exit = segs[0].exit().z;

        if let Some((prev_step, prev_entry, prev_exit)) = previous {
            assert!((entry - prev_entry).abs() <= prev_step + 1e-9);
            assert!((exit - prev_exit).abs() <= prev_step + 1e-9);
        }

        previous = Some((min_step, entry, exit));
    }
}


#[test]
fn separated_regions_add_up() {
    let b = dipole();
    let first = (-3000., -1000.);
    let second = (1000., 3000.);
    let both = two_boxes(b, 25., first, second);
    let only_first = box_field(b, 25., first.0, first.1);
    let only_second = box_field(b, 25., second.0, second.1);

    let a = axion(Vector3::new(1., 1., -6000.), Vector3::new(0., 0., 1.), 1e-3);

    let total = propagate_one(&both, &a);
    let p1 = propagate_one(&only_first, &a);
    let p2 = propagate_one(&only_second, &a);

    assert_eq!(total.segments.len(), 2);
    assert!(total.segments[0].segment.entry().z < total.segments[1].segment.entry().z);

    let sum = p1.probability + p2.probability;
    assert_approx_eq!(total.probability, sum, 1e-3 * sum);
    assert_approx_eq!(total.coherence_length, p1.coherence_length + p2.coherence_length, 0.05);
    assert_approx_eq!(total.field_average, 2., 1e-3);
}


#[test]
fn transmission_stays_in_bounds() {
    let field = box_field(dipole(), 25., -2000., 2000.);
    let a = axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 0.);

    for &absorption in &[0., 1e-6, 1e-3, 0.1, 2.] {
        let gas = ConstantMedium { photon_mass: 0.01, absorption };

        for &length in &[0., 1., 100., 1000.] {
            let prop = FieldPropagation::builder()
                .field(&field)
                .medium(&gas)
                .buffer_gas_additional_length(length)
                .build()
                .unwrap();
            let t = prop.propagate(&a).unwrap().transmission;

            assert!(t > 0. && t <= 1., "transmission {} for {} over {}", t, absorption, length);

            if length == 0. || absorption == 0. {
                assert_eq!(t, 1.);
            }
        }
    }
}


#[test]
fn varying_field_profile() {
    // A massless axion only sees the integral of the field, so a 1 -> 3 T
    // ramp acts like a uniform 2 T field.
    let field = ramp_field(1., 3., 25., -2000., 2000.);
    let a = axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 0.);

    let prop = FieldPropagation::builder()
        .field(&field)
        .mode(ProbabilityMode::FieldProfile)
        .build()
        .unwrap();
    let obs = prop.propagate(&a).unwrap();

    let expected = bl_half_squared(2., 4000.);
    assert_approx_eq!(obs.probability, expected, 1e-3 * expected);
}


#[test]
fn missing_field_is_reported() {
    match FieldPropagation::builder().build() {
        Err(ConfigurationError::MissingField) => {},
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("built a propagation without a field"),
    }
}


#[test]
fn batch_survives_bad_particles() {
    let field = box_field(dipole(), 25., -2000., 2000.);
    let prop = FieldPropagation::builder().field(&field).build().unwrap();

    let good = axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 0.);
    let no_direction = axion(Vector3::zeros(), Vector3::zeros(), 0.);
    let negative_energy = Axion { energy: -1., ..good };
    let missing = axion(Vector3::new(500., 0., -5000.), Vector3::new(0., 0., 1.), 0.);

    let results = prop.propagate_all(&[no_direction, good, negative_energy, missing]);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_err());
    assert!(results[2].is_err());

    let ok = results[1].as_ref().unwrap();
    assert!(ok.probability > 0.);

    let none = results[3].as_ref().unwrap();
    assert!(!none.crosses_field());
    assert_eq!(none.probability, 0.);
}


#[test]
fn shared_between_threads() {
    let field = box_field(dipole(), 25., -2000., 2000.);
    let prop = FieldPropagation::builder().field(&field).build().unwrap();
    let reference = prop
        .propagate(&axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 1e-3))
        .unwrap()
        .probability;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| {
                prop.propagate(&axion(Vector3::new(0., 0., -5000.), Vector3::new(0., 0., 1.), 1e-3))
                    .unwrap()
                    .probability
            }))
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), reference);
        }
    });
}
