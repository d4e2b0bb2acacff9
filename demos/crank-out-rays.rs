// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/// Crank out conversion probabilities for random axion tracks through a
/// uniform bore.

#[macro_use] extern crate slog;

use axionprop::{Axion, ConstantMedium, FieldPropagation, Vector3};
use axionprop_test_support::{box_field, Sampler};
use clap::{value_parser, Arg};
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::path::PathBuf;
use std::time::Instant;


const BORE_HALF_WIDTH: f64 = 21.5;
const BORE_LENGTH: f64 = 9260.;
const FIELD: f64 = 9.;


fn main() {
    let matches = clap::Command::new("crank-out-rays")
        .version("0.1.0")
        .about("Crank out conversion probabilities for random axion tracks")
        .arg(Arg::new("OUTFILE")
             .help("The path of the output file to create")
             .required(true)
             .value_parser(value_parser!(PathBuf))
             .index(1))
        .arg(Arg::new("COUNT")
             .help("The number of tracks to generate")
             .required(true)
             .value_parser(value_parser!(usize))
             .index(2))
        .arg(Arg::new("MASS_MIN")
             .help("The minimum axion mass to generate (eV)")
             .required(true)
             .value_parser(value_parser!(f64))
             .index(3))
        .arg(Arg::new("MASS_MAX")
             .help("The maximum axion mass to generate (eV)")
             .required(true)
             .value_parser(value_parser!(f64))
             .index(4))
        .arg(Arg::new("PHOTON_MASS")
             .long("photon-mass")
             .help("The photon mass in the buffer gas (eV)")
             .default_value("0")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("ABSORPTION")
             .long("absorption")
             .help("The buffer gas absorption coefficient (cm^-1)")
             .default_value("0")
             .value_parser(value_parser!(f64)))
        .get_matches();

    let outfile = matches.get_one::<PathBuf>("OUTFILE").unwrap();
    let count = *matches.get_one::<usize>("COUNT").unwrap();

    let log = axionprop_test_support::default_log();

    let mass_sampler = Sampler::new(
        true,
        *matches.get_one::<f64>("MASS_MIN").unwrap(),
        *matches.get_one::<f64>("MASS_MAX").unwrap());
    let energy_sampler = Sampler::new(false, 1., 10.);
    let offset_sampler = Sampler::new(false, -BORE_HALF_WIDTH, BORE_HALF_WIDTH);
    let slope_sampler = Sampler::new(false, -2e-3, 2e-3);

    let gas = ConstantMedium {
        photon_mass: *matches.get_one::<f64>("PHOTON_MASS").unwrap(),
        absorption: *matches.get_one::<f64>("ABSORPTION").unwrap(),
    };

    let field = box_field(Vector3::new(0., FIELD, 0.), BORE_HALF_WIDTH,
                          -0.5 * BORE_LENGTH, 0.5 * BORE_LENGTH);
    let prop = FieldPropagation::builder()
        .field(&field)
        .medium(&gas)
        .logger(log.clone())
        .build()
        .unwrap();

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(true)
        .open(outfile)
        .unwrap();

    writeln!(file, "x(lin)\t\
                    y(lin)\t\
                    dx(lin)\t\
                    dy(lin)\t\
                    energy(lin)\t\
                    mass(log)\t\
                    time_ms(meta)\t\
                    field_average(res)\t\
                    coherence_length(res)\t\
                    probability(res)").expect("write error");

    for _ in 0..count {
        let axion = Axion {
            position: Vector3::new(offset_sampler.get(), offset_sampler.get(), -BORE_LENGTH),
            direction: Vector3::new(slope_sampler.get(), slope_sampler.get(), 1.),
            energy: energy_sampler.get(),
            mass: mass_sampler.get(),
        };

        // Log the parameters so we can reconstruct cases that fail.
        write!(file, "{:.16e}\t{:.16e}\t{:.16e}\t{:.16e}\t{:.16e}\t{:.16e}",
               axion.position.x, axion.position.y, axion.direction.x, axion.direction.y,
               axion.energy, axion.mass
        ).expect("write error");
        file.flush().expect("flush error");

        let t0 = Instant::now();
        let obs = prop.propagate(&axion);
        let ms = t0.elapsed().as_secs_f64() * 1000.;

        let written = match obs {
            Ok(obs) => writeln!(file, "\t{:.16e}\t{:.16e}\t{:.16e}\t{:.16e}",
                                ms, obs.field_average, obs.coherence_length, obs.probability),
            Err(e) => {
                warn!(log, "track failed"; "error" => %e);
                writeln!(file, "\t{:.16e}\tnan\tnan\tnan", ms)
            },
        };
        written.expect("write error");
    }
}
