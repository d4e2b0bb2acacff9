// Copyright 2019-2023 The axionprop developers and collaborators
// Licensed under the GPL version 3.

/// Propagate one axion through a uniform dipole bore and print what comes
/// out.

use axionprop::{Axion, ConstantMedium, FieldPropagation, ProbabilityMode, Vector3};
use axionprop_test_support::box_field;
use clap::{value_parser, Arg, ArgAction};

fn main() {
    let matches = clap::Command::new("one-particle")
        .version("0.1.0")
        .about("Compute the conversion probability of a single axion.")
        .arg(Arg::new("ENERGY")
             .help("The axion energy (keV)")
             .required(true)
             .value_parser(value_parser!(f64))
             .index(1))
        .arg(Arg::new("MASS")
             .help("The axion mass (eV)")
             .required(true)
             .value_parser(value_parser!(f64))
             .index(2))
        .arg(Arg::new("FIELD")
             .long("field")
             .help("The transverse field in the bore (T)")
             .default_value("2")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("LENGTH")
             .long("length")
             .help("The length of the bore (mm)")
             .default_value("4000")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("OFFSET")
             .long("offset")
             .help("The transverse offset of the track from the bore axis (mm)")
             .default_value("0")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("PHOTON_MASS")
             .long("photon-mass")
             .help("Fill the bore with a buffer gas giving this photon mass (eV)")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("ABSORPTION")
             .long("absorption")
             .help("The buffer gas absorption coefficient (cm^-1)")
             .default_value("0")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("EXTRA_LENGTH")
             .long("extra-length")
             .help("Buffer gas crossed after leaving the bore (mm)")
             .default_value("0")
             .value_parser(value_parser!(f64)))
        .arg(Arg::new("PROFILE")
             .long("profile")
             .help("Integrate along the field profile instead of using its average")
             .action(ArgAction::SetTrue))
        .get_matches();

    let energy = *matches.get_one::<f64>("ENERGY").unwrap();
    let mass = *matches.get_one::<f64>("MASS").unwrap();
    let b = *matches.get_one::<f64>("FIELD").unwrap();
    let length = *matches.get_one::<f64>("LENGTH").unwrap();
    let offset = *matches.get_one::<f64>("OFFSET").unwrap();
    let absorption = *matches.get_one::<f64>("ABSORPTION").unwrap();
    let extra = *matches.get_one::<f64>("EXTRA_LENGTH").unwrap();
    let mode = if matches.get_flag("PROFILE") {
        ProbabilityMode::FieldProfile
    } else {
        ProbabilityMode::AverageField
    };

    let field = box_field(Vector3::new(0., b, 0.), 25., -0.5 * length, 0.5 * length);
    let gas = matches.get_one::<f64>("PHOTON_MASS")
        .map(|m| ConstantMedium { photon_mass: *m, absorption });

    let axion = Axion {
        position: Vector3::new(offset, 0., -length),
        direction: Vector3::new(0., 0., 1.),
        energy,
        mass,
    };

    let builder = FieldPropagation::builder()
        .field(&field)
        .logger(axionprop_test_support::default_log())
        .mode(mode)
        .buffer_gas_additional_length(extra);

    let result = match gas {
        Some(ref g) => builder.medium(g).build().unwrap().propagate(&axion),
        None => builder.build().unwrap().propagate(&axion),
    };

    match result {
        Ok(obs) => {
            println!("     field average (T): {:.9e}", obs.field_average);
            println!("coherence length (mm): {:.9e}", obs.coherence_length);
            println!("           probability: {:.16e}", obs.probability);
            println!("          transmission: {:.9e}", obs.transmission);
            println!("              segments: {}", obs.segments.len());
        },
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        },
    }
}
