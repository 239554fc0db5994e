#[macro_use]
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate json;
#[macro_use]
extern crate log;
extern crate atty;
extern crate cgmath;
extern crate petgraph;
extern crate smallvec;
extern crate termcolor;
extern crate time;

mod errors;
mod logger;
mod version;
mod geometry;
mod skeleton;
mod anim;
mod rig;
mod dump;
mod info;

use clap::ArgMatches;
use errors::*;
use geometry::BoxSpec;
use log::Level;
use rig::{Rig, RigConfig, Variant};
use std::fs::File;
use std::io::{self, Write};
use std::process::exit;

fn main() {
    let app = clap_app!(orikata =>
        (@setting SubcommandRequiredElseHelp)
        (version: crate_version!())
        (about: "Procedural gift-wrap fold rig generator")
        (@arg verbose: -v --verbose +global "print debug messages")
        (@subcommand info =>
            (about: "Summarize the generated rig")
            (alias: "i")
            (@arg BOX: --box +takes_value "box dimensions as W,D,H (default 3,2,1.5)")
            (@arg PAPER: --paper +takes_value "sheet side length (default 8)")
            (@arg OFFSET: --offset +takes_value +allow_hyphen_values "sheet offset as X,Y (default -1,-1)")
            (@arg CUTS: --cuts +takes_value "subdivision cuts per side (default 60)")
            (@arg RIG: --rig +takes_value "rig variant: front, side, full (default full)")
        )
        (@subcommand dump =>
            (about: "Write the rig description as JSON")
            (alias: "d")
            (@arg OUTPUT: -o --output +takes_value "output file (default stdout)")
            (@arg BOX: --box +takes_value "box dimensions as W,D,H (default 3,2,1.5)")
            (@arg PAPER: --paper +takes_value "sheet side length (default 8)")
            (@arg OFFSET: --offset +takes_value +allow_hyphen_values "sheet offset as X,Y (default -1,-1)")
            (@arg CUTS: --cuts +takes_value "subdivision cuts per side (default 60)")
            (@arg RIG: --rig +takes_value "rig variant: front, side, full (default full)")
        )
        (@subcommand version =>
            (about: "Print version info")
        )
    );
    let matches = app.get_matches();

    let level = match matches.is_present("verbose") {
        true => Level::Debug,
        false => Level::Info,
    };
    logger::init(level);

    if let Err(ref e) = run(&matches) {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("info", Some(m)) => {
            let rig = Rig::build(&config_from_matches(m)?)?;
            info::print(&rig);
            Ok(())
        }
        ("dump", Some(m)) => {
            let rig = Rig::build(&config_from_matches(m)?)?;
            match m.value_of("OUTPUT") {
                Some(path) => {
                    let mut f = File::create(path)?;
                    dump::write(&rig, &mut f)?;
                    f.flush()?;
                    info!("wrote rig description to {}", path);
                }
                None => {
                    let stdout = io::stdout();
                    dump::write(&rig, &mut stdout.lock())?;
                }
            }
            Ok(())
        }
        ("version", _) => {
            version::print_version_info();
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn config_from_matches(matches: &ArgMatches) -> Result<RigConfig> {
    let mut config = RigConfig::default();

    if let Some(s) = matches.value_of("BOX") {
        let (w, d, h) = parse_triple(s)?;
        config.box_spec = BoxSpec { width: w, depth: d, height: h };
    }
    if let Some(s) = matches.value_of("PAPER") {
        config.sheet_spec.size = s.trim().parse()?;
    }
    if let Some(s) = matches.value_of("OFFSET") {
        let (x, y) = parse_pair(s)?;
        config.sheet_spec.offset_x = x;
        config.sheet_spec.offset_y = y;
    }
    if let Some(s) = matches.value_of("CUTS") {
        config.sheet_spec.cuts = s.trim().parse()?;
    }
    if let Some(s) = matches.value_of("RIG") {
        config.variant = match Variant::from_name(s) {
            Some(v) => v,
            None => bail!("unknown rig variant {:?}, expected front, side, or full", s),
        };
    }
    Ok(config)
}

fn parse_triple(s: &str) -> Result<(f64, f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        bail!("expected three comma-separated numbers, got {:?}", s);
    }
    Ok((
        parts[0].trim().parse()?,
        parts[1].trim().parse()?,
        parts[2].trim().parse()?,
    ))
}

fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        bail!("expected two comma-separated numbers, got {:?}", s);
    }
    Ok((parts[0].trim().parse()?, parts[1].trim().parse()?))
}
