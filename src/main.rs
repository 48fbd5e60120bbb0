use std::str::FromStr;

use lumina::{Lumina, Mode};

const USAGE: &str = "\
lumina - a language-driven 3D particle field

Usage: lumina [--count N] [--mode NAME] [--no-console]

  --count N      starting particle count (1000..=100000)
  --mode NAME    orbit | flow | vortex | chaos | expand | galaxy
  --no-console   do not read commands from stdin

Controls: 1-6 select mode, right-drag orbits, scroll zooms,
hold left to attract, Esc quits. Console lines starting with '{'
merge as raw parameter JSON, e.g. {\"mode\": \"vortex\", \"speed\": 2}.";

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return;
    }

    let mut field = Lumina::new();
    if let Some(count) = parse_arg::<u32>(&args, "--count") {
        field = field.with_count(count);
    }
    if let Some(name) = parse_arg::<String>(&args, "--mode") {
        match Mode::from_name(&name) {
            Some(mode) => field = field.with_mode(mode),
            None => {
                eprintln!("Unknown mode '{}'; see --help for the list.", name);
                std::process::exit(1);
            }
        }
    }
    if args.iter().any(|a| a == "--no-console") {
        field = field.without_console();
    }

    if let Err(err) = field.run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
