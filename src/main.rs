// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # WikiSEO CLI
//!
//! Entry point for the `wikiseo` binary. Initializes the logger from the
//! verbosity flag and runs the selected subcommand.

use anyhow::Context;
use log::LevelFilter;
use wikiseo::cli;

/// Maps the `-v` count to a log level; `RUST_LOG` still wins when set.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run() -> Result<(), anyhow::Error> {
    let matches = cli::build().get_matches();
    init_logger(matches.get_count("verbose"));

    cli::run(&matches, &mut std::io::stdout())
        .context("wikiseo failed")?;
    Ok(())
}

/// The main entry point for the WikiSEO CLI.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
