mod config;
mod core;
mod error;
mod headless;
mod render;
mod reveal;
mod surface;
mod types;
mod ui;

use std::{error::Error, fs::File};

use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::config::Cli;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let settings = cli.settings()?;
    let labels = cli.labels();

    if cli.headless {
        let container = cli.container()?;
        let (sim, surface) = headless::simulate(&labels, container, cli.frames, settings);
        print!("{}", headless::summary(&labels, &sim, &surface));
        return Ok(());
    }
    ui::run(labels, settings)
}

/// The terminal UI owns stdout and stderr, so it only logs when given a file.
fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    match &cli.log_file {
        Some(path) => {
            builder.target(Target::Pipe(Box::new(File::create(path)?)));
        }
        None if !cli.headless => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }
    builder.init();
    Ok(())
}
