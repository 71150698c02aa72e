#![allow(dead_code)]
pub mod config;
pub mod demo;
pub mod math;
pub mod session;
pub mod term_frontend;
use clap::{ArgAction, Parser};
use math::parsefmt::MAX_DECIMAL_PLACES;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(about = "evaluates 1/(a*x) and 1/(a1*x + 1/(a2*x + 1/(a3*x)))")]
pub struct Args {
    /// select a model, configure it and evaluate once, then exit
    #[arg(short, long)]
    once: bool,
    /// decimal places for results, overrides the config file
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DECIMAL_PLACES)))]
    places: Option<u32>,
    /// accept zero coefficients and leave zero checks to evaluation
    #[arg(long)]
    defer_zero: bool,
    #[arg(long)]
    no_color: bool,
    /// run the demo evaluations and exit
    #[arg(short, long)]
    demo: bool,
    /// more diagnostics on stderr, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(args.verbose))
        .with_writer(std::io::stderr)
        .init();

    match term_frontend::main::crossterm_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("unexpected error: {e}");
            ExitCode::FAILURE
        },
    }
}
