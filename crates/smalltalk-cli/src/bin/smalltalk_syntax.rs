use std::process::exit;

use clap::Parser;
use smalltalk_cli::args::{CliArgs, Colors};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() {
    let args = CliArgs::parse();
    let ansi = match args.colors {
        Colors::Auto => atty::is(atty::Stream::Stderr),
        Colors::Always => true,
        Colors::Never => false,
    };
    setup_stderr_logging(args.verbose, ansi);

    match smalltalk_cli::run(&args.path, args.mode) {
        Ok(true) => exit(0),
        Ok(false) => exit(2),
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "could not run");
            exit(1);
        }
    }
}

/// Sets up a `tracing-subscriber` registry writing to stderr: a compact single-line
/// format normally, a pretty multi-line one under `--verbose`, both honouring
/// `RUST_LOG`.
fn setup_stderr_logging(verbose: bool, ansi: bool) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::new("warn"),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if verbose {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .compact()
                    .without_time()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}
