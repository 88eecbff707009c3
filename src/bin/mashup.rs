use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mashup::cli::{run, Cli};
use mashup::config::Config;
use mashup::services::acquirer::YtDlp;
use mashup::utils::ffmpeg::Ffmpeg;

fn main() -> ExitCode {
    // Wrong argument count prints usage and exits with status 2
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for the progress lines
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mashup=warn")))
        .init();

    // Mail settings are never read here, so they cannot fail the run
    let config = Config::from_env();
    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            println!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let source = YtDlp::new(config.backend.clone());
    let engine = Ffmpeg::new(&config.audio);

    match run(&cli, &root, &source, &engine, &mut std::io::stdout().lock()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}
