//! flacpress CLI entry point

use clap::Parser;
use flacpress::config::{Cli, Settings};
use flacpress::pipeline;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Conventional exit status for a SIGINT-terminated process.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Build settings from CLI
    let settings = Settings::from_cli(&cli);

    // Run the pipeline
    match pipeline::run(&settings) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} converted, {} failed, {} skipped (of {} total)",
                result.converted, result.failed, result.skipped, result.total_files
            );

            if result.cancelled {
                ExitCode::from(EXIT_INTERRUPTED)
            } else if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    // Check input exists
    if !cli.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    flacpress -i ~/Music/flac -o ./mp3\n    flacpress -i ./track.flac -o ./output",
            cli.input.display()
        ));
    }

    // Check output parent directory exists (we'll create the output dir itself)
    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    // LAME accepts -V 0 through just below 10
    if !(0.0..10.0).contains(&cli.quality) {
        return Err(format!(
            "Quality must be in [0, 10), got {}\n\n  Tip: 0 is highest quality, 2 is the usual default, 9.999 is smallest.",
            cli.quality
        ));
    }

    Ok(())
}
