//! Zipvault CLI - Command-line utility for packing directories into
//! password-protected ZIP archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_progress = !cli.quiet && !cli.json;

    let result = match &cli.command {
        cli::Commands::Compress(args) => {
            commands::compress::execute(args, &*formatter, show_progress)
        }
        cli::Commands::Decompress(args) => {
            commands::decompress::execute(args, &*formatter, show_progress)
        }
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        formatter.format_error(cli.command.operation(), &e);
        std::process::exit(1);
    }
}

/// Routes `log` records from the engine to stderr.
///
/// `RUST_LOG` takes precedence over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
