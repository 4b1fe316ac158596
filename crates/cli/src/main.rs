use anyhow::Result;
use clap::Parser;
use jshunter_cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    match &cli.command {
        Some(Commands::Init { path }) => commands::init::run(path.as_deref()),
        None => commands::analyze::run(&cli),
    }
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
/// `RUST_LOG` wins over the verbosity flags when set.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "off"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
