use anyhow::Result;
use clap::Parser;
use kanak::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}

/// Log to stderr. `RUST_LOG` overrides the defaults.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,kanak=debug,sqlx=warn"
    } else {
        "info,kanak=info,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
