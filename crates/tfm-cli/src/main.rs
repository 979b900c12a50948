use clap::Parser;

mod bootstrap;
mod cli;
mod orchestrator;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tfmigrate error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.debug)?;
    cli.validate()?;

    let config = bootstrap::load_config(cli.config.as_deref())?;
    let clients = bootstrap::connect(&config).await?;

    orchestrator::run(&cli, &config, &clients.source, &clients.target).await
}

fn init_tracing(quiet: bool, debug: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if debug {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TFMIGRATE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
