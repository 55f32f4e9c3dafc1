mod cmd;

use clap::Parser;
use cmd::config::{Cli, Commands, Effective};
use cmd::error::MigrateBagError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<(), MigrateBagError> {
    match cli.command {
        Commands::Migrate(args) => {
            let eff = Effective::new(&args)?;
            cmd::migrate::run(&eff).await
        }
        Commands::Rules(args) => cmd::rules::run(&args),
    }
}
