use clap::Parser;
use sensive::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensive=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            sensive::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            sensive::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate) => {
            sensive::cli::migrate::run(&cli.config).await?;
        }
        Some(Commands::User { command }) => {
            sensive::cli::user::run(&cli.config, command).await?;
        }
        Some(Commands::Import { file }) => {
            sensive::cli::import::run(&cli.config, &file).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
