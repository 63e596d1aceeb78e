use anyhow::Context;
use bookstore::Application;
use bookstore_kernel::settings::{Environment, Settings};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Run and administer the bookstore service")]
struct Cli {
    /// Override `BOOKSTORE_ENV` (local, test, staging, production)
    #[arg(long, global = true)]
    env: Option<Environment>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookstore settings")?;
    if let Some(env) = cli.env {
        settings.environment = env;
    }
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookstore-cli starting");

    match cli.command {
        Command::Serve => Application::build(settings).await?.serve().await,
        Command::Migrate => {
            // `build` applies pending migrations; nothing else to do but release the pool.
            let app = Application::build(settings).await?;
            app.shutdown().await
        }
    }
}
