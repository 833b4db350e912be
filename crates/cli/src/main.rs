use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_app::{app, modules, Application};
use shelf_kernel::settings::Settings;

/// Books catalogue service
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending index migrations and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let settings = load_settings()?;
            tracing::info!(env = ?settings.environment, "starting shelf server");
            Application::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            let settings = load_settings()?;
            let applied = app::migrate(&settings).await?;
            tracing::info!(applied, "migrations finished");
            Ok(())
        }
        Command::Openapi => {
            let document = shelf_http::router::openapi_document(&modules::registry());
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}

fn load_settings() -> anyhow::Result<Settings> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;
    Ok(settings)
}
