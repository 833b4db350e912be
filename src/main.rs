use anyhow::Context;
use shelf_app::Application;
use shelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "shelf-app bootstrap starting"
    );

    let app = Application::bootstrap(settings).await?;

    tracing::info!("shelf-app bootstrap complete");
    app.serve().await
}
