use anyhow::Context;
use bookstore::Application;
use bookstore_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database_url(),
        "bookstore bootstrap starting"
    );

    let app = Application::build(settings).await?;
    tracing::info!("bookstore bootstrap complete");

    app.serve().await
}
