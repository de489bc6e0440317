use anyhow::Context;
use bookapi_app::Application;
use bookapi_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;

    bookapi_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookapi-app bootstrap starting"
    );

    Application::new(settings)
        .await?
        .serve(bookapi_http::shutdown_signal())
        .await
}
