use std::path::PathBuf;

use anyhow::Context;
use bookapi_app::{app, Application};
use bookapi_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog REST API
#[derive(Debug, Parser)]
#[command(name = "bookapi", version, about)]
struct Cli {
    /// Directory holding base.toml and {env}.toml (default: $BOOKAPI_CONFIG_DIR or ./config)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// local, staging or production (default: $BOOKAPI_ENV or local)
    #[arg(long = "env", global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API until Ctrl+C or SIGTERM
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi,
    /// Load and print the effective configuration
    CheckConfig,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        if self.config_dir.is_none() && self.environment.is_none() {
            return Settings::load().context("failed to load settings");
        }

        let _ = dotenvy::dotenv();
        let config_dir = self
            .config_dir
            .clone()
            .or_else(|| std::env::var_os("BOOKAPI_CONFIG_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config"));
        let environment = self
            .environment
            .clone()
            .or_else(|| std::env::var("BOOKAPI_ENV").ok())
            .unwrap_or_else(|| "local".to_string());

        Settings::load_from(&config_dir, &environment)
            .with_context(|| format!("failed to load settings from {}", config_dir.display()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command {
        Command::Serve => {
            bookapi_telemetry::init(&settings.telemetry)?;
            Application::new(settings)
                .await?
                .serve(bookapi_http::shutdown_signal())
                .await
        }
        Command::Migrate => {
            bookapi_telemetry::init(&settings.telemetry)?;
            let pool = bookapi_db::connect(&settings.database).await?;
            let registry = app::build_registry(&pool);
            let applied = app::migrate(&pool, &registry).await?;
            pool.close().await;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Openapi => {
            // Nothing is queried; the pool only backs the module state.
            let pool = bookapi_db::connect_lazy("sqlite::memory:")?;
            let registry = app::build_registry(&pool);
            let spec = bookapi_http::openapi::merged_spec(&registry);
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(())
        }
        Command::CheckConfig => {
            println!("environment: {:?}", settings.environment);
            println!("server:      {}", settings.server.bind_address());
            println!("database:    {}", settings.database.url);
            println!(
                "telemetry:   {:?} ({})",
                settings.telemetry.log_format, settings.telemetry.log_filter
            );
            Ok(())
        }
    }
}
