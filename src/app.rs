//! Application bootstrap.
//!
//! 1. **Create**: [`Application::new`] opens the pool, registers the catalog
//!    modules, applies their migrations and runs their `init` hooks
//! 2. **Serve**: [`Application::serve`] starts the modules and the HTTP server
//! 3. **Shutdown**: once the shutdown future resolves, modules are stopped in
//!    reverse order and the pool is closed

use anyhow::Context;
use axum::Router;
use bookapi_db::SqlitePool;
use bookapi_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{self, Catalog};

pub struct Application {
    settings: Settings,
    registry: ModuleRegistry,
    pool: SqlitePool,
}

/// Registry holding every catalog module over `pool`
pub fn build_registry(pool: &SqlitePool) -> ModuleRegistry {
    let catalog = Catalog::new(pool.clone());
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &catalog);
    registry
}

/// Apply every pending module migration, returning how many ran
pub async fn migrate(pool: &SqlitePool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let applied = bookapi_db::run_migrations(pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "database schema up to date");
    Ok(applied)
}

impl Application {
    /// Connect to the configured database and prepare every module
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let pool = bookapi_db::connect(&settings.database).await?;
        Self::with_pool(settings, pool).await
    }

    /// Same as [`Application::new`] over a private in-memory database
    pub async fn in_memory(settings: Settings) -> anyhow::Result<Self> {
        let pool = bookapi_db::connect_in_memory().await?;
        Self::with_pool(settings, pool).await
    }

    async fn with_pool(settings: Settings, pool: SqlitePool) -> anyhow::Result<Self> {
        let registry = build_registry(&pool);
        tracing::info!(modules = registry.len(), "catalog modules registered");

        migrate(&pool, &registry).await?;

        let ctx = InitCtx {
            settings: &settings,
        };
        registry
            .init_modules(&ctx)
            .await
            .context("module initialization failed")?;

        Ok(Self {
            settings,
            registry,
            pool,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Full HTTP router: every module plus health and docs
    pub fn router(&self) -> Router {
        bookapi_http::build_router(&self.registry, &self.settings)
    }

    /// Serve until `shutdown` resolves, then stop modules and close the pool
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry
            .start_modules(&ctx)
            .await
            .context("module start failed")?;

        let served = bookapi_http::start_server(&self.registry, &self.settings, shutdown).await;

        if let Err(err) = self.registry.stop_modules().await {
            tracing::warn!(error = %err, "module shutdown incomplete");
        }

        tracing::info!("closing database connections");
        self.pool.close().await;

        served
    }
}
