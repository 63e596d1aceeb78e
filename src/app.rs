//! Process bootstrap: settings, database, modules, HTTP server.

use anyhow::Context;
use axum::Router;
use bookstore_db::{Database, DatabaseModule};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use std::sync::Arc;

use crate::modules;

/// A fully wired application: pool connected, modules initialized, schema migrated.
pub struct Application {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect the database, register and initialize every module, then run migrations.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        Self::build_with(settings, modules::register_all).await
    }

    /// Like [`Application::build`], with `register` deciding which custom modules are mounted.
    pub async fn build_with<F>(settings: Settings, register: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut ModuleRegistry, &Database),
    {
        let db = Database::connect(settings.database_url(), settings.database.max_connections)
            .await
            .context("failed to open database")?;

        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(DatabaseModule::new(db.clone())));
        register(&mut registry, &db);

        let app = Self {
            settings,
            db,
            registry,
        };

        app.registry
            .init_all(&app.init_ctx())
            .await
            .context("module initialization failed")?;
        app.migrate().await?;

        Ok(app)
    }

    fn init_ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
        }
    }

    /// Apply pending migrations from every registered module.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = self
            .db
            .migrate(&migrations)
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    /// Router with every module mounted, for serving or in-process testing.
    pub fn router(&self) -> Router {
        bookstore_http::build_router(&self.registry, &self.settings)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Start every module. If any module fails to start, all modules are
    /// stopped again, which closes the pool.
    pub async fn start(&self) -> anyhow::Result<()> {
        if let Err(err) = self.registry.start_all(&self.init_ctx()).await {
            if let Err(stop_err) = self.shutdown().await {
                tracing::warn!(error = %stop_err, "module stop failed after start failure");
            }
            return Err(err.context("module start failed"));
        }
        Ok(())
    }

    /// Start modules and serve HTTP until a shutdown signal, then stop modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.start().await?;

        let served = bookstore_http::start_server(&self.registry, &self.settings).await;

        // Stop modules (and release the pool) even if serving failed.
        self.shutdown().await?;
        served
    }

    /// Stop every module in reverse order; closes the database pool.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_all().await
    }
}
