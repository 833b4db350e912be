use anyhow::Context;
use axum::Router;
use shelf_db::Store;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A bootstrapped application: store connected, migrations applied, modules
/// initialized and started.
pub struct Application {
    settings: Settings,
    store: Store,
    registry: ModuleRegistry,
}

impl Application {
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let store = Store::connect(&settings.database)
            .await
            .context("failed to connect to the document store")?;
        let registry = modules::registry();

        apply_migrations(&store, &registry).await?;

        let ctx = InitCtx {
            settings: &settings,
            store: &store,
        };
        registry.init_modules(&ctx).await?;
        registry.start_modules(&ctx).await?;

        Ok(Self {
            settings,
            store,
            registry,
        })
    }

    /// The connected document store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The full HTTP router with every module mounted
    pub fn router(&self) -> Router {
        shelf_http::build_router(&self.registry, &self.settings.server)
    }

    /// Serve HTTP until Ctrl-C, then stop the modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served =
            shelf_http::start_server(self.router(), &self.settings.server, shutdown_signal()).await;
        self.shutdown().await?;
        served
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_modules().await
    }
}

/// Connect to the store and apply pending migrations without serving.
///
/// Returns the number of migrations applied.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let store = Store::connect(&settings.database)
        .await
        .context("failed to connect to the document store")?;
    apply_migrations(&store, &modules::registry()).await
}

async fn apply_migrations(store: &Store, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = shelf_db::migrate::run(store, &migrations)
        .await
        .context("failed to apply migrations")?;

    tracing::info!(
        applied,
        known = migrations.len(),
        "migrations complete"
    );
    Ok(applied)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
