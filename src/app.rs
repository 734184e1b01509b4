//! Application bootstrap: store, modules, telemetry, and the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use gridwatch_db::{ActivityStore, RedbActivityStore};
use gridwatch_kernel::{InitCtx, ModuleRegistry, Settings};

use crate::modules;

/// Open the configured activity store and register every module against it
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let store = RedbActivityStore::from_settings(&settings.database).with_context(|| {
        format!(
            "failed to open activity store at {}",
            settings.database.path.display()
        )
    })?;
    registry_with_store(Arc::new(store))
}

/// Register every module against an already opened activity store
pub fn registry_with_store(store: Arc<dyn ActivityStore>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Run the service until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    gridwatch_telemetry::init_tracing(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        in_memory = settings.database.in_memory,
        "gridwatch bootstrap starting"
    );

    let metrics = if settings.telemetry.metrics_enabled {
        Some(gridwatch_telemetry::install_recorder()?)
    } else {
        None
    };

    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;
    tracing::info!(modules = registry.len(), "gridwatch bootstrap complete");

    let served = gridwatch_http::start_server(&registry, &settings, metrics).await;

    if let Err(err) = registry.stop_all().await {
        tracing::error!(error = %err, "module shutdown failed");
    }
    served
}
