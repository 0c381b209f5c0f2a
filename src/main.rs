mod modules;
mod utils;

use anyhow::Context;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use shelf_store::BookStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "shelf-app bootstrap starting"
    );

    let store = BookStore::connect(&settings.database)
        .await
        .context("failed to open book store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store.clone());

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;

    store
        .apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    registry.start_all(&ctx).await?;

    shelf_http::start_server(&registry, &settings).await
}
