use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry).context("failed to initialize logging")?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        db = %settings.database.name,
        "bookshelf bootstrap starting"
    );

    let store = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to create store client")?;

    let mut registry = ModuleRegistry::new();
    bookshelf_app::register_all(&mut registry, store);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    bookshelf_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await?;
    Ok(())
}
