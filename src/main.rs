//! Sari-Pos relay server.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sari_pos::catalog::baseline;
use sari_pos::config::Config;
use sari_pos::domain::product::ProductDraft;
use sari_pos::remote::StoreClient;
use sari_pos::store::memory::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let client = StoreClient::new(Arc::new(MemoryStore::new()));

    if std::env::var("SEED_BASELINE").map(|v| v == "1").unwrap_or(false) {
        let drafts: Vec<ProductDraft> = baseline()
            .into_iter()
            .map(|p| ProductDraft {
                name: p.name,
                category: p.category,
                price: p.price,
                image: p.image,
            })
            .collect();
        let count = client.add_products_batch(&drafts).await?;
        tracing::info!(count, "seeded baseline catalog");
    }

    let app = sari_pos::api::router(client);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "sari-pos relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
