use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod catalog;
mod enrichment;
mod error;
mod identity;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::database::{DatabaseConfig, init_pool};
use tokio::net::TcpListener;

use crate::{
    catalog::CatalogService,
    enrichment::{AzureOpenAiGenerator, DescriptionService, OpenAiConfig},
    identity::{GoogleConfig, GoogleIdentityVerifier, IdentityVerifier},
    jwt::{JwtConfig, JwtService},
    repositories::ProductRepository,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting catalog API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!().run(&pool).await?;

    // External collaborators: identity verification and text generation
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let identity_verifier: Arc<dyn IdentityVerifier> =
        Arc::new(GoogleIdentityVerifier::new(GoogleConfig::from_env()?)?);
    let generator = Arc::new(AzureOpenAiGenerator::new(OpenAiConfig::from_env()?)?);

    let catalog = CatalogService::new(ProductRepository::new(pool.clone()));
    let descriptions = DescriptionService::new(generator);

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        identity_verifier,
        catalog,
        descriptions,
    };

    info!("Catalog API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!("Catalog API listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
