//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    catalog::CatalogService, enrichment::DescriptionService, identity::IdentityVerifier,
    jwt::JwtService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub catalog: CatalogService,
    pub descriptions: DescriptionService,
}
