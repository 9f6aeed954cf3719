use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::profiles::photo::PhotoStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Blob store for profile photos. Default: S3PhotoStore (AWS or MinIO).
    pub photos: Arc<dyn PhotoStore>,
}
