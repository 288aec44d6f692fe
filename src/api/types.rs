//! Shared state for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;

/// Shared context for all API routes and middleware.
///
/// Handlers open a fresh SQLite connection per request; WAL mode plus a
/// busy timeout make that safe under concurrent writers.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    pub jwt_secret: Arc<String>,
    pub admin_email: Arc<String>,
    pub admin_password: Arc<String>,
}

impl ApiContext {
    pub fn new(
        db_path: PathBuf,
        jwt_secret: String,
        admin_email: String,
        admin_password: String,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path),
            jwt_secret: Arc::new(jwt_secret),
            admin_email: Arc::new(admin_email),
            admin_password: Arc::new(admin_password),
        }
    }

    /// Open a database connection for this request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_database(&self.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }
}
