//! Local database setup.
//!
//! The storefront keeps nothing but sessions locally. `tower-sessions`
//! ships the DDL for its own table, so there are no migration files.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)

use tower_sessions_sqlx_store::PostgresStore;

use nalan_storefront::config::session_database_url;
use nalan_storefront::db;

use super::CommandError;

/// Create the `tower_sessions.session` table if it does not exist.
///
/// # Errors
///
/// Returns an error if the URL is missing or the DDL fails.
pub async fn sessions() -> Result<(), CommandError> {
    let database_url = session_database_url()?;

    tracing::info!("Connecting to session database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store ready");
    Ok(())
}
