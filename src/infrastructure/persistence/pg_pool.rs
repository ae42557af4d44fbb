use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;

const CONNECT_RETRIES: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Connect to PostgreSQL with exponential backoff, so the service survives
/// the database coming up after it during deployment.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let mut attempt = 0;
    let mut delay = INITIAL_BACKOFF;

    loop {
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
        {
            Ok(pool) => {
                info!(max_connections, "Database connection pool ready");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_RETRIES => {
                attempt += 1;
                warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis(),
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                return Err(RepositoryError::ConnectionFailed(e.to_string()));
            }
        }
    }
}
