use salesdb_core::LocationConfig;
use sqlx::PgPool;

use crate::DbError;

/// Upsert locations from the seed file, keyed by `external_id`.
///
/// Returns the number of locations processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_locations(pool: &PgPool, locations: &[LocationConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for location in locations {
        sqlx::query(
            "INSERT INTO locations (name, external_id) \
             VALUES ($1, $2) \
             ON CONFLICT (external_id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 updated_at = NOW()",
        )
        .bind(location.name.trim())
        .bind(location.external_id.trim())
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
