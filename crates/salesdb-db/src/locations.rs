//! Database operations for the `locations` table.

use chrono::{DateTime, Utc};
use salesdb_core::{Location, LocationCache};
use sqlx::PgPool;

/// A row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub name: String,
    pub external_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            external_id: row.external_id,
        }
    }
}

/// All locations, ordered by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, external_id, created_at, updated_at \
         FROM locations \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, external_id, created_at, updated_at \
         FROM locations \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, external_id, created_at, updated_at \
         FROM locations \
         WHERE external_id = $1",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await
}

/// Snapshot of every location, used as the resolver for a whole run.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn load_location_cache(pool: &PgPool) -> Result<LocationCache, sqlx::Error> {
    let rows = list_locations(pool).await?;
    Ok(LocationCache::new(rows.into_iter().map(Location::from)))
}
