use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::PlaceRepository,
    error::AppResult,
    models::{Place, PlaceId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct PlaceRow {
    id: Uuid,
    lat: String,
    lon: String,
}

/// Places table lookup. Coordinates are stored as text by the place-selection flow.
#[derive(Clone)]
pub struct PgPlaceRepository {
    pool: PgPool,
}

impl PgPlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn find_place(&self, id: &PlaceId) -> AppResult<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>("SELECT id, lat, lon FROM places WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        match Place::from_stored(PlaceId(row.id), &row.lat, &row.lon) {
            Ok(place) => Ok(Some(place)),
            Err(e) => {
                tracing::warn!(
                    place_id = %id,
                    error = %e,
                    "Stored place has unusable coordinates, treating as absent"
                );
                Ok(None)
            }
        }
    }
}
