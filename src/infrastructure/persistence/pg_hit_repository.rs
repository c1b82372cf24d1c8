//! PostgreSQL implementation of the hit store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::StatsQuery;
use crate::domain::entities::{Hit, NewHit, ViewStats};
use crate::domain::repositories::HitRepository;
use crate::error::AppError;

const INSERT_HIT: &str = r#"
    INSERT INTO hits (application, uri, ip, moment)
    VALUES ($1, $2, $3, $4)
    RETURNING id, application, uri, ip, moment
"#;

// `$3` is an empty array when the query has no URI filter.
const AGGREGATE_ALL: &str = r#"
    SELECT application, uri, COUNT(ip) AS hits
    FROM hits
    WHERE moment BETWEEN $1 AND $2
      AND (cardinality($3::text[]) = 0 OR uri = ANY($3))
    GROUP BY application, uri
    ORDER BY hits DESC
"#;

const AGGREGATE_UNIQUE: &str = r#"
    SELECT application, uri, COUNT(DISTINCT ip) AS hits
    FROM hits
    WHERE moment BETWEEN $1 AND $2
      AND (cardinality($3::text[]) = 0 OR uri = ANY($3))
    GROUP BY application, uri
    ORDER BY hits DESC
"#;

#[derive(sqlx::FromRow)]
struct HitRow {
    id: i64,
    application: String,
    uri: String,
    ip: String,
    moment: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct ViewStatsRow {
    application: String,
    uri: String,
    hits: i64,
}

/// PostgreSQL repository for the append-only `hits` table.
pub struct PgHitRepository {
    pool: Arc<PgPool>,
}

impl PgHitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HitRepository for PgHitRepository {
    async fn record_hit(&self, new_hit: NewHit) -> Result<Hit, AppError> {
        let row = sqlx::query_as::<_, HitRow>(INSERT_HIT)
            .bind(&new_hit.application)
            .bind(&new_hit.uri)
            .bind(&new_hit.ip)
            .bind(new_hit.moment)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                tracing::error!(uri = %new_hit.uri, "Failed to insert hit: {}", e);
                AppError::write_failure("Failed to record hit", json!({}))
            })?;

        Ok(Hit::new(
            row.id,
            row.application,
            row.uri,
            row.ip,
            row.moment,
        ))
    }

    async fn aggregate(&self, query: &StatsQuery) -> Result<Vec<ViewStats>, AppError> {
        let sql = if query.unique {
            AGGREGATE_UNIQUE
        } else {
            AGGREGATE_ALL
        };

        let rows = sqlx::query_as::<_, ViewStatsRow>(sql)
            .bind(query.start)
            .bind(query.end)
            .bind(&query.uris)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ViewStats::new(r.application, r.uri, r.hits))
            .collect())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
