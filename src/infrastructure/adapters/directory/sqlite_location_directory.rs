/*
SQLite Location Directory

Self-hosted `user_locations` store backed by sqlx. Besides answering area
queries it owns the schema and lets devices register their latest position.
*/

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::application::ports::output::location_directory_port::{
    BoundingBox, DirectoryError, DirectoryResult, LocationDirectoryPort, LocationRecord,
};

pub struct SqliteLocationDirectory {
    pool: SqlitePool,
}

fn map_sqlx_error(error: sqlx::Error) -> DirectoryError {
    match error {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DirectoryError::Unreachable(error.to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => DirectoryError::Decode(error.to_string()),
        other => DirectoryError::Query(other.to_string()),
    }
}

impl SqliteLocationDirectory {
    /// Connect to `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> DirectoryResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DirectoryError::Unreachable(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DirectoryError::Unreachable(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DirectoryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_locations (
                user_id TEXT PRIMARY KEY NOT NULL,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                fcm_token TEXT,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_locations_lat_lng ON user_locations(lat, lng)")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        info!("user_locations schema is up to date");
        Ok(())
    }

    /// Insert or replace a user's position and token.
    pub async fn upsert_location(&self, record: &LocationRecord) -> DirectoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_locations (user_id, lat, lng, fcm_token, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                lat = excluded.lat,
                lng = excluded.lng,
                fcm_token = excluded.fcm_token,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.user_id)
        .bind(record.lat)
        .bind(record.lng)
        .bind(&record.push_token)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl LocationDirectoryPort for SqliteLocationDirectory {
    async fn find_in_area(
        &self,
        area: &BoundingBox,
        exclude_user_id: &str,
    ) -> DirectoryResult<Vec<LocationRecord>> {
        let rows: Vec<(String, Option<String>, f64, f64)> = sqlx::query_as(
            r#"
            SELECT user_id, fcm_token, lat, lng
            FROM user_locations
            WHERE user_id <> ?
              AND fcm_token IS NOT NULL
              AND lat BETWEEN ? AND ?
              AND lng BETWEEN ? AND ?
            ORDER BY user_id
            "#,
        )
        .bind(exclude_user_id)
        .bind(area.min_lat)
        .bind(area.max_lat)
        .bind(area.min_lng)
        .bind(area.max_lng)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, push_token, lat, lng)| LocationRecord {
                user_id,
                push_token,
                lat,
                lng,
            })
            .collect())
    }
}
