/*
PostgREST Location Directory

Queries the hosted `user_locations` table through its PostgREST endpoint using
the service-role key. The search area becomes range filters on `lat`/`lng`,
so only the rectangle is fetched over the wire.
*/

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::output::location_directory_port::{
    BoundingBox, DirectoryError, DirectoryResult, LocationDirectoryPort, LocationRecord,
};

const USER_LOCATIONS_PATH: &str = "rest/v1/user_locations";

#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub service_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct UserLocationRow {
    user_id: String,
    fcm_token: Option<String>,
    lat: f64,
    lng: f64,
}

impl From<UserLocationRow> for LocationRecord {
    fn from(row: UserLocationRow) -> Self {
        LocationRecord {
            user_id: row.user_id,
            push_token: row.fcm_token,
            lat: row.lat,
            lng: row.lng,
        }
    }
}

pub struct PostgrestLocationDirectory {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestLocationDirectory {
    pub fn new(config: PostgrestConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), USER_LOCATIONS_PATH)
    }

    fn query_params(area: &BoundingBox, exclude_user_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("select", "user_id,fcm_token,lat,lng".to_string()),
            ("user_id", format!("neq.{}", exclude_user_id)),
            ("fcm_token", "not.is.null".to_string()),
            ("lat", format!("gte.{}", area.min_lat)),
            ("lat", format!("lte.{}", area.max_lat)),
            ("lng", format!("gte.{}", area.min_lng)),
            ("lng", format!("lte.{}", area.max_lng)),
        ]
    }
}

#[async_trait]
impl LocationDirectoryPort for PostgrestLocationDirectory {
    async fn find_in_area(
        &self,
        area: &BoundingBox,
        exclude_user_id: &str,
    ) -> DirectoryResult<Vec<LocationRecord>> {
        let response = self
            .client
            .get(self.table_url())
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .query(&Self::query_params(area, exclude_user_id))
            .send()
            .await
            .map_err(|e| DirectoryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Query(format!("status {}: {}", status, body)));
        }

        let rows: Vec<UserLocationRow> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(rows.into_iter().map(LocationRecord::from).collect())
    }
}
