pub mod http_server;
pub mod use_case_initializer;

use log::info;
use thiserror::Error;

use crate::config::{DirectoryBackend, Settings};
use crate::domain::entities::emergency::{GeoPoint, MalformedRequest};
use crate::domain::entities::location::{DirectoryError, LocationRecord};
use crate::infrastructure::adapters::directory::SqliteLocationDirectory;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to prepare location directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Failed to build HTTP client: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid location: {0}")]
    Location(#[from] MalformedRequest),

    #[error("{0}")]
    Invalid(String),
}

pub async fn setup_and_run(settings: Settings) -> Result<(), SetupError> {
    let use_cases = use_case_initializer::initialize_use_cases(&settings).await?;
    http_server::run_http_server(&settings.server, use_cases).await?;
    Ok(())
}

async fn sqlite_directory(settings: &Settings, command: &str) -> Result<SqliteLocationDirectory, SetupError> {
    if settings.directory.backend != DirectoryBackend::Sqlite {
        return Err(SetupError::Invalid(format!(
            "{} requires the sqlite directory backend",
            command
        )));
    }

    let directory = SqliteLocationDirectory::connect(
        &settings.directory.database_url,
        settings.directory.max_connections,
    )
    .await?;
    directory.migrate().await?;
    Ok(directory)
}

/// Create the local `user_locations` table for the sqlite backend.
pub async fn init_directory(settings: &Settings) -> Result<(), SetupError> {
    sqlite_directory(settings, "init-db").await?;
    info!("Initialized location directory at {}", settings.directory.database_url);
    Ok(())
}

pub async fn register_location(
    settings: &Settings,
    user_id: &str,
    push_token: Option<&str>,
    lat: f64,
    lng: f64,
) -> Result<LocationRecord, SetupError> {
    let point = GeoPoint::new(lat, lng)?;
    let directory = sqlite_directory(settings, "set-location").await?;
    let record = LocationRecord::new(user_id, push_token, point.lat, point.lng);
    directory.upsert_location(&record).await?;

    info!("Stored location of {} at {}", user_id, point);
    Ok(record)
}
