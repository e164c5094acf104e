use log::info;
use std::sync::Arc;

use crate::application::ports::output::location_directory_port::LocationDirectoryPort;
use crate::application::ports::output::push_delivery_port::PushDeliveryPort;
use crate::application::use_cases::{emergency_push::EmergencyPushUseCase, verify_image::VerifyImageUseCase};
use crate::config::{DirectoryBackend, Settings};
use crate::domain::services::fanout_service::FanoutSettings;
use crate::domain::services::image_review_service::ImageReviewService;
use crate::domain::services::proximity_service::ProximitySettings;
use crate::infrastructure::adapters::directory::{PostgrestLocationDirectory, SqliteLocationDirectory};
use crate::infrastructure::adapters::notifications::FcmPushAdapter;
use crate::setup::SetupError;

#[derive(Clone)]
pub struct UseCases {
    pub emergency_push: Arc<EmergencyPushUseCase>,
    pub verify_image: Arc<VerifyImageUseCase>,
}

impl UseCases {
    pub fn new(
        directory: Arc<dyn LocationDirectoryPort>,
        transport: Arc<dyn PushDeliveryPort>,
        proximity: ProximitySettings,
        fanout: FanoutSettings,
    ) -> Self {
        Self {
            emergency_push: Arc::new(EmergencyPushUseCase::new(directory, transport, proximity, fanout)),
            verify_image: Arc::new(VerifyImageUseCase::new(ImageReviewService::new())),
        }
    }
}

pub async fn initialize_use_cases(settings: &Settings) -> Result<UseCases, SetupError> {
    let directory: Arc<dyn LocationDirectoryPort> = match settings.directory.backend {
        DirectoryBackend::Postgrest => {
            info!("Using PostgREST location directory at {}", settings.directory.url);
            Arc::new(PostgrestLocationDirectory::new(settings.postgrest_config())?)
        }
        DirectoryBackend::Sqlite => {
            info!("Using sqlite location directory at {}", settings.directory.database_url);
            let directory = SqliteLocationDirectory::connect(
                &settings.directory.database_url,
                settings.directory.max_connections,
            )
            .await?;
            directory.migrate().await?;
            Arc::new(directory)
        }
    };

    let transport: Arc<dyn PushDeliveryPort> = Arc::new(FcmPushAdapter::new(settings.fcm_config())?);

    Ok(UseCases::new(
        directory,
        transport,
        settings.proximity_settings(),
        settings.fanout_settings(),
    ))
}
