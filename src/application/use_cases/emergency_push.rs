use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::output::location_directory_port::{DirectoryError, LocationDirectoryPort};
use crate::application::ports::output::push_delivery_port::PushDeliveryPort;
use crate::domain::entities::dispatch::FanoutResult;
use crate::domain::entities::emergency::{EmergencyEvent, EmergencyPushRequest, MalformedRequest};
use crate::domain::services::fanout_service::{FanoutService, FanoutSettings};
use crate::domain::services::proximity_service::{ProximityService, ProximitySettings};

/// Request-level failures of the emergency push. Per-recipient failures are
/// reported inside the `FanoutResult` instead.
#[derive(Debug, Error)]
pub enum EmergencyPushError {
    #[error(transparent)]
    Malformed(#[from] MalformedRequest),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Validate the event, look up nearby devices, fan the alert out.
pub struct EmergencyPushUseCase {
    proximity: ProximityService,
    fanout: FanoutService,
}

impl EmergencyPushUseCase {
    pub fn new(
        directory: Arc<dyn LocationDirectoryPort>,
        transport: Arc<dyn PushDeliveryPort>,
        proximity: ProximitySettings,
        fanout: FanoutSettings,
    ) -> Self {
        Self {
            proximity: ProximityService::new(directory, proximity),
            fanout: FanoutService::new(transport, fanout),
        }
    }

    pub async fn execute(&self, request: EmergencyPushRequest) -> Result<FanoutResult, EmergencyPushError> {
        let event = EmergencyEvent::try_from(request)?;
        info!(
            "Emergency push for {} ({}) reported by {} at {}",
            event.id, event.kind, event.reporter_id, event.location
        );

        let candidates = self
            .proximity
            .find_nearby(event.location, &event.reporter_id)
            .await?;
        info!("Found {} nearby users for emergency {}", candidates.len(), event.id);

        let result = self.fanout.dispatch(&event, &candidates).await;
        info!(
            "Emergency {} fan-out finished: {} sent, {} failed",
            event.id, result.sent_count, result.failed_count
        );
        Ok(result)
    }
}
