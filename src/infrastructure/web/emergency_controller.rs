/*
Emergency Controller

`POST /emergency-push`: parse the body, run the fan-out, and report the
per-recipient results.
*/

use actix_web::{web, HttpResponse};
use log::error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::emergency_push::EmergencyPushError;
use crate::domain::entities::dispatch::{DispatchOutcome, FanoutResult};
use crate::domain::entities::emergency::{EmergencyPushRequest, MalformedRequest};
use crate::setup::http_server::AppState;

/// Successful fan-out response DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct EmergencyPushResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub details: Vec<DeliveryDetail>,
}

/// One recipient's entry in `details`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryDetail {
    pub user: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DispatchOutcome> for DeliveryDetail {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            user: outcome.user_id,
            success: outcome.success,
            result: outcome.receipt.map(|receipt| receipt.0),
            error: outcome.error_detail,
        }
    }
}

impl From<FanoutResult> for EmergencyPushResponse {
    fn from(result: FanoutResult) -> Self {
        Self {
            success: true,
            sent: result.sent_count,
            failed: result.failed_count,
            details: result.outcomes.into_iter().map(DeliveryDetail::from).collect(),
        }
    }
}

pub async fn emergency_push(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, EmergencyPushError> {
    let request_id = Uuid::new_v4();

    let request: EmergencyPushRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("[{}] Rejected emergency-push body: {}", request_id, e);
        MalformedRequest::InvalidBody(e.to_string())
    })?;

    let result = state
        .use_cases
        .emergency_push
        .execute(request)
        .await
        .map_err(|e| {
            error!("[{}] Error in emergency-push: {}", request_id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(EmergencyPushResponse::from(result)))
}
