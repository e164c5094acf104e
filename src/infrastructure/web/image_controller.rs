use actix_web::{web, HttpResponse};
use log::error;
use serde::{Deserialize, Serialize};

use crate::domain::entities::emergency::MalformedRequest;
use crate::domain::entities::image_report::{ImageVerification, ImageVerificationRequest, NextStep, ReviewStatus};
use crate::setup::http_server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageVerificationResponse {
    pub success: bool,
    pub message: String,
    pub overall_status: ReviewStatus,
    pub is_sensitive: bool,
    pub next_step: NextStep,
}

impl From<&ImageVerification> for ImageVerificationResponse {
    fn from(verdict: &ImageVerification) -> Self {
        Self {
            success: true,
            message: "Verification received".to_string(),
            overall_status: verdict.overall_status,
            is_sensitive: verdict.is_sensitive,
            next_step: verdict.next_step(),
        }
    }
}

/// `POST /verify-image`
pub async fn verify_image(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, MalformedRequest> {
    let request: ImageVerificationRequest = serde_json::from_slice(&body)
        .map_err(|e| MalformedRequest::InvalidBody(e.to_string()))?;

    let verdict = state.use_cases.verify_image.execute(request).map_err(|e| {
        error!("Error in verify-image: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(ImageVerificationResponse::from(&verdict)))
}
