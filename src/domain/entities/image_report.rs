/*
Image Report Entities

Crime reports may carry a photo. Before a report is published, its category is
checked against a fixed list of sensitive categories; sensitive reports are
held for human moderation.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::emergency::{required_text, MalformedRequest};

/// Raw `POST /verify-image` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVerificationRequest {
    pub report_id: Option<String>,
    pub image_url: Option<String>,
    pub verification_data: Option<serde_json::Value>,
    pub user_id: Option<String>,
    pub crime_category: Option<String>,
}

/// A validated image submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSubmission {
    pub report_id: String,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub client_check: Option<serde_json::Value>,
    pub crime_category: String,
}

impl TryFrom<ImageVerificationRequest> for ImageSubmission {
    type Error = MalformedRequest;

    fn try_from(request: ImageVerificationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            report_id: required_text("reportId", request.report_id)?,
            image_url: request.image_url,
            user_id: request.user_id,
            client_check: request.verification_data,
            crime_category: required_text("crimeCategory", request.crime_category)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    NeedsReview,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    HumanModeration,
    Publish,
}

/// Server-side verdict on a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageVerification {
    pub report_id: String,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub client_check: Option<serde_json::Value>,
    pub crime_category: String,
    pub is_sensitive: bool,
    pub needs_human_review: bool,
    pub overall_status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl ImageVerification {
    pub fn next_step(&self) -> NextStep {
        match self.overall_status {
            ReviewStatus::NeedsReview => NextStep::HumanModeration,
            ReviewStatus::Approved => NextStep::Publish,
        }
    }
}
