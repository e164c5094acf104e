// src/domain/services/image_review_service.rs
use chrono::Utc;

use crate::domain::entities::image_report::{ImageSubmission, ImageVerification, ReviewStatus};

/// Categories whose photos always go to a human moderator.
pub const SENSITIVE_CATEGORIES: [&str; 5] = ["killing", "murder", "homicide", "dead body", "violent death"];

/// Case-insensitive substring match against `SENSITIVE_CATEGORIES`.
pub fn is_sensitive_category(category: &str) -> bool {
    let category = category.to_lowercase();
    SENSITIVE_CATEGORIES.iter().any(|sensitive| category.contains(sensitive))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageReviewService;

impl ImageReviewService {
    pub fn new() -> Self {
        Self
    }

    pub fn review(&self, submission: ImageSubmission) -> ImageVerification {
        let is_sensitive = is_sensitive_category(&submission.crime_category);
        let overall_status = if is_sensitive {
            ReviewStatus::NeedsReview
        } else {
            ReviewStatus::Approved
        };

        ImageVerification {
            report_id: submission.report_id,
            image_url: submission.image_url,
            user_id: submission.user_id,
            client_check: submission.client_check,
            crime_category: submission.crime_category,
            is_sensitive,
            needs_human_review: is_sensitive,
            overall_status,
            created_at: Utc::now(),
        }
    }
}
