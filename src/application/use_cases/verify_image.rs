use log::info;

use crate::domain::entities::emergency::MalformedRequest;
use crate::domain::entities::image_report::{ImageSubmission, ImageVerification, ImageVerificationRequest};
use crate::domain::services::image_review_service::ImageReviewService;

pub struct VerifyImageUseCase {
    review: ImageReviewService,
}

impl VerifyImageUseCase {
    pub fn new(review: ImageReviewService) -> Self {
        Self { review }
    }

    pub fn execute(&self, request: ImageVerificationRequest) -> Result<ImageVerification, MalformedRequest> {
        let submission = ImageSubmission::try_from(request)?;
        info!(
            "Server-side verification for report {} (category: {})",
            submission.report_id, submission.crime_category
        );

        let verdict = self.review.review(submission);
        info!(
            "Report {} verified: sensitive={}, status={:?}",
            verdict.report_id, verdict.is_sensitive, verdict.overall_status
        );
        Ok(verdict)
    }
}
