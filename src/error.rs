// src/error.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::emergency_push::EmergencyPushError;
use crate::domain::entities::emergency::MalformedRequest;

/// JSON body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

impl ResponseError for EmergencyPushError {
    fn status_code(&self) -> StatusCode {
        match *self {
            EmergencyPushError::Malformed(_) => StatusCode::BAD_REQUEST,
            EmergencyPushError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self))
    }
}

impl ResponseError for MalformedRequest {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self))
    }
}
