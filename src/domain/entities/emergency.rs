/*
Emergency Entities

An emergency event is raised by a reporter's device and carries the position
the alert fans out from. The inbound request is deserialized loosely into
`EmergencyPushRequest` and then converted into a validated `EmergencyEvent`;
nothing downstream ever sees a missing or non-finite coordinate.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejection of an inbound request before any lookup or dispatch is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRequest {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, MalformedRequest> {
        check_coordinate("lat", lat, 90.0)?;
        check_coordinate("lng", lng, 180.0)?;
        Ok(Self { lat, lng })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

fn check_coordinate(field: &'static str, value: f64, bound: f64) -> Result<(), MalformedRequest> {
    if !value.is_finite() {
        return Err(MalformedRequest::InvalidField {
            field,
            reason: "must be a finite number".to_string(),
        });
    }
    if value.abs() > bound {
        return Err(MalformedRequest::InvalidField {
            field,
            reason: format!("must be within [-{bound}, {bound}]"),
        });
    }
    Ok(())
}

/// Raw `POST /emergency-push` body. Every field is optional here so that
/// absence is reported as a `MalformedRequest` rather than a serde error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyPushRequest {
    pub emergency_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// An emergency reported by `reporter_id` at `location`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyEvent {
    pub id: String,
    pub reporter_id: String,
    pub kind: String,
    pub location: GeoPoint,
}

impl EmergencyEvent {
    pub fn new(
        id: impl Into<String>,
        reporter_id: impl Into<String>,
        kind: impl Into<String>,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            reporter_id: reporter_id.into(),
            kind: kind.into(),
            location,
        }
    }
}

impl TryFrom<EmergencyPushRequest> for EmergencyEvent {
    type Error = MalformedRequest;

    fn try_from(request: EmergencyPushRequest) -> Result<Self, Self::Error> {
        let id = required_text("emergency_id", request.emergency_id)?;
        let reporter_id = required_text("user_id", request.user_id)?;
        let kind = required_text("type", request.kind)?;
        let lat = request.lat.ok_or(MalformedRequest::MissingField("lat"))?;
        let lng = request.lng.ok_or(MalformedRequest::MissingField("lng"))?;

        Ok(Self {
            id,
            reporter_id,
            kind,
            location: GeoPoint::new(lat, lng)?,
        })
    }
}

/// Extracts a required, non-blank string field.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<String>,
) -> Result<String, MalformedRequest> {
    match value {
        None => Err(MalformedRequest::MissingField(field)),
        Some(text) if text.trim().is_empty() => Err(MalformedRequest::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        }),
        Some(text) => Ok(text),
    }
}
