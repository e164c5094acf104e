/*
Location Entities

Device locations as held by the user-location directory, and the rectangular
search area used to query it.
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::emergency::GeoPoint;

/// Failure of the user-location directory. Fails the whole request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    #[error("Directory unreachable: {0}")]
    Unreachable(String),

    #[error("Directory query failed: {0}")]
    Query(String),

    #[error("Directory returned an unreadable result: {0}")]
    Decode(String),
}

/// A user's last known position and device push token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub user_id: String,
    pub push_token: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl LocationRecord {
    pub fn new(user_id: impl Into<String>, push_token: Option<&str>, lat: f64, lng: f64) -> Self {
        Self {
            user_id: user_id.into(),
            push_token: push_token.map(str::to_string),
            lat,
            lng,
        }
    }

    /// The push token, if the device registered a usable one.
    pub fn push_token(&self) -> Option<&str> {
        self.push_token.as_deref().filter(|token| !token.trim().is_empty())
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Square box of `delta_degrees` on each side of `center`. Longitude degrees
    /// are not scaled by latitude, so the box narrows in meters toward the poles.
    /// Bounds are not wrapped at the antimeridian: a box around lng 179.999 does
    /// not reach points at -179.999.
    pub fn around(center: GeoPoint, delta_degrees: f64) -> Self {
        Self {
            min_lat: center.lat - delta_degrees,
            max_lat: center.lat + delta_degrees,
            min_lng: center.lng - delta_degrees,
            max_lng: center.lng + delta_degrees,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}
