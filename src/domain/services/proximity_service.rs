// src/domain/services/proximity_service.rs
//
// Finds the devices that should be alerted about an emergency: everyone other
// than the reporter, with a push token, inside the search area around the
// reporter's position.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::output::location_directory_port::{
    BoundingBox, DirectoryResult, LocationDirectoryPort, LocationRecord,
};
use crate::domain::entities::emergency::GeoPoint;

/// Roughly 500 meters of latitude.
pub const DEFAULT_DELTA_DEGREES: f64 = 0.0045;
pub const DEFAULT_RADIUS_METERS: f64 = 500.0;

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// How "nearby" is decided once the directory has answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityPolicy {
    /// Inside the square box of `delta_degrees`, corners included.
    #[default]
    BoundingBox,
    /// Inside the box and within `radius_meters` great-circle distance.
    Haversine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximitySettings {
    pub delta_degrees: f64,
    pub radius_meters: f64,
    pub policy: ProximityPolicy,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            delta_degrees: DEFAULT_DELTA_DEGREES,
            radius_meters: DEFAULT_RADIUS_METERS,
            policy: ProximityPolicy::BoundingBox,
        }
    }
}

pub struct ProximityService {
    directory: Arc<dyn LocationDirectoryPort>,
    settings: ProximitySettings,
}

impl ProximityService {
    pub fn new(directory: Arc<dyn LocationDirectoryPort>, settings: ProximitySettings) -> Self {
        Self { directory, settings }
    }

    pub fn search_area(&self, center: GeoPoint) -> BoundingBox {
        BoundingBox::around(center, self.settings.delta_degrees)
    }

    /// Candidates to alert for an emergency at `center` reported by `exclude_user_id`.
    ///
    /// A directory failure fails the lookup as a whole; no partial candidate list
    /// is ever returned.
    pub async fn find_nearby(
        &self,
        center: GeoPoint,
        exclude_user_id: &str,
    ) -> DirectoryResult<Vec<LocationRecord>> {
        let area = self.search_area(center);
        let records = self.directory.find_in_area(&area, exclude_user_id).await?;
        let returned = records.len();

        let nearby: Vec<LocationRecord> = records
            .into_iter()
            .filter(|record| self.is_candidate(center, &area, exclude_user_id, record))
            .collect();

        debug!(
            "Directory returned {} records around {}, {} are candidates",
            returned,
            center,
            nearby.len()
        );
        Ok(nearby)
    }

    fn is_candidate(
        &self,
        center: GeoPoint,
        area: &BoundingBox,
        exclude_user_id: &str,
        record: &LocationRecord,
    ) -> bool {
        if record.user_id == exclude_user_id || record.push_token().is_none() {
            return false;
        }
        if !area.contains(record.location()) {
            return false;
        }
        match self.settings.policy {
            ProximityPolicy::BoundingBox => true,
            ProximityPolicy::Haversine => {
                haversine_meters(center, record.location()) <= self.settings.radius_meters
            }
        }
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::location_directory_port::DirectoryError;
    use crate::test_utils::common::StubDirectory;

    fn center() -> GeoPoint {
        GeoPoint { lat: 23.8103, lng: 90.4125 }
    }

    fn service(records: Vec<LocationRecord>, policy: ProximityPolicy) -> ProximityService {
        ProximityService::new(
            Arc::new(StubDirectory::with_records(records)),
            ProximitySettings {
                policy,
                ..ProximitySettings::default()
            },
        )
    }

    #[tokio::test]
    async fn test_excludes_reporter_and_tokenless_records() {
        let records = vec![
            LocationRecord::new("reporter", Some("own-token"), 23.8103, 90.4125),
            LocationRecord::new("no-token", None, 23.8104, 90.4126),
            LocationRecord::new("neighbour", Some("tok-1"), 23.8110, 90.4130),
        ];
        let nearby = service(records, ProximityPolicy::BoundingBox)
            .find_nearby(center(), "reporter")
            .await
            .unwrap();

        let ids: Vec<&str> = nearby.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["neighbour"]);
    }

    #[tokio::test]
    async fn test_bounding_box_boundary() {
        let edge = LocationRecord::new("edge", Some("tok-edge"), center().lat + DEFAULT_DELTA_DEGREES, center().lng);
        let outside = LocationRecord::new(
            "outside",
            Some("tok-out"),
            center().lat + DEFAULT_DELTA_DEGREES + 1e-7,
            center().lng,
        );
        let nearby = service(vec![edge, outside], ProximityPolicy::BoundingBox)
            .find_nearby(center(), "reporter")
            .await
            .unwrap();

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].user_id, "edge");
    }

    #[tokio::test]
    async fn test_haversine_drops_box_corners() {
        // A box corner is ~680m away at this latitude.
        let corner = LocationRecord::new(
            "corner",
            Some("tok-corner"),
            center().lat + DEFAULT_DELTA_DEGREES,
            center().lng + DEFAULT_DELTA_DEGREES,
        );
        let close = LocationRecord::new("close", Some("tok-close"), center().lat + 0.001, center().lng);

        let boxed = service(vec![corner.clone(), close.clone()], ProximityPolicy::BoundingBox)
            .find_nearby(center(), "reporter")
            .await
            .unwrap();
        assert_eq!(boxed.len(), 2);

        let radial = service(vec![corner, close], ProximityPolicy::Haversine)
            .find_nearby(center(), "reporter")
            .await
            .unwrap();
        assert_eq!(radial.len(), 1);
        assert_eq!(radial[0].user_id, "close");
    }

    #[tokio::test]
    async fn test_directory_failure_fails_lookup() {
        let service = ProximityService::new(
            Arc::new(StubDirectory::failing(DirectoryError::Unreachable("connection refused".to_string()))),
            ProximitySettings::default(),
        );
        let err = service.find_nearby(center(), "reporter").await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unreachable(_)));
    }

    #[test]
    fn test_haversine_distance() {
        let one_degree_north = GeoPoint { lat: 1.0, lng: 0.0 };
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let meters = haversine_meters(origin, one_degree_north);
        assert!((meters - 111_195.0).abs() < 100.0);
        assert_eq!(haversine_meters(origin, origin), 0.0);
    }
}
