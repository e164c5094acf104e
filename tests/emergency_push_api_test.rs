use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use emergency_fanout::domain::entities::location::LocationRecord;
use emergency_fanout::domain::services::fanout_service::FanoutSettings;
use emergency_fanout::domain::services::proximity_service::ProximitySettings;
use emergency_fanout::infrastructure::adapters::directory::SqliteLocationDirectory;
use emergency_fanout::infrastructure::adapters::notifications::{FcmConfig, FcmPushAdapter};
use emergency_fanout::infrastructure::web::emergency_controller::EmergencyPushResponse;
use emergency_fanout::infrastructure::web::image_controller::ImageVerificationResponse;
use emergency_fanout::infrastructure::web::{configure, cors};
use emergency_fanout::setup::http_server::AppState;
use emergency_fanout::setup::use_case_initializer::UseCases;

async fn seeded_directory() -> SqliteLocationDirectory {
    let directory = SqliteLocationDirectory::connect("sqlite::memory:", 1).await.unwrap();
    directory.migrate().await.unwrap();

    for record in [
        LocationRecord::new("reporter", Some("tok-reporter"), 23.8103, 90.4125),
        LocationRecord::new("u-near", Some("tok-good"), 23.8110, 90.4130),
        LocationRecord::new("u-bad", Some("tok-bad"), 23.8095, 90.4120),
        LocationRecord::new("u-far", Some("tok-far"), 23.9000, 90.5000),
        LocationRecord::new("u-silent", None, 23.8104, 90.4126),
    ] {
        directory.upsert_location(&record).await.unwrap();
    }

    directory
}

fn app_state(directory: SqliteLocationDirectory, server: &ServerGuard) -> web::Data<AppState> {
    let transport = FcmPushAdapter::new(FcmConfig {
        endpoint: format!("{}/fcm/send", server.url()),
        server_key: "integration-key".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    web::Data::new(AppState {
        use_cases: UseCases::new(
            Arc::new(directory),
            Arc::new(transport),
            ProximitySettings::default(),
            FanoutSettings {
                deadline: Some(Duration::from_secs(10)),
                ..FanoutSettings::default()
            },
        ),
    })
}

#[actix_web::test]
async fn test_emergency_push_through_sqlite_and_fcm() {
    let mut server = Server::new_async().await;
    let delivered = server
        .mock("POST", "/fcm/send")
        .match_header("authorization", "key=integration-key")
        .match_body(Matcher::PartialJson(json!({
            "to": "tok-good",
            "data": { "emergency_id": "em-42", "type": "Medical" }
        })))
        .with_status(200)
        .with_body(r#"{"success":1,"failure":0,"results":[{"message_id":"0:42"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("POST", "/fcm/send")
        .match_body(Matcher::PartialJson(json!({ "to": "tok-bad" })))
        .with_status(200)
        .with_body(r#"{"success":0,"failure":1,"results":[{"error":"NotRegistered"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(app_state(seeded_directory().await, &server))
            .wrap(cors::cors_headers())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/emergency-push")
        .set_json(json!({
            "emergency_id": "em-42",
            "user_id": "reporter",
            "type": "Medical",
            "lat": 23.8103,
            "lng": 90.4125
        }))
        .to_request();
    let resp: EmergencyPushResponse = test::call_and_read_body_json(&app, req).await;

    assert!(resp.success);
    assert_eq!(resp.sent, 1);
    assert_eq!(resp.failed, 1);
    assert_eq!(resp.details.len(), 2);

    assert_eq!(resp.details[0].user, "u-bad");
    assert!(!resp.details[0].success);
    assert!(resp.details[0].error.as_deref().unwrap().contains("NotRegistered"));

    assert_eq!(resp.details[1].user, "u-near");
    assert!(resp.details[1].success);
    assert_eq!(resp.details[1].result.as_ref().unwrap()["success"], 1);

    delivered.assert_async().await;
    rejected.assert_async().await;
}

#[actix_web::test]
async fn test_nobody_nearby_sends_nothing() {
    let mut server = Server::new_async().await;
    let fcm = server.mock("POST", "/fcm/send").expect(0).create_async().await;

    let app = test::init_service(
        App::new()
            .app_data(app_state(seeded_directory().await, &server))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/emergency-push")
        .set_json(json!({
            "emergency_id": "em-7",
            "user_id": "someone",
            "type": "Fire",
            "lat": -33.8688,
            "lng": 151.2093
        }))
        .to_request();
    let resp: EmergencyPushResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.sent, 0);
    assert_eq!(resp.failed, 0);
    assert!(resp.details.is_empty());
    fcm.assert_async().await;
}

#[actix_web::test]
async fn test_out_of_range_latitude_is_bad_request() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(app_state(seeded_directory().await, &server))
            .wrap(cors::cors_headers())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/emergency-push")
        .set_json(json!({
            "emergency_id": "em-1",
            "user_id": "reporter",
            "type": "Fire",
            "lat": 123.0,
            "lng": 90.4125
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
}

#[actix_web::test]
async fn test_preflight_on_verify_image() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(app_state(seeded_directory().await, &server))
            .wrap(cors::cors_headers())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/verify-image")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
}

#[actix_web::test]
async fn test_verify_image_approves_ordinary_category() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(app_state(seeded_directory().await, &server))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/verify-image")
        .set_json(json!({
            "reportId": "r-9",
            "imageUrl": "https://cdn.example.com/r-9.jpg",
            "crimeCategory": "Bicycle theft"
        }))
        .to_request();
    let resp: ImageVerificationResponse = test::call_and_read_body_json(&app, req).await;

    assert!(resp.success);
    assert!(!resp.is_sensitive);
    assert_eq!(serde_json::to_value(resp.overall_status).unwrap(), json!("approved"));
    assert_eq!(serde_json::to_value(resp.next_step).unwrap(), json!("publish"));
}
