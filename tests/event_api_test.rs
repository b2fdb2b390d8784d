// Event and availability management through the HTTP API

mod common;

use axum::http::StatusCode;
use common::setup_test_app;
use serde_json::{json, Value};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_create_event_with_defaults() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Host").await;

    let response = app
        .post("/api/events")
        .bearer(&host.token)
        .json(&json!({
            "title": "  Coffee chat  ",
            "availabilities": [
                { "day_of_week": 1, "start_time": "09:00", "end_time": "12:00" },
                { "day_of_week": 3, "start_time": "13:30", "end_time": "18:00" }
            ]
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "이벤트가 성공적으로 생성되었습니다.");

    let event = &body["event"];
    assert_eq!(event["title"], "Coffee chat");
    assert_eq!(event["duration"], 30);
    assert_eq!(event["location_type"], "online");
    assert_eq!(event["color"], "#1890ff");
    assert_eq!(event["is_active"], true);
    assert_eq!(event["max_bookings_per_day"], 10);
    assert_eq!(event["advance_booking_limit"], 30);
    assert!(event["booking_link"].as_str().unwrap().starts_with("moyak-"));
    assert_eq!(event["availabilities"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_invalid_availability_rejects_whole_event() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Host").await;

    let response = app
        .post("/api/events")
        .bearer(&host.token)
        .json(&json!({
            "title": "Broken",
            "availabilities": [
                { "day_of_week": 1, "start_time": "09:00", "end_time": "17:00" },
                { "day_of_week": 9, "start_time": "17:00", "end_time": "09:00" }
            ]
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"availabilities[1].day_of_week"));
    assert!(fields.contains(&"availabilities[1].end_time"));

    let response = app.get("/api/events").bearer(&host.token).send().await;
    let body: Value = response.json().await;
    assert!(body["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_events_are_scoped_to_owner() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let owner = app.register_host("Owner").await;
    let other = app.register_host("Other").await;
    let event = app.create_default_event(&owner).await;
    let uri = format!("/api/events/{}", event["id"].as_str().unwrap());

    let response = app.get(&uri).bearer(&other.token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete(&uri).bearer(&other.token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/events").bearer(&other.token).send().await;
    let body: Value = response.json().await;
    assert!(body["events"].as_array().unwrap().is_empty());

    let response = app.get(&uri).bearer(&owner.token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_update_replaces_availabilities() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Host").await;
    let event = app.create_default_event(&host).await;
    let uri = format!("/api/events/{}", event["id"].as_str().unwrap());

    let response = app
        .put(&uri)
        .bearer(&host.token)
        .json(&json!({
            "title": "Renamed",
            "duration": 45,
            "description": "",
            "availabilities": [
                { "day_of_week": 6, "start_time": "10:00", "end_time": "14:00" }
            ]
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "이벤트가 성공적으로 수정되었습니다.");
    assert_eq!(body["event"]["title"], "Renamed");
    assert_eq!(body["event"]["duration"], 45);
    assert!(body["event"]["description"].is_null());
    // Fields left out of the request keep their values
    assert_eq!(body["event"]["location_details"], "Zoom");

    let windows = body["event"]["availabilities"].as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["day_of_week"], 6);
    assert_eq!(windows[0]["start_time"], "10:00:00");
}

#[tokio::test]
#[serial]
async fn test_nested_availability_routes() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Host").await;
    let event = app.create_default_event(&host).await;
    let base = format!("/api/events/{}/availabilities", event["id"].as_str().unwrap());

    let response = app
        .post(&base)
        .bearer(&host.token)
        .json(&json!({ "day_of_week": 0, "start_time": "10:00", "end_time": "12:00" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "가능 시간이 추가되었습니다.");
    let added_id = body["availability"]["id"].as_str().unwrap().to_string();

    let response = app
        .post(&base)
        .bearer(&host.token)
        .json(&json!({ "day_of_week": 0, "start_time": "25:00", "end_time": "12:00" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get(&base).bearer(&host.token).send().await;
    let body: Value = response.json().await;
    assert_eq!(body["availabilities"].as_array().unwrap().len(), 6);

    let response = app
        .delete(&format!("{}/{}", base, added_id))
        .bearer(&host.token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .delete(&format!("{}/{}", base, added_id))
        .bearer(&host.token)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_public_event_lookup() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Public Host").await;
    let event = app
        .create_event(
            &host,
            json!({
                "title": "Office hours",
                "availabilities": [
                    { "day_of_week": 2, "start_time": "09:00", "end_time": "10:00" },
                    { "day_of_week": 4, "start_time": "09:00", "end_time": "10:00", "is_active": false }
                ]
            }),
        )
        .await;
    let link = event["booking_link"].as_str().unwrap();

    // No token needed
    let response = app.get(&format!("/api/events/public/{}", link)).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["event"]["title"], "Office hours");
    assert_eq!(body["event"]["host"]["name"], "Public Host");
    assert!(body["event"]["host"].get("email").is_none());

    let windows = body["event"]["availabilities"].as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["day_of_week"], 2);

    // Deactivated events disappear from the public page
    let response = app
        .put(&format!("/api/events/{}", event["id"].as_str().unwrap()))
        .bearer(&host.token)
        .json(&json!({ "is_active": false }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&format!("/api/events/public/{}", link)).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/events/public/moyak-0-missing").send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_delete_event() {
    let Some(app) = setup_test_app().await else {
        return;
    };
    let host = app.register_host("Host").await;
    let event = app.create_default_event(&host).await;
    let event_id = event["id"].as_str().unwrap();
    app.book_ok(event_id, "2031-06-02T10:00:00Z").await;

    let uri = format!("/api/events/{}", event_id);
    let response = app.delete(&uri).bearer(&host.token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["message"], "이벤트가 성공적으로 삭제되었습니다.");

    let response = app.get(&uri).bearer(&host.token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Bookings go with the event
    let response = app.get("/api/bookings").bearer(&host.token).send().await;
    let body: Value = response.json().await;
    assert!(body["bookings"].as_array().unwrap().is_empty());
}
