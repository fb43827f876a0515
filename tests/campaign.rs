mod common;

use awc::http::StatusCode;
use serde_json::json;

use common::{id_of, TestApp};

#[actix_rt::test]
async fn create_campaign() {
    let app = TestApp::spawn();

    let (status, campaign) = app
        .post(
            "/campaigns",
            &json!({ "title": "The Green Bean Brigade", "budget": 2500 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(campaign["title"], "The Green Bean Brigade");
    assert_eq!(campaign["budget"], 2500.0);
    assert!(campaign["endDate"].is_null());

    let path = format!("/campaigns/{}", id_of(&campaign));
    let (status, fetched) = app.get(&path).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, campaign);
}

#[actix_rt::test]
async fn campaigns_are_paginated() {
    let app = TestApp::spawn();
    for title in &["One", "Two", "Three"] {
        app.post("/campaigns", &json!({ "title": title })).await;
    }

    let (status, page) = app.get("/campaigns?limit=2&offset=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn campaigns_are_filtered_by_start_date() {
    let app = TestApp::spawn();
    app.post(
        "/campaigns",
        &json!({ "title": "May", "startDate": "2024-05-10T00:00:00Z" }),
    )
    .await;
    app.post(
        "/campaigns",
        &json!({ "title": "June", "startDate": "2024-06-10T00:00:00Z" }),
    )
    .await;

    let (status, page) = app
        .get("/campaigns?from=2024-06-01T00:00:00Z&to=2024-06-30T00:00:00Z")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "June");

    let (status, error) = app
        .get("/campaigns?from=2024-07-01T00:00:00Z&to=2024-06-01T00:00:00Z")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["errorCode"], "E4001006");
}

#[actix_rt::test]
async fn page_limit_is_bounded() {
    let app = TestApp::spawn();

    let (status, error) = app.get("/campaigns?limit=500").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["errorCode"], "E4001005");
    assert_eq!(error["errorMeta"]["maximum"], 200);
}

#[actix_rt::test]
async fn update_changes_only_supplied_fields() {
    let app = TestApp::spawn();
    let (_, campaign) = app
        .post(
            "/campaigns",
            &json!({ "title": "Launch", "description": "first pass", "budget": 10 }),
        )
        .await;
    let path = format!("/campaigns/{}", id_of(&campaign));

    let (status, updated) = app
        .put(&path, &json!({ "description": null, "budget": 20 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Launch");
    assert!(updated["description"].is_null());
    assert_eq!(updated["budget"], 20.0);
}

#[actix_rt::test]
async fn unknown_campaign_is_not_found() {
    let app = TestApp::spawn();

    let (status, error) = app
        .get("/campaigns/5b0f4a6e-2a51-4c0e-9d4a-6c1e2f3a4b5c")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["errorCode"], "E4041001");
    assert_eq!(
        error["errorMeta"]["campaignId"],
        "5b0f4a6e-2a51-4c0e-9d4a-6c1e2f3a4b5c"
    );
}

#[actix_rt::test]
async fn malformed_requests_use_the_error_envelope() {
    let app = TestApp::spawn();

    let (status, error) = app.get("/campaigns/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["errorCode"], "E4001001");

    let (status, error) = app.post_raw("/campaigns", "{\"title\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["errorCode"], "E4001000");

    let (status, error) = app.post("/campaigns", &json!("just a string")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["errorCode"], "E4001004");
    assert_eq!(error["errorMeta"]["errors"][0]["path"], "");

    let (status, error) = app.get("/budgets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["errorCode"], "E4041000");
    assert!(error["errorMeta"].is_null());
}
