mod common;

use awc::http::StatusCode;
use serde_json::json;

use common::{error_paths, id_of, TestApp};

const PLAN: &str = "7d3c2b1a-0f9e-4d8c-b7a6-958473625140";
const OTHER_PLAN: &str = "7d3c2b1a-0f9e-4d8c-b7a6-958473625141";

#[actix_rt::test]
async fn expense_amount_must_be_positive() {
    let app = TestApp::spawn();

    for amount in &[json!(0), json!(-12.5), json!("12")] {
        let (status, error) = app
            .post(
                "/expenses",
                &json!({
                    "planId": PLAN,
                    "occurredAt": "2024-05-01T00:00:00Z",
                    "amount": amount,
                }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_paths(&error), vec!["amount"]);
    }
}

#[actix_rt::test]
async fn expenses_are_listed_newest_first() {
    let app = TestApp::spawn();
    for (plan_id, occurred_at, amount) in &[
        (PLAN, "2024-05-01T00:00:00Z", 100.0),
        (PLAN, "2024-06-01T00:00:00Z", 250.0),
        (OTHER_PLAN, "2024-07-01T00:00:00Z", 75.0),
    ] {
        let (status, _) = app
            .post(
                "/expenses",
                &json!({ "planId": plan_id, "occurredAt": occurred_at, "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = app.get(&format!("/expenses?planId={}", PLAN)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["amount"], 250.0);
    assert_eq!(page["items"][1]["amount"], 100.0);

    let (_, page) = app
        .get("/expenses?from=2024-05-15T00:00:00Z&to=2024-06-15T00:00:00Z")
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["amount"], 250.0);
}

#[actix_rt::test]
async fn update_expense_moves_it_between_plans() {
    let app = TestApp::spawn();
    let (_, expense) = app
        .post(
            "/expenses",
            &json!({
                "planId": PLAN,
                "occurredAt": "2024-05-01T00:00:00Z",
                "amount": 40,
                "notes": "banner print",
            }),
        )
        .await;
    let path = format!("/expenses/{}", id_of(&expense));

    let (status, updated) = app
        .put(&path, &json!({ "planId": OTHER_PLAN, "notes": null }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["planId"], OTHER_PLAN);
    assert!(updated["notes"].is_null());
    assert_eq!(updated["amount"], 40.0);

    let (status, error) = app.put(&path, &json!({ "amount": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&error), vec!["amount"]);
}
