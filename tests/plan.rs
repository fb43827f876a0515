mod common;

use awc::http::StatusCode;
use serde_json::{json, Value};

use common::{error_paths, id_of, TestApp};

const BRAND: &str = "4a0e6a7e-1b2c-4d3e-8f90-a1b2c3d4e501";
const SEARCH: &str = "4a0e6a7e-1b2c-4d3e-8f90-a1b2c3d4e502";
const EVENTS: &str = "4a0e6a7e-1b2c-4d3e-8f90-a1b2c3d4e503";

async fn create_plan(app: &TestApp, title: &str) -> Value {
    let (status, plan) = app
        .post(
            "/plans",
            &json!({
                "title": title,
                "typeId": BRAND,
                "budgetAmount": 12000,
                "startDate": "2024-01-01T00:00:00Z",
                "endDate": "2024-12-31T00:00:00Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    plan
}

#[actix_rt::test]
async fn create_plan_applies_defaults() {
    let app = TestApp::spawn();

    let plan = create_plan(&app, "FY24").await;

    assert_eq!(plan["title"], "FY24");
    assert_eq!(plan["typeId"], BRAND);
    assert_eq!(plan["budgetAmount"], 12000.0);
    assert_eq!(plan["allocateByType"], false);
    assert_eq!(plan["isArchived"], false);
    assert!(plan.get("typeBudgets").is_none());
}

#[actix_rt::test]
async fn plan_requires_a_type_and_budget() {
    let app = TestApp::spawn();

    let (status, error) = app
        .post("/plans", &json!({ "title": "FY24", "budgetAmount": -5 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&error), vec!["typeId", "budgetAmount"]);
}

#[actix_rt::test]
async fn null_end_date_clears_it() {
    let app = TestApp::spawn();
    let plan = create_plan(&app, "FY24").await;
    let path = format!("/plans/{}", id_of(&plan));

    let (status, updated) = app.put(&path, &json!({ "endDate": null })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(updated["endDate"].is_null());
    assert_eq!(updated["startDate"], plan["startDate"]);

    let (_, fetched) = app.get(&path).await;
    assert!(fetched["endDate"].is_null());
}

#[actix_rt::test]
async fn archived_plans_can_be_filtered_out() {
    let app = TestApp::spawn();
    let archived = create_plan(&app, "FY23").await;
    create_plan(&app, "FY24").await;
    app.put(
        &format!("/plans/{}", id_of(&archived)),
        &json!({ "isArchived": true }),
    )
    .await;

    let (status, page) = app.get("/plans?isArchived=false").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "FY24");
}

#[actix_rt::test]
async fn type_budgets_replace_the_previous_set() {
    let app = TestApp::spawn();
    let plan = create_plan(&app, "FY24").await;
    let path = format!("/plans/{}/type-budgets", id_of(&plan));

    let (status, first) = app
        .post(
            &path,
            &json!({ "items": [
                { "activityTypeId": SEARCH, "plannedAmount": 4000 },
                { "activityTypeId": EVENTS, "plannedAmount": 2500 },
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 2);

    let (status, second) = app
        .post(
            &path,
            &json!({ "items": [
                { "activityTypeId": EVENTS, "typeId": BRAND, "plannedAmount": 3000 },
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"][0]["planId"], plan["id"]);

    let (status, listed) = app.get(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"], second["items"]);

    let (_, fetched) = app.get(&format!("/plans/{}", id_of(&plan))).await;
    assert_eq!(fetched["typeBudgets"], second["items"]);
}

#[actix_rt::test]
async fn type_budgets_are_validated() {
    let app = TestApp::spawn();
    let plan = create_plan(&app, "FY24").await;
    let path = format!("/plans/{}/type-budgets", id_of(&plan));

    let (status, error) = app.post(&path, &json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&error), vec!["items"]);

    let (status, error) = app
        .post(
            &path,
            &json!({ "items": [
                { "activityTypeId": SEARCH, "plannedAmount": 100 },
                { "activityTypeId": "search", "plannedAmount": -1 },
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_paths(&error),
        vec!["items[1].activityTypeId", "items[1].plannedAmount"]
    );

    let (status, error) = app
        .post(
            &path,
            &json!({ "items": [
                { "activityTypeId": SEARCH, "plannedAmount": 100 },
                { "activityTypeId": SEARCH, "plannedAmount": 200 },
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&error), vec!["items[1].activityTypeId"]);

    let (_, listed) = app.get(&path).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 0);
}

#[actix_rt::test]
async fn type_budgets_of_unknown_plan_are_not_found() {
    let app = TestApp::spawn();
    let path = "/plans/0e1d2c3b-4a59-4687-9a8b-7c6d5e4f3a21/type-budgets";

    let (status, error) = app
        .post(
            path,
            &json!({ "items": [{ "activityTypeId": SEARCH, "plannedAmount": 10 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["errorCode"], "E4041002");

    let (status, _) = app.get(path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
