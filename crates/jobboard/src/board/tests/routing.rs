use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::board::identity::CurrentUser;
use crate::board::memory::InMemoryJobBoard;
use crate::board::router::{board_router, FLASH_LEVEL_HEADER};
use crate::board::service::JobBoardService;

fn router() -> (Router, InMemoryJobBoard, MemoryNotifier) {
    let (service, board, notifier) = build_service();
    (board_router(service), board, notifier)
}

fn form_post(uri: &str, user: Option<&str>, body: &str) -> Request<Body> {
    let mut builder =
        Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn list_handler_applies_query_filters() {
    let (service, _, _) = build_service();

    let response = crate::board::router::list_handler::<InMemoryJobBoard, MemoryNotifier>(
        State(service),
        Query(vec![
            ("category".to_string(), "2".to_string()),
            ("sort".to_string(), "0".to_string()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<_> = body["jobs"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![7, 9]);
}

#[tokio::test]
async fn detail_handler_rejects_non_numeric_ids() {
    let (service, _, _) = build_service();

    let response = crate::board::router::detail_handler::<InMemoryJobBoard, MemoryNotifier>(
        State(service),
        CurrentUser(None),
        Path("abc".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json_body(response).await,
        json!({ "error": "job not found" })
    );
}

#[tokio::test]
async fn listing_route_reads_query_string() {
    let (router, _, _) = router();

    let response = router
        .oneshot(
            Request::get("/jobs?keyword=rust&jobType=1,2&page=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["job_type_ids"], json!([1, 2]));
    assert_eq!(body["jobs"]["total"], json!(2));
    assert_eq!(body["jobs"]["per_page"], json!(9));
    assert_eq!(body["jobs"]["data"][0]["id"], json!(7));
    assert_eq!(body["jobs"]["data"][0]["job_type"]["name"], json!("Part Time"));
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
    assert_eq!(body["job_types"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn listing_route_keeps_last_value_of_repeated_keys() {
    let (router, _, _) = router();

    let response = router
        .oneshot(
            Request::get("/jobs?jobType=1&jobType=2&location=Lisbon&location=Berlin&extra=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["job_type_ids"], json!([2]));
    assert_eq!(body["jobs"]["total"], json!(1));
    assert_eq!(body["jobs"]["data"][0]["id"], json!(8));
}

#[tokio::test]
async fn detail_route_returns_job_with_saved_flag() {
    let (router, _, _) = router();

    let saved = router
        .clone()
        .oneshot(form_post("/jobs/save", Some("9"), "id=5"))
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(
            Request::get("/jobs/5")
                .header("x-user-id", "9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["job"]["title"], json!("Senior Rust Engineer"));
    assert_eq!(body["job"]["category"]["name"], json!("Engineering"));
    assert_eq!(body["saved"], json!(true));
    assert_eq!(body["applications"], json!([]));

    let anonymous = router
        .oneshot(Request::get("/jobs/5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json_body(anonymous).await["saved"], json!(false));
}

#[tokio::test]
async fn detail_route_hides_unpublished_jobs() {
    let (router, _, _) = router();

    let response = router
        .oneshot(Request::get("/jobs/6").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn apply_route_requires_identity() {
    let (router, board, _) = router();

    for user in [None, Some("not-a-number"), Some("404")] {
        let response = router
            .clone()
            .oneshot(form_post("/jobs/apply", user, "id=5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            read_json_body(response).await,
            json!({ "error": "unauthenticated" })
        );
    }
    assert!(board.applications().unwrap().is_empty());
}

#[tokio::test]
async fn apply_route_reports_success_and_repeat() {
    let (router, board, notifier) = router();

    let first = router
        .clone()
        .oneshot(form_post("/jobs/apply", Some("9"), "id=5"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()[FLASH_LEVEL_HEADER], "success");
    assert_eq!(
        read_json_body(first).await,
        json!({ "status": true, "message": "You have applied successfully" })
    );

    let second = router
        .oneshot(form_post("/jobs/apply", Some("9"), "id=5"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()[FLASH_LEVEL_HEADER], "error");
    assert_eq!(
        read_json_body(second).await,
        json!({ "status": false, "message": "You have already applied on this job" })
    );

    assert_eq!(board.applications().unwrap().len(), 1);
    assert_eq!(notifier.events().len(), 1);
}

fn json_post(uri: &str, user: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn apply_route_accepts_json_bodies() {
    let (router, board, notifier) = router();

    let response = router
        .clone()
        .oneshot(json_post("/jobs/apply", "9", json!({ "id": 5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[FLASH_LEVEL_HEADER], "success");
    assert_eq!(
        read_json_body(response).await,
        json!({ "status": true, "message": "You have applied successfully" })
    );
    assert_eq!(board.applications().unwrap().len(), 1);
    assert_eq!(notifier.events().len(), 1);

    let missing = router
        .oneshot(json_post("/jobs/apply", "9", json!({})))
        .await
        .unwrap();
    assert_eq!(
        read_json_body(missing).await,
        json!({ "status": false, "message": "Job does not exist" })
    );
}

#[tokio::test]
async fn save_route_accepts_json_string_ids() {
    let (router, board, _) = router();

    let response = router
        .oneshot(json_post("/jobs/save", "9", json!({ "id": "5" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(response).await,
        json!({ "status": true, "message": "Job saved successfully" })
    );
    assert_eq!(board.saved_jobs().unwrap().len(), 1);
}

#[tokio::test]
async fn apply_route_with_missing_id_reports_missing_job() {
    let (router, _, _) = router();

    for body in ["", "id=", "id=abc"] {
        let response = router
            .clone()
            .oneshot(form_post("/jobs/apply", Some("9"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json_body(response).await,
            json!({ "status": false, "message": "Job does not exist" })
        );
    }
}

#[tokio::test]
async fn apply_route_surfaces_mail_failure_as_server_error() {
    let service = Arc::new(JobBoardService::new(
        Arc::new(seeded_board()),
        Arc::new(FailingNotifier),
    ));
    let router = board_router(service);

    let response = router
        .oneshot(form_post("/jobs/apply", Some("9"), "id=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn save_route_rejects_unknown_job() {
    let (router, board, _) = router();

    let response = router
        .oneshot(form_post("/jobs/save", Some("9"), "id=404"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[FLASH_LEVEL_HEADER], "error");
    assert_eq!(
        read_json_body(response).await,
        json!({ "status": false, "message": "Job not found" })
    );
    assert!(board.saved_jobs().unwrap().is_empty());
}
