//! Integration tests for partial edits.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    body_json, build_test_app, build_test_app_with, create_saved_project, file_block, get,
    post_json, test_config,
};

async fn edit(app: &axum::Router, id: i64, body: serde_json::Value) -> axum::http::Response<axum::body::Body> {
    post_json(app, &format!("/api/v1/projects/{id}/edit"), None, body).await
}

async fn latest_version(app: &axum::Router, id: i64) -> i64 {
    let detail = body_json(get(app, &format!("/api/v1/projects/{id}"), None).await).await;
    detail["data"]["latest_version"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Test: merge keeps untouched files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_overlays_changed_files_on_full_snapshot() {
    let app = build_test_app(false);
    let markdown = format!(
        "{}{}",
        file_block("frontend/src/App.tsx", "app v1"),
        file_block("frontend/src/index.css", "body {}")
    );
    let id = create_saved_project(&app.router, None, "Merge", &markdown).await;

    app.generation.push_edit(&format!(
        "Sure!\n\n{}{}",
        file_block("frontend/src/App.tsx", "app v2"),
        file_block("frontend/src/Banner.tsx", "banner")
    ));
    let response = edit(&app.router, id, json!({ "instructions": "add a banner" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["version"], 2);
    assert_eq!(data["changed_count"], 2);
    assert_eq!(data["file_count"], 3);
    assert_eq!(
        data["artifacts"],
        json!([
            { "path": "frontend/src/App.tsx", "content": "app v2" },
            { "path": "frontend/src/Banner.tsx", "content": "banner" },
            { "path": "frontend/src/index.css", "content": "body {}" },
        ])
    );

    let detail = body_json(get(&app.router, &format!("/api/v1/projects/{id}"), None).await).await;
    assert_eq!(detail["data"]["versions"][0]["summary"], "Edit: add a banner");
    assert_eq!(detail["data"]["project"]["status"], "ready");
}

// ---------------------------------------------------------------------------
// Test: failures leave no new version
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_generation_response_is_502_without_new_version() {
    let app = build_test_app(false);
    let id = create_saved_project(&app.router, None, "Flaky", &file_block("a.ts", "x")).await;

    // Nothing queued: the fake answers with an empty response.
    let response = edit(&app.router, id, json!({ "instructions": "anything" })).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await["error"],
        "AI edit service returned empty response"
    );
    assert_eq!(latest_version(&app.router, id).await, 1);
}

#[tokio::test]
async fn response_without_file_blocks_is_502_without_new_version() {
    let app = build_test_app(false);
    let id = create_saved_project(&app.router, None, "Chatty", &file_block("a.ts", "x")).await;

    app.generation.push_edit("I could not figure out what to change.");
    let response = edit(&app.router, id, json!({ "instructions": "anything" })).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await["error"],
        "AI did not return any updated files"
    );
    assert_eq!(latest_version(&app.router, id).await, 1);
}

#[tokio::test]
async fn edit_requires_instructions_or_error() {
    let app = build_test_app(false);
    let id = create_saved_project(&app.router, None, "Quiet", &file_block("a.ts", "x")).await;

    let response = edit(&app.router, id, json!({ "instructions": "  ", "error": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "instructions or error is required"
    );
    assert!(app.generation.edit_requests().is_empty());
}

#[tokio::test]
async fn edit_without_versions_is_rejected() {
    let app = build_test_app(false);
    let response = post_json(&app.router, "/api/v1/projects", None, json!({ "title": "Empty" })).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = edit(&app.router, id, json!({ "instructions": "do it" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No versions found. Please save an initial version before editing."
    );
}

// ---------------------------------------------------------------------------
// Test: only relevant files are sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_sends_relevant_subset_and_full_path_index() {
    let mut config = test_config(false);
    config.relevance_max_files = 2;
    let app = build_test_app_with(config);

    let markdown = [
        file_block("frontend/src/components/Header.tsx", "header"),
        file_block("frontend/src/components/Footer.tsx", "footer"),
        file_block("frontend/src/App.tsx", "app"),
        file_block("backend/main.py", "print('hi')"),
    ]
    .concat();
    let id = create_saved_project(&app.router, None, "Big", &markdown).await;

    app.generation
        .push_edit(&file_block("frontend/src/components/Header.tsx", "bold header"));
    let response = edit(
        &app.router,
        id,
        json!({ "instructions": "Make src/components/Header.tsx bold" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let requests = app.generation.edit_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.instructions, "Make src/components/Header.tsx bold");
    assert_eq!(request.error, "");
    assert_eq!(request.files.len(), 2);
    assert_eq!(request.files[0].path, "frontend/src/components/Header.tsx");
    assert_eq!(
        request.file_paths,
        vec![
            "backend/main.py",
            "frontend/src/App.tsx",
            "frontend/src/components/Footer.tsx",
            "frontend/src/components/Header.tsx",
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: edit audit trail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_driven_edit_is_recorded() {
    let app = build_test_app(false);
    let id = create_saved_project(&app.router, None, "Broken", &file_block("a.ts", "x")).await;

    app.generation.push_edit(&file_block("a.ts", "fixed"));
    let response = edit(
        &app.router,
        id,
        json!({ "error": "TypeError: x is not a function" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let edits = body_json(get(&app.router, &format!("/api/v1/projects/{id}/edits"), None).await).await;
    let records = edits["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["version_from"], 1);
    assert_eq!(records[0]["version_to"], 2);
    assert_eq!(records[0]["prompt"], "TypeError: x is not a function");
    assert_eq!(records[0]["diff_summary"], "a.ts");

    let detail = body_json(get(&app.router, &format!("/api/v1/projects/{id}"), None).await).await;
    assert_eq!(detail["data"]["versions"][0]["summary"], "Edit: Fix error");
}
