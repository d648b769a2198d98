//! Integration tests for the preview endpoint.

mod common;

use axum::http::StatusCode;

use common::{body_json, build_test_app, create_saved_project, file_block, get};

#[tokio::test]
async fn preview_stubs_missing_imports_under_frontend_root() {
    let app = build_test_app(false);
    let markdown = [
        file_block(
            "frontend/src/App.tsx",
            "import Navbar from './components/Navbar';\nimport { useCart } from './hooks/useCart';\nexport default function App() { return <Navbar />; }",
        ),
        file_block("backend/main.py", "print('api')"),
    ]
    .concat();
    let id = create_saved_project(&app.router, None, "Shop", &markdown).await;

    let response = get(&app.router, &format!("/api/v1/projects/{id}/preview"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["version"], 1);
    assert_eq!(data["verified"], true);

    let files = data["files"].as_object().unwrap();
    assert!(files.contains_key("/src/App.tsx"));
    assert!(files.contains_key("/src/components/Navbar.tsx"));
    assert!(files.contains_key("/src/hooks/useCart.ts"));
    // Only the frontend tree is mounted.
    assert!(!files.keys().any(|k| k.contains("main.py")));

    let stubs = data["stubs"].as_array().unwrap();
    assert_eq!(stubs.len(), 2);
    assert!(stubs
        .iter()
        .any(|s| s["path"] == "/src/components/Navbar.tsx" && s["kind"] == "component"));
    assert!(stubs
        .iter()
        .any(|s| s["path"] == "/src/hooks/useCart.ts" && s["kind"] == "hook"));
}

#[tokio::test]
async fn preview_of_specific_version() {
    let app = build_test_app(false);
    let id = create_saved_project(
        &app.router,
        None,
        "Versions",
        &file_block("src/main.js", "import './App';"),
    )
    .await;
    common::post_json(
        &app.router,
        &format!("/api/v1/projects/{id}/save"),
        None,
        serde_json::json!({ "markdown": file_block("src/main.js", "console.log(1);") }),
    )
    .await;

    let latest = body_json(get(&app.router, &format!("/api/v1/projects/{id}/preview"), None).await).await;
    assert_eq!(latest["data"]["version"], 2);
    assert!(latest["data"]["stubs"].as_array().unwrap().is_empty());

    let first = body_json(
        get(&app.router, &format!("/api/v1/projects/{id}/preview?version=1"), None).await,
    )
    .await;
    assert_eq!(first["data"]["version"], 1);
    assert_eq!(first["data"]["stubs"][0]["path"], "/src/App.jsx");
}

#[tokio::test]
async fn preview_without_versions_is_400() {
    let app = build_test_app(false);
    let response = common::post_json(
        &app.router,
        "/api/v1/projects",
        None,
        serde_json::json!({}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get(&app.router, &format!("/api/v1/projects/{id}/preview"), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_of_unknown_version_is_404() {
    let app = build_test_app(false);
    let id = create_saved_project(
        &app.router,
        None,
        "Pinned",
        &file_block("frontend/src/App.jsx", "export default function App() { return null; }"),
    )
    .await;

    let response = get(&app.router, &format!("/api/v1/projects/{id}/preview?version=99"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");

    let response = get(&app.router, &format!("/api/v1/projects/{id}/preview?version=1"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
