use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, API_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn api_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            http::header::AUTHORIZATION,
            format!("Token token={API_TOKEN}"),
        )
        .header(http::header::CONTENT_TYPE, "application/vnd.api+json")
        .body(body.to_string())
        .unwrap()
}

fn org_body(name: &str) -> String {
    json!({"data": {"attributes": {"name": name}, "type": "orgs"}}).to_string()
}

fn repo_body(url: &str) -> String {
    json!({"data": {"attributes": {"url": url}, "type": "repos"}}).to_string()
}

// --- auth ---

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/user")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/user")
                .header(http::header::AUTHORIZATION, "Token token=nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- user ---

#[tokio::test]
async fn user_endpoint_returns_a_users_doc() {
    let app = app();
    let resp = app
        .oneshot(api_request("GET", "/v1/user", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await;
    assert_eq!(doc["data"]["type"], "users");
}

// --- orgs ---

#[tokio::test]
async fn create_org_returns_201_and_lists_afterwards() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(api_request("POST", "/v1/orgs", &org_body("Acme")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["data"]["attributes"]["name"], "Acme");
    assert!(created["data"]["id"].is_string());

    let resp = app
        .oneshot(api_request("GET", "/v1/orgs", ""))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_org_rejects_a_flat_body() {
    let app = app();
    let resp = app
        .oneshot(api_request("POST", "/v1/orgs", r#"{"name":"Acme"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_org_rejects_a_wrong_resource_type() {
    let app = app();
    let body = json!({"data": {"attributes": {"name": "Acme"}, "type": "repos"}}).to_string();
    let resp = app
        .oneshot(api_request("POST", "/v1/orgs", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn org_list_is_sliced_by_page_params() {
    let app = app();
    for name in ["One", "Two", "Three"] {
        let resp = app
            .clone()
            .oneshot(api_request("POST", "/v1/orgs", &org_body(name)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app
        .oneshot(api_request(
            "GET",
            "/v1/orgs?page%5Bnumber%5D=2&page%5Bsize%5D=2",
            "",
        ))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

// --- repos ---

#[tokio::test]
async fn unknown_repo_is_not_found() {
    let app = app();
    let resp = app
        .oneshot(api_request("GET", "/v1/repos/deadbeef", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repo_creation_enables_slug_lookup() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(api_request("POST", "/v1/orgs", &org_body("Acme")))
        .await
        .unwrap();
    let org = body_json(resp).await;
    let org_id = org["data"]["id"].as_str().unwrap();

    let resp = app
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/orgs/{org_id}/repos"),
            &repo_body("https://github.com/acme/widget"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let repo = body_json(resp).await;
    assert_eq!(repo["data"]["attributes"]["github_slug"], "acme/widget");

    let resp = app
        .oneshot(api_request(
            "GET",
            "/v1/repos?github_slug=acme%2Fwidget",
            "",
        ))
        .await
        .unwrap();
    let found = body_json(resp).await;
    assert_eq!(found["data"].as_array().unwrap().len(), 1);
    assert_eq!(found["data"][0]["id"], repo["data"]["id"]);
}

#[tokio::test]
async fn repo_creation_requires_an_existing_org() {
    let app = app();
    let resp = app
        .oneshot(api_request(
            "POST",
            "/v1/orgs/missing/repos",
            &repo_body("https://github.com/acme/widget"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- snapshots ---

#[tokio::test]
async fn issues_are_filtered_by_severity() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(api_request("POST", "/v1/orgs", &org_body("Acme")))
        .await
        .unwrap();
    let org = body_json(resp).await;
    let org_id = org["data"]["id"].as_str().unwrap();

    let resp = app
        .clone()
        .oneshot(api_request(
            "POST",
            &format!("/v1/orgs/{org_id}/repos"),
            &repo_body("https://github.com/acme/widget"),
        ))
        .await
        .unwrap();
    let repo = body_json(resp).await;
    let repo_id = repo["data"]["id"].as_str().unwrap();
    let snapshot_id = repo["data"]["relationships"]["latest_default_branch_snapshot"]["data"]["id"]
        .as_str()
        .unwrap();

    let resp = app
        .oneshot(api_request(
            "GET",
            &format!("/v1/repos/{repo_id}/snapshots/{snapshot_id}/issues?filter%5Bseverity%5D=minor"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let issues = body_json(resp).await;
    let data = issues["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["attributes"]["severity"], "minor");
}
