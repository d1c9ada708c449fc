//! In-memory CodeClimate API stub used by the core crate's integration tests.
//!
//! Serves a `/v1` surface that mirrors the routes the client exercises:
//! token-header auth, JSON:API envelopes on writes, `filter[...]`/`page[...]`
//! query conventions on reads. Creating a repo seeds a snapshot, issues,
//! files and builds so read endpoints have something to return.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The only token the stub accepts.
pub const API_TOKEN: &str = "test-token";

#[derive(Clone, Debug)]
pub struct Org {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct Repo {
    pub id: String,
    pub org_id: String,
    pub url: String,
    pub github_slug: String,
    pub snapshot_id: String,
}

#[derive(Default)]
pub struct Store {
    orgs: Vec<Org>,
    repos: Vec<Repo>,
}

pub type Db = Arc<RwLock<Store>>;

/// Incoming JSON:API document on write endpoints.
#[derive(Deserialize)]
struct Document {
    data: Resource,
}

#[derive(Deserialize)]
struct Resource {
    #[serde(rename = "type")]
    kind: Option<String>,
    attributes: Value,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/user", get(get_user))
        .route("/orgs", get(list_orgs).post(create_org))
        .route("/orgs/{org_id}/repos", get(list_repos).post(create_repo))
        .route("/repos", get(find_repo_by_slug))
        .route("/repos/{repo_id}", get(get_repo))
        .route("/repos/{repo_id}/refresh", get(refresh_repo))
        .route("/repos/{repo_id}/branches/{branch}", get(get_branch))
        .route("/repos/{repo_id}/branches/{branch}/refresh", get(refresh_branch))
        .route("/repos/{repo_id}/ref_points", get(list_ref_points))
        .route("/repos/{repo_id}/services", get(list_services))
        .route(
            "/repos/{repo_id}/services/{service_id}/events",
            post(create_service_event),
        )
        .route("/repos/{repo_id}/snapshots/{snapshot_id}", get(get_snapshot))
        .route(
            "/repos/{repo_id}/snapshots/{snapshot_id}/issues",
            get(list_issues),
        )
        .route(
            "/repos/{repo_id}/snapshots/{snapshot_id}/files",
            get(list_files),
        )
        .route("/repos/{repo_id}/builds", get(list_builds))
        .route("/repos/{repo_id}/builds/{number}", get(get_build))
        .route("/repos/{repo_id}/metrics/{metric}", get(get_time_series))
        .route("/repos/{repo_id}/test_reports", get(list_test_reports))
        .route(
            "/repos/{repo_id}/test_reports/{report_id}/test_file_reports",
            get(list_test_file_reports),
        )
        .route(
            "/repos/{repo_id}/pulls/{number}/rating_changes",
            get(list_rating_changes),
        )
        .route(
            "/repos/{repo_id}/pulls/{number}/approvals",
            post(approve_pull),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(db);
    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_auth(request: Request, next: Next) -> Result<Response, StatusCode> {
    let expected = format!("Token token={API_TOKEN}");
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn mint_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn org_doc(org: &Org) -> Value {
    json!({"id": org.id, "type": "orgs", "attributes": {"name": org.name}})
}

fn repo_doc(repo: &Repo) -> Value {
    let human_name = repo
        .github_slug
        .rsplit('/')
        .next()
        .unwrap_or(&repo.github_slug);
    json!({
        "id": repo.id,
        "type": "repos",
        "attributes": {
            "human_name": human_name,
            "github_slug": repo.github_slug,
            "vcs_host": "github.com",
        },
        "relationships": {
            "latest_default_branch_snapshot": {
                "data": {"id": repo.snapshot_id, "type": "snapshots"}
            }
        }
    })
}

fn find_repo<'a>(store: &'a Store, repo_id: &str) -> Result<&'a Repo, StatusCode> {
    store
        .repos
        .iter()
        .find(|repo| repo.id == repo_id)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_user() -> Json<Value> {
    Json(json!({
        "data": {
            "id": "user-1",
            "type": "users",
            "attributes": {"name": "Test User", "email": "user@example.com"}
        }
    }))
}

async fn list_orgs(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let number: usize = params
        .get("page[number]")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);
    let size: usize = params
        .get("page[size]")
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    let data: Vec<Value> = store
        .orgs
        .iter()
        .skip(number.saturating_sub(1) * size)
        .take(size)
        .map(org_doc)
        .collect();
    Json(json!({ "data": data }))
}

async fn create_org(
    State(db): State<Db>,
    Json(doc): Json<Document>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    if doc.data.kind.as_deref() != Some("orgs") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let name = doc
        .data
        .attributes
        .get("name")
        .and_then(Value::as_str)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();
    let org = Org { id: mint_id(), name };
    db.write().await.orgs.push(org.clone());
    Ok((StatusCode::CREATED, Json(json!({ "data": org_doc(&org) }))))
}

async fn list_repos(
    State(db): State<Db>,
    Path(org_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    if !store.orgs.iter().any(|org| org.id == org_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let data: Vec<Value> = store
        .repos
        .iter()
        .filter(|repo| repo.org_id == org_id)
        .map(repo_doc)
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn create_repo(
    State(db): State<Db>,
    Path(org_id): Path<String>,
    Json(doc): Json<Document>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut store = db.write().await;
    if !store.orgs.iter().any(|org| org.id == org_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    if doc.data.kind.as_deref() != Some("repos") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let url = doc
        .data
        .attributes
        .get("url")
        .and_then(Value::as_str)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();
    let github_slug = url
        .strip_prefix("https://github.com/")
        .unwrap_or_default()
        .trim_end_matches(".git")
        .trim_matches('/')
        .to_string();
    if github_slug.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let repo = Repo {
        id: mint_id(),
        org_id,
        url,
        github_slug,
        snapshot_id: mint_id(),
    };
    store.repos.push(repo.clone());
    Ok((StatusCode::CREATED, Json(json!({ "data": repo_doc(&repo) }))))
}

async fn find_repo_by_slug(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let slug = params.get("github_slug").ok_or(StatusCode::BAD_REQUEST)?;
    let store = db.read().await;
    let data: Vec<Value> = store
        .repos
        .iter()
        .filter(|repo| &repo.github_slug == slug)
        .map(repo_doc)
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn get_repo(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let repo = find_repo(&store, &repo_id)?;
    Ok(Json(json!({ "data": repo_doc(repo) })))
}

async fn refresh_repo(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let repo = find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": {
            "id": repo.id,
            "type": "refreshes",
            "attributes": {"state": "scheduled"}
        }
    })))
}

async fn get_branch(
    State(db): State<Db>,
    Path((repo_id, branch)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": {
            "id": format!("{repo_id}:{branch}"),
            "type": "branches",
            "attributes": {"name": branch}
        }
    })))
}

async fn refresh_branch(
    State(db): State<Db>,
    Path((repo_id, branch)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": {
            "id": format!("{repo_id}:{branch}"),
            "type": "refreshes",
            "attributes": {"state": "scheduled", "branch": branch}
        }
    })))
}

async fn list_ref_points(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    // Newest first.
    let ref_points = [
        ("rp-2", "develop", "b4c0ffee", false),
        ("rp-1", "main", "deadbeef", true),
    ];
    let data: Vec<Value> = ref_points
        .iter()
        .filter(|(_, branch, _, _)| match params.get("filter[branch]") {
            Some(wanted) => branch == wanted,
            None => true,
        })
        .filter(|(_, _, _, analyzed)| match params.get("filter[analyzed]") {
            Some(wanted) => &analyzed.to_string() == wanted,
            None => true,
        })
        .map(|(id, branch, sha, analyzed)| {
            json!({
                "id": id,
                "type": "ref_points",
                "attributes": {"branch": branch, "commit_sha": sha, "analyzed": analyzed}
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn list_services(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    let services = [("svc-1", "slack"), ("svc-2", "webhook")];
    let data: Vec<Value> = services
        .iter()
        .filter(|(_, kind)| match params.get("filter[type]") {
            Some(wanted) => kind == wanted,
            None => true,
        })
        .map(|(id, kind)| json!({"id": id, "type": "services", "attributes": {"type": kind}}))
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn create_service_event(
    State(db): State<Db>,
    Path((repo_id, service_id)): Path<(String, String)>,
    Json(doc): Json<Document>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": {
            "id": mint_id(),
            "type": "events",
            "attributes": doc.data.attributes,
            "relationships": {"service": {"data": {"id": service_id, "type": "services"}}}
        }
    })))
}

async fn get_snapshot(
    State(db): State<Db>,
    Path((repo_id, snapshot_id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let repo = find_repo(&store, &repo_id)?;
    if repo.snapshot_id != snapshot_id {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "data": {
            "id": snapshot_id,
            "type": "snapshots",
            "attributes": {"commit_sha": "deadbeef", "ratings": [{"path": "/", "letter": "A"}]}
        }
    })))
}

async fn list_issues(
    State(db): State<Db>,
    Path((repo_id, snapshot_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let repo = find_repo(&store, &repo_id)?;
    if repo.snapshot_id != snapshot_id {
        return Err(StatusCode::NOT_FOUND);
    }
    let issues = [
        ("issue-1", "major", "confirmed", "src/lib.rs"),
        ("issue-2", "minor", "open", "src/main.rs"),
    ];
    let data: Vec<Value> = issues
        .iter()
        .filter(|(_, severity, _, _)| match params.get("filter[severity]") {
            Some(wanted) => severity == wanted,
            None => true,
        })
        .filter(|(_, _, status, _)| match params.get("filter[status]") {
            Some(wanted) => status == wanted,
            None => true,
        })
        .filter(|(_, _, _, path)| match params.get("filter[location.path]") {
            Some(wanted) => path == wanted,
            None => true,
        })
        .map(|(id, severity, status, path)| {
            json!({
                "id": id,
                "type": "issues",
                "attributes": {
                    "severity": severity,
                    "status": status,
                    "location": {"path": path}
                }
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn list_files(
    State(db): State<Db>,
    Path((repo_id, snapshot_id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let repo = find_repo(&store, &repo_id)?;
    if repo.snapshot_id != snapshot_id {
        return Err(StatusCode::NOT_FOUND);
    }
    // Path ascending.
    Ok(Json(json!({
        "data": [
            {"id": "file-1", "type": "files", "attributes": {"path": "src/lib.rs", "rating": "A"}},
            {"id": "file-2", "type": "files", "attributes": {"path": "src/main.rs", "rating": "B"}}
        ]
    })))
}

async fn list_builds(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    // Build number descending.
    let builds = [(2u64, "complete"), (1u64, "failed")];
    let data: Vec<Value> = builds
        .iter()
        .filter(|(_, state)| match params.get("filter[state]") {
            Some(wanted) => state == wanted,
            None => true,
        })
        .map(|(number, state)| {
            json!({
                "id": number.to_string(),
                "type": "builds",
                "attributes": {"number": number, "state": state}
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn get_build(
    State(db): State<Db>,
    Path((repo_id, number)): Path<(String, u64)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    if !(1..=2).contains(&number) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "data": {
            "id": number.to_string(),
            "type": "builds",
            "attributes": {"number": number, "state": if number == 2 { "complete" } else { "failed" }}
        }
    })))
}

async fn get_time_series(
    State(db): State<Db>,
    Path((repo_id, metric)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": {
            "id": metric,
            "type": "metrics",
            "attributes": {
                "points": [
                    {"timestamp": "2024-01-01T00:00:00Z", "value": 3.2},
                    {"timestamp": "2024-01-08T00:00:00Z", "value": 3.5}
                ]
            }
        }
    })))
}

async fn list_test_reports(
    State(db): State<Db>,
    Path(repo_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    Ok(Json(json!({
        "data": [
            {
                "id": "tr-1",
                "type": "test_reports",
                "attributes": {"branch": "main", "covered_percent": 85.0}
            }
        ]
    })))
}

async fn list_test_file_reports(
    State(db): State<Db>,
    Path((repo_id, _report_id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    // null marks an uncoverable line, integers are hit counts.
    Ok(Json(json!({
        "data": [
            {
                "id": "tfr-1",
                "type": "test_file_reports",
                "attributes": {"path": "src/lib.rs", "coverage": [null, 1, 0, 4]}
            }
        ]
    })))
}

async fn list_rating_changes(
    State(db): State<Db>,
    Path((repo_id, _number)): Path<(String, u64)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    let path = params.get("path").ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(json!({
        "data": [
            {
                "id": "rc-1",
                "type": "rating_changes",
                "attributes": {"path": path, "from": "A", "to": "B"}
            }
        ]
    })))
}

async fn approve_pull(
    State(db): State<Db>,
    Path((repo_id, number)): Path<(String, u64)>,
    Json(doc): Json<Document>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    find_repo(&store, &repo_id)?;
    let reason = doc
        .data
        .attributes
        .get("reason")
        .and_then(Value::as_str)
        .ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(json!({
        "data": {
            "id": mint_id(),
            "type": "approvals",
            "attributes": {"number": number, "reason": reason}
        }
    })))
}
