//! The endpoint catalog: one method per API operation.
//!
//! Each operation is a pure mapping from typed arguments to a route, query
//! and body, delegated to the request plumbing in `client.rs`. Responses are
//! returned as raw `serde_json::Value` documents; the response schema is
//! owned by CodeClimate and not modeled here. Operations that take an
//! identifier reject blank values before any network traffic.

use serde_json::{json, Value};

use crate::client::CodeClimateClient;
use crate::error::ApiError;
use crate::types::{BuildFilter, IssueFilter, Page, QueryPairs, RefPointFilter, TIME_SERIES_METRICS};

impl CodeClimateClient {
    /// The currently authenticated user.
    pub fn get_user(&self) -> Result<Value, ApiError> {
        self.get("user", &Vec::new())
    }

    /// Organizations visible to the current user.
    pub fn get_orgs(&self, page: Option<Page>) -> Result<Value, ApiError> {
        let mut query = Vec::new();
        append_page(&mut query, page);
        self.get("orgs", &query)
    }

    /// Create an organization. The server answers 201 on success.
    pub fn create_org(&self, name: &str) -> Result<Value, ApiError> {
        require("name", name)?;
        self.post("orgs", Some("orgs"), json!({ "name": name }), 201)
    }

    /// Repositories belonging to an organization.
    pub fn get_repos(&self, org_id: &str) -> Result<Value, ApiError> {
        require("org_id", org_id)?;
        self.get(&format!("orgs/{org_id}/repos"), &Vec::new())
    }

    /// Add a private GitHub repository to an organization. `url` must be a
    /// `https://github.com/` repository URL.
    pub fn add_private_repo(&self, org_id: &str, url: &str) -> Result<Value, ApiError> {
        require("org_id", org_id)?;
        require("url", url)?;
        if !url.starts_with("https://github.com/") {
            return Err(ApiError::Validation(format!(
                "{url:?} is not a GitHub repository URL"
            )));
        }
        self.post(
            &format!("orgs/{org_id}/repos"),
            Some("repos"),
            json!({ "url": url }),
            201,
        )
    }

    /// A repository by its CodeClimate id.
    pub fn get_repo_by_id(&self, repo_id: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        self.get(&format!("repos/{repo_id}"), &Vec::new())
    }

    /// A repository by its GitHub slug (`owner/name`), the second lookup key
    /// for the same entity.
    pub fn get_repo_by_git_slug(&self, slug: &str) -> Result<Value, ApiError> {
        require("slug", slug)?;
        self.get(
            "repos",
            &vec![("github_slug".to_string(), slug.to_string())],
        )
    }

    /// Ref points observed for a repository, newest first.
    pub fn get_ref_points(
        &self,
        repo_id: &str,
        filter: &RefPointFilter,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        let mut query = Vec::new();
        filter.append_to(&mut query);
        self.get(&format!("repos/{repo_id}/ref_points"), &query)
    }

    /// Services configured on a repository, optionally narrowed by type
    /// (e.g. `"slack"`).
    pub fn get_repo_services(
        &self,
        repo_id: &str,
        service_type: Option<&str>,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        let mut query = Vec::new();
        if let Some(service_type) = service_type {
            query.push(("filter[type]".to_string(), service_type.to_string()));
        }
        self.get(&format!("repos/{repo_id}/services"), &query)
    }

    /// Send a free-form event payload (issue name, description, location) to
    /// one of the repository's configured services.
    pub fn trigger_repo_service_event(
        &self,
        repo_id: &str,
        service_id: &str,
        event: Value,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("service_id", service_id)?;
        self.post(
            &format!("repos/{repo_id}/services/{service_id}/events"),
            None,
            event,
            200,
        )
    }

    /// A completed analysis of a specific commit.
    pub fn get_snapshot(&self, repo_id: &str, snapshot_id: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("snapshot_id", snapshot_id)?;
        self.get(
            &format!("repos/{repo_id}/snapshots/{snapshot_id}"),
            &Vec::new(),
        )
    }

    /// Issues found in a snapshot.
    pub fn get_issues(
        &self,
        repo_id: &str,
        snapshot_id: &str,
        filter: &IssueFilter,
        page: Option<Page>,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("snapshot_id", snapshot_id)?;
        let mut query = Vec::new();
        filter.append_to(&mut query);
        append_page(&mut query, page);
        self.get(
            &format!("repos/{repo_id}/snapshots/{snapshot_id}/issues"),
            &query,
        )
    }

    /// Files analyzed in a snapshot, path ascending.
    pub fn get_files(&self, repo_id: &str, snapshot_id: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("snapshot_id", snapshot_id)?;
        self.get(
            &format!("repos/{repo_id}/snapshots/{snapshot_id}/files"),
            &Vec::new(),
        )
    }

    /// Analysis attempts for a repository, build number descending.
    pub fn get_builds(&self, repo_id: &str, filter: &BuildFilter) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        let mut query = Vec::new();
        filter.append_to(&mut query);
        self.get(&format!("repos/{repo_id}/builds"), &query)
    }

    /// A single build by number.
    pub fn get_build(&self, repo_id: &str, number: u64) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        self.get(&format!("repos/{repo_id}/builds/{number}"), &Vec::new())
    }

    /// Metric history between two dates. `metric` must be one of
    /// [`TIME_SERIES_METRICS`]; anything else fails client-side without a
    /// network call.
    pub fn get_time_series(
        &self,
        repo_id: &str,
        metric: &str,
        from: &str,
        to: &str,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("from", from)?;
        require("to", to)?;
        if !TIME_SERIES_METRICS.contains(&metric) {
            return Err(ApiError::Validation(format!(
                "unknown metric {metric:?}, expected one of: {}",
                TIME_SERIES_METRICS.join(", ")
            )));
        }
        let query = vec![
            ("filter[from]".to_string(), from.to_string()),
            ("filter[to]".to_string(), to.to_string()),
        ];
        self.get(&format!("repos/{repo_id}/metrics/{metric}"), &query)
    }

    /// Test coverage reports for a repository.
    pub fn get_test_reports(&self, repo_id: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        self.get(&format!("repos/{repo_id}/test_reports"), &Vec::new())
    }

    /// Per-file coverage for a test report. In the coverage arrays, `null`
    /// marks an uncoverable line and an integer is the hit count.
    pub fn get_test_file_reports(
        &self,
        repo_id: &str,
        test_report_id: &str,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("test_report_id", test_report_id)?;
        self.get(
            &format!("repos/{repo_id}/test_reports/{test_report_id}/test_file_reports"),
            &Vec::new(),
        )
    }

    /// Letter-rating changes a pull request introduces for one file.
    pub fn get_rating_changes(
        &self,
        repo_id: &str,
        pull_number: u64,
        path: &str,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("path", path)?;
        self.get(
            &format!("repos/{repo_id}/pulls/{pull_number}/rating_changes"),
            &vec![("path".to_string(), path.to_string())],
        )
    }

    /// Approve a pull request. `reason` defaults to `"merge"`.
    pub fn approve_pull_request(
        &self,
        repo_id: &str,
        pull_number: u64,
        reason: Option<&str>,
    ) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        let reason = reason.unwrap_or("merge");
        self.post(
            &format!("repos/{repo_id}/pulls/{pull_number}/approvals"),
            None,
            json!({ "reason": reason }),
            200,
        )
    }

    /// Ask CodeClimate to re-analyze a repository.
    pub fn refresh_repo(&self, repo_id: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        self.get(&format!("repos/{repo_id}/refresh"), &Vec::new())
    }

    /// A tracked branch of a repository.
    pub fn get_repo_branch(&self, repo_id: &str, branch: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("branch", branch)?;
        self.get(&format!("repos/{repo_id}/branches/{branch}"), &Vec::new())
    }

    /// Ask CodeClimate to re-analyze a single branch.
    pub fn refresh_repo_branch(&self, repo_id: &str, branch: &str) -> Result<Value, ApiError> {
        require("repo_id", repo_id)?;
        require("branch", branch)?;
        self.get(
            &format!("repos/{repo_id}/branches/{branch}/refresh"),
            &Vec::new(),
        )
    }
}

fn append_page(query: &mut QueryPairs, page: Option<Page>) {
    if let Some(page) = page {
        page.append_to(query);
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}
