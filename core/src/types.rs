//! Call-local value types: pagination and endpoint filters.
//!
//! # Design
//! These values are built fresh for every invocation and passed by argument;
//! nothing here is ever staged on the client between calls. Each type knows
//! how to append itself to a request's query pairs using the JSON:API
//! `page[...]` / `filter[...]` key conventions.

use serde::{Deserialize, Serialize};

pub(crate) type QueryPairs = Vec<(String, String)>;

/// Metrics accepted by `get_time_series`. Anything else is rejected
/// client-side before a request is made.
pub const TIME_SERIES_METRICS: [&str; 7] = [
    "gpa",
    "ratings.A",
    "ratings.B",
    "ratings.C",
    "ratings.D",
    "ratings.E",
    "ratings.F",
];

/// Pagination for list endpoints.
///
/// `number` and `size` are distinct fields and are sent as `page[number]` and
/// `page[size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    pub(crate) fn append_to(&self, query: &mut QueryPairs) {
        query.push(("page[number]".to_string(), self.number.to_string()));
        query.push(("page[size]".to_string(), self.size.to_string()));
    }
}

/// Filter for `get_ref_points`. Unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPointFilter {
    pub analyzed: Option<bool>,
    pub branch: Option<String>,
    pub commit_sha: Option<String>,
    pub local_ref: Option<String>,
}

impl RefPointFilter {
    pub(crate) fn append_to(&self, query: &mut QueryPairs) {
        if let Some(analyzed) = self.analyzed {
            query.push(("filter[analyzed]".to_string(), analyzed.to_string()));
        }
        push_opt(query, "filter[branch]", &self.branch);
        push_opt(query, "filter[commit_sha]", &self.commit_sha);
        push_opt(query, "filter[local_ref]", &self.local_ref);
    }
}

/// Filter for `get_issues`. `location_path` maps to `filter[location.path]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilter {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub location_path: Option<String>,
}

impl IssueFilter {
    pub(crate) fn append_to(&self, query: &mut QueryPairs) {
        push_opt(query, "filter[severity]", &self.severity);
        push_opt(query, "filter[status]", &self.status);
        push_opt(query, "filter[location.path]", &self.location_path);
    }
}

/// Filter for `get_builds`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFilter {
    pub state: Option<String>,
    pub local_ref: Option<String>,
}

impl BuildFilter {
    pub(crate) fn append_to(&self, query: &mut QueryPairs) {
        push_opt(query, "filter[state]", &self.state);
        push_opt(query, "filter[local_ref]", &self.local_ref);
    }
}

fn push_opt(query: &mut QueryPairs, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.clone()));
    }
}
