//! Package directory HTTP client.
//!
//! Public tracking: GET {base}/api/track/{id}. Authenticated: GET {base}/api/packages/{id}
//! and GET {base}/api/packages/user/{userId}, both with a bearer token.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::{LookupError, PackageRecord};
use crate::tools::ToolOutcome;

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One way of looking a package up by id. `find_by_id` tries these in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy<'a> {
    /// Public tracking endpoint; accepts tracking numbers and package ids.
    PublicTracking,
    /// Owner-only packages endpoint.
    Authenticated { token: &'a str },
}

impl<'a> LookupStrategy<'a> {
    /// Ordered chain for a by-id lookup: public first, authenticated only when a token is present.
    pub fn chain(auth_token: Option<&'a str>) -> Vec<LookupStrategy<'a>> {
        let mut chain = vec![LookupStrategy::PublicTracking];
        if let Some(token) = auth_token.map(str::trim).filter(|t| !t.is_empty()) {
            chain.push(LookupStrategy::Authenticated { token });
        }
        chain
    }

    fn name(&self) -> &'static str {
        match self {
            LookupStrategy::PublicTracking => "public tracking",
            LookupStrategy::Authenticated { .. } => "authenticated",
        }
    }
}

/// Client for the package directory. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Base URL with the given path segments appended (segments are percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| LookupError::Other(format!("invalid directory url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Other(format!("directory url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON body. 200 is the only success; 404 and 401 are distinguished.
    /// The bearer token is sent trimmed, and not at all when blank.
    async fn get_json(&self, segments: &[&str], token: Option<&str>) -> Result<Value, LookupError> {
        let url = self.endpoint(segments)?;
        let mut req = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(t) = token.map(str::trim).filter(|t| !t.is_empty()) {
            req = req.bearer_auth(t);
        }
        let res = req.send().await?;
        match res.status() {
            StatusCode::OK => Ok(res.json::<Value>().await?),
            StatusCode::NOT_FOUND => Err(LookupError::NotFound),
            StatusCode::UNAUTHORIZED => Err(LookupError::Unauthorized),
            other => Err(LookupError::Status(other.as_u16())),
        }
    }

    /// Run a single strategy for `package_id` and map the body to a record.
    pub async fn lookup(
        &self,
        strategy: LookupStrategy<'_>,
        package_id: &str,
    ) -> Result<PackageRecord, LookupError> {
        let body = match strategy {
            LookupStrategy::PublicTracking => {
                self.get_json(&["api", "track", package_id], None).await?
            }
            LookupStrategy::Authenticated { token } => {
                self.get_json(&["api", "packages", package_id], Some(token))
                    .await?
            }
        };
        PackageRecord::from_remote(&body, Some(package_id))
    }

    /// Find a package by id, walking the lookup chain until one strategy succeeds.
    pub async fn find_by_id(&self, package_id: &str, auth_token: Option<&str>) -> ToolOutcome {
        let chain = LookupStrategy::chain(auth_token);
        let mut last_failure: Option<(LookupStrategy<'_>, LookupError)> = None;
        for strategy in chain {
            match self.lookup(strategy, package_id).await {
                Ok(record) => {
                    return ToolOutcome::succeeded(
                        record.to_json(),
                        format!("Found package {} successfully!", package_id),
                    );
                }
                Err(e) if e.falls_through() => {
                    log::debug!(
                        "directory: {} lookup for {} failed: {}",
                        strategy.name(),
                        package_id,
                        e
                    );
                    last_failure = Some((strategy, e));
                }
                Err(e) => {
                    log::warn!(
                        "directory: {} lookup for {} aborted: {}",
                        strategy.name(),
                        package_id,
                        e
                    );
                    return find_failure(package_id, &e);
                }
            }
        }
        match last_failure {
            Some((LookupStrategy::Authenticated { .. }, e)) => find_failure(package_id, &e),
            Some((LookupStrategy::PublicTracking, e)) if e.is_transport() => {
                find_failure(package_id, &e)
            }
            _ => ToolOutcome::failed(
                format!(
                    "Package with ID '{}' was not found or requires authentication.",
                    package_id
                ),
                "Please log in to view private package details, or verify the package ID is correct.",
            ),
        }
    }

    /// Track a package by tracking number (public endpoint only).
    pub async fn track_by_number(&self, tracking_number: &str) -> ToolOutcome {
        match self.lookup(LookupStrategy::PublicTracking, tracking_number).await {
            Ok(record) => ToolOutcome::succeeded(
                record.to_json(),
                format!(
                    "Successfully tracked package with tracking number: {}",
                    tracking_number
                ),
            ),
            Err(e) => track_failure(tracking_number, &e),
        }
    }

    /// List every package owned by `user_id`. An empty list is a success with a nudge to create one.
    pub async fn list_user_packages(&self, user_id: &str, auth_token: &str) -> ToolOutcome {
        let records = match self
            .get_json(&["api", "packages", "user", user_id], Some(auth_token))
            .await
            .and_then(|body| PackageRecord::list_from_remote(&body))
        {
            Ok(r) => r,
            Err(e) => return list_failure(&e),
        };
        if records.is_empty() {
            return ToolOutcome::succeeded(Value::Array(Vec::new()), "You don't have any packages yet.")
                .with_suggestion(
                    "Would you like to create your first package? You can start by clicking 'Create Package' in the dashboard.",
                );
        }
        let count = records.len();
        let data = Value::Array(records.iter().map(PackageRecord::to_json).collect());
        ToolOutcome::succeeded(data, format!("Found {} package(s) for this user.", count))
            .with_count(count)
    }
}

/// Messages shared by all three lookups for transport and unexpected failures.
fn common_failure(e: &LookupError, activity: &str, unexpected_prefix: &str) -> ToolOutcome {
    match e {
        LookupError::Timeout => ToolOutcome::failed(
            format!("Request timed out while {}.", activity),
            "The service might be busy. Please try again in a moment.",
        ),
        LookupError::Connect(_) => ToolOutcome::failed(
            "Unable to connect to the package service.",
            "The service might be temporarily unavailable. Please try again later.",
        ),
        other => ToolOutcome::failed(
            format!("{}: {}", unexpected_prefix, other),
            "Please try again or contact support if the problem continues.",
        ),
    }
}

fn find_failure(package_id: &str, e: &LookupError) -> ToolOutcome {
    match e {
        LookupError::NotFound => ToolOutcome::failed(
            format!(
                "Package with ID '{}' was not found. Please check the package ID and try again.",
                package_id
            ),
            "Make sure you have the correct package ID format (PKG followed by numbers).",
        ),
        LookupError::Unauthorized => ToolOutcome::failed(
            "Authentication required. Please log in to view this package.",
            "This package might be private and requires authentication.",
        ),
        LookupError::Status(code) => ToolOutcome::failed(
            format!(
                "Unable to fetch package information. Service returned status: {}",
                code
            ),
            "Please try again later or contact support if the issue persists.",
        ),
        other => common_failure(
            other,
            "searching for the package",
            "An unexpected error occurred",
        ),
    }
}

fn track_failure(tracking_number: &str, e: &LookupError) -> ToolOutcome {
    match e {
        LookupError::NotFound => ToolOutcome::failed(
            format!(
                "Package with tracking number '{}' was not found.",
                tracking_number
            ),
            "Please verify the tracking number and try again. Tracking numbers are usually provided when you create a package.",
        ),
        LookupError::Unauthorized => ToolOutcome::failed(
            "Authentication required to track this package.",
            "Please log in and try again.",
        ),
        LookupError::Status(code) => ToolOutcome::failed(
            format!("Unable to track package. Service returned status: {}", code),
            "Please try again later.",
        ),
        other => common_failure(other, "tracking the package", "Error tracking package"),
    }
}

fn list_failure(e: &LookupError) -> ToolOutcome {
    match e {
        LookupError::NotFound => ToolOutcome::failed(
            "Packages for this user were not found.",
            "Verify that you are logged in with the right account, or create your first package from the dashboard.",
        ),
        LookupError::Unauthorized => ToolOutcome::failed(
            "Authentication required. Please log in again.",
            "Your session may have expired. Please refresh and log in again.",
        ),
        LookupError::Status(code) => ToolOutcome::failed(
            format!("Unable to fetch packages. Service returned status: {}", code),
            "Please try again later.",
        ),
        other => common_failure(
            other,
            "fetching your packages",
            "Error fetching user packages",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_public_only_without_token() {
        assert_eq!(
            LookupStrategy::chain(None),
            vec![LookupStrategy::PublicTracking]
        );
        assert_eq!(
            LookupStrategy::chain(Some("   ")),
            vec![LookupStrategy::PublicTracking]
        );
    }

    #[test]
    fn chain_adds_authenticated_with_token() {
        assert_eq!(
            LookupStrategy::chain(Some("tok")),
            vec![
                LookupStrategy::PublicTracking,
                LookupStrategy::Authenticated { token: "tok" }
            ]
        );
    }

    #[test]
    fn endpoint_encodes_segments_and_keeps_prefix() {
        let client = DirectoryClient::new("http://localhost:3000/gw/", DEFAULT_TIMEOUT);
        let url = client.endpoint(&["api", "track", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/gw/api/track/a%20b%2Fc");
    }

    #[test]
    fn find_failure_messages() {
        let nf = find_failure("PKG1", &LookupError::NotFound);
        assert!(!nf.success);
        assert!(nf.message_text().to_lowercase().contains("not found"));
        assert!(nf.suggestion.as_deref().is_some_and(|s| !s.is_empty()));

        let other = find_failure("PKG1", &LookupError::Status(503));
        assert!(other.message_text().contains("503"));

        let timeout = find_failure("PKG1", &LookupError::Timeout);
        assert!(timeout.message_text().contains("timed out"));

        let connect = find_failure("PKG1", &LookupError::Connect("refused".into()));
        assert!(connect.message_text().contains("Unable to connect"));

        let odd = find_failure("PKG1", &LookupError::Decode("bad json".into()));
        assert!(odd.message_text().contains("bad json"));
    }

    #[test]
    fn unauthorized_messages_mention_authentication() {
        for outcome in [
            find_failure("PKG1", &LookupError::Unauthorized),
            track_failure("TR1", &LookupError::Unauthorized),
            list_failure(&LookupError::Unauthorized),
        ] {
            assert!(outcome.message_text().contains("Authentication required"));
        }
    }
}
