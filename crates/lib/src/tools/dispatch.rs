//! Tool dispatch: run the package lookup an intent calls for and tag the outcome with the tool name.

use serde::Serialize;

use crate::directory::DirectoryClient;
use crate::intent::{present, Intent};
use crate::tools::ToolOutcome;

pub const FIND_PACKAGE_BY_ID: &str = "find_package_by_id";
pub const TRACK_PACKAGE_BY_TRACKING_NUMBER: &str = "track_package_by_tracking_number";
pub const GET_USER_PACKAGES: &str = "get_user_packages";

/// Description of one tool, as listed by `GET /tools/available`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<&'static str>,
    pub endpoint: &'static str,
}

/// Tools the dispatcher can run.
pub fn available_tools() -> Vec<ToolInfo> {
    vec![
        ToolInfo {
            name: FIND_PACKAGE_BY_ID,
            description: "Find a package by its unique ID",
            parameters: vec!["package_id", "auth_token (optional)"],
            endpoint: "/tools/find-package",
        },
        ToolInfo {
            name: TRACK_PACKAGE_BY_TRACKING_NUMBER,
            description: "Track a package by tracking number",
            parameters: vec!["tracking_number"],
            endpoint: "/tools/track-package",
        },
        ToolInfo {
            name: GET_USER_PACKAGES,
            description: "Get all packages for a user",
            parameters: vec!["user_id", "auth_token"],
            endpoint: "/tools/user-packages",
        },
    ]
}

/// Runs package lookups on behalf of a conversation turn (or a direct tool request).
#[derive(Clone)]
pub struct ToolDispatcher {
    directory: DirectoryClient,
}

impl ToolDispatcher {
    pub fn new(directory: DirectoryClient) -> Self {
        Self { directory }
    }

    /// Run the tool for `intent`. Returns `None` when no tool applies: `Intent::None`, or
    /// `ListUserPackages` without both a user id and an auth token.
    pub async fn dispatch(
        &self,
        intent: &Intent,
        user_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> Option<ToolOutcome> {
        match intent {
            Intent::FindById { id } => Some(self.find_package(id, auth_token).await),
            Intent::TrackByNumber { number } => Some(self.track_package(number).await),
            Intent::ListUserPackages => match (user_id, auth_token) {
                (Some(user), Some(token)) if present(Some(user)) && present(Some(token)) => {
                    Some(self.user_packages(user, token).await)
                }
                _ => {
                    log::debug!("tools: {} skipped, missing user id or auth token", GET_USER_PACKAGES);
                    None
                }
            },
            Intent::None => None,
        }
    }

    pub async fn find_package(&self, package_id: &str, auth_token: Option<&str>) -> ToolOutcome {
        let outcome = self.directory.find_by_id(package_id, auth_token).await;
        finish(FIND_PACKAGE_BY_ID, package_id, outcome)
    }

    pub async fn track_package(&self, tracking_number: &str) -> ToolOutcome {
        let outcome = self.directory.track_by_number(tracking_number).await;
        finish(TRACK_PACKAGE_BY_TRACKING_NUMBER, tracking_number, outcome)
    }

    /// Direct variant of the list tool: reports missing credentials as a failed outcome instead of skipping.
    pub async fn user_packages(&self, user_id: &str, auth_token: &str) -> ToolOutcome {
        if !present(Some(user_id)) || !present(Some(auth_token)) {
            let outcome = ToolOutcome::failed(
                "Authentication required. A user id and auth token are needed to list packages.",
                "Please log in and try again.",
            );
            return finish(GET_USER_PACKAGES, user_id, outcome);
        }
        let outcome = self.directory.list_user_packages(user_id, auth_token).await;
        finish(GET_USER_PACKAGES, user_id, outcome)
    }
}

fn finish(tool: &str, subject: &str, outcome: ToolOutcome) -> ToolOutcome {
    log::info!(
        "tools: {} for {}: {}",
        tool,
        subject,
        if outcome.success { "success" } else { "failed" }
    );
    outcome.with_tool_name(tool)
}
