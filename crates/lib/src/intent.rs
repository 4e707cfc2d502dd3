//! Intent classification: decide from free text whether a package lookup is warranted and
//! extract the identifier it should use.
//!
//! Matching runs on the lowercased message. Identifier-shaped substrings win over phrase
//! triggers; the first rule that matches decides the intent.

use regex::Regex;
use std::sync::OnceLock;

/// Phrases that ask for the caller's own package list.
const USER_PACKAGE_TRIGGERS: [&str; 3] = ["my packages", "all packages", "show my"];

/// Phrases that make a message worth a lookup attempt at all (superset of the list triggers).
const TOOL_TRIGGERS: [&str; 10] = [
    "find package",
    "show package",
    "package id",
    "track package",
    "tracking number",
    "my packages",
    "all packages",
    "show my",
    "package status",
    "where is my",
];

/// Classified purpose of one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FindById { id: String },
    TrackByNumber { number: String },
    ListUserPackages,
    None,
}

fn pkg_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pkg\d+").expect("valid pkg id pattern"))
}

fn object_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9a-f]{24}").expect("valid object id pattern"))
}

fn tracking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tr\d+").expect("valid tracking pattern"))
}

fn loose_tracking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tr\d+|track.*\d+").expect("valid loose tracking pattern"))
}

/// Classify a message. Pure and case-insensitive; `ListUserPackages` is returned on a phrase
/// match regardless of session context (see [`Intent::gate`]).
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();

    if let Some(m) = pkg_id_re().find(&lower) {
        return Intent::FindById {
            id: m.as_str().to_uppercase(),
        };
    }
    if let Some(m) = object_id_re().find(&lower) {
        return Intent::FindById {
            id: m.as_str().to_string(),
        };
    }
    if let Some(m) = tracking_re().find(&lower) {
        return Intent::TrackByNumber {
            number: m.as_str().to_uppercase(),
        };
    }
    if USER_PACKAGE_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Intent::ListUserPackages;
    }
    Intent::None
}

/// Classify and apply the session-context gate in one step.
pub fn classify_with_context(text: &str, user_id: Option<&str>, auth_token: Option<&str>) -> Intent {
    classify(text).gate(user_id, auth_token)
}

/// Dispatch gate: true when the message looks like it needs a lookup. Independent of
/// [`classify`]; a message may pass here and still classify as [`Intent::None`].
pub fn should_use_tools(text: &str) -> bool {
    let lower = text.to_lowercase();
    if pkg_id_re().is_match(&lower) || object_id_re().is_match(&lower) {
        return true;
    }
    if loose_tracking_re().is_match(&lower) {
        return true;
    }
    TOOL_TRIGGERS.iter().any(|t| lower.contains(t))
}

/// True when the value is present and not blank.
pub(crate) fn present(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

impl Intent {
    /// Downgrade `ListUserPackages` to `None` unless both user id and auth token are supplied.
    pub fn gate(self, user_id: Option<&str>, auth_token: Option<&str>) -> Intent {
        match self {
            Intent::ListUserPackages if !(present(user_id) && present(auth_token)) => Intent::None,
            other => other,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Intent::None)
    }
}
