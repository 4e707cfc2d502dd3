//! Canonical rendering of a package returned by the remote directory.
//!
//! The directory speaks camelCase with Mongo-style `_id`; the assistant presents snake_case.
//! Values are passed through untouched apart from the key renaming; fields without a
//! canonical slot are carried along with their keys converted to snake_case.

use serde::Serialize;
use serde_json::{Map, Value};

use super::LookupError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_contact: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<Value>,
    /// Remaining remote fields (progress, address, dimensions, ...), keys in snake_case.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const UNKNOWN_STATUS: &str = "Unknown";

/// Remote keys consumed by the canonical fields.
const MAPPED_KEYS: [&str; 16] = [
    "_id",
    "id",
    "trackingId",
    "trackingNumber",
    "status",
    "name",
    "description",
    "weight",
    "recipientName",
    "recipientContact",
    "location",
    "eta",
    "category",
    "createdAt",
    "updatedAt",
    "lastUpdate",
];

/// Serialized names of the canonical fields; an extra key may not shadow them.
const CANONICAL_KEYS: [&str; 14] = [
    "id",
    "tracking_number",
    "status",
    "name",
    "description",
    "weight",
    "recipient_name",
    "recipient_contact",
    "location",
    "eta",
    "category",
    "created_at",
    "updated_at",
    "last_update",
];

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Non-null remote fields that have no canonical slot, renamed to snake_case.
fn extra_fields(obj: &Map<String, Value>) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, v)| !v.is_null() && !MAPPED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (snake_case(k), v.clone()))
        .filter(|(k, _)| !CANONICAL_KEYS.contains(&k.as_str()))
        .collect()
}

/// Non-null value for `key`.
fn field(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

/// String form of an identifier-like value (strings as-is, anything else via its JSON text).
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    field(obj, key).map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl PackageRecord {
    /// Map one remote package object. `fallback_id` is used when neither `_id` nor `id` is present.
    pub fn from_remote(value: &Value, fallback_id: Option<&str>) -> Result<Self, LookupError> {
        let obj = value
            .as_object()
            .ok_or_else(|| LookupError::Decode("expected a package object".to_string()))?;
        let id = text_field(obj, "_id")
            .or_else(|| text_field(obj, "id"))
            .or_else(|| fallback_id.map(str::to_string));
        Ok(Self {
            id,
            tracking_number: text_field(obj, "trackingId")
                .or_else(|| text_field(obj, "trackingNumber")),
            status: text_field(obj, "status").unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
            name: field(obj, "name"),
            description: field(obj, "description"),
            weight: field(obj, "weight"),
            recipient_name: field(obj, "recipientName"),
            recipient_contact: field(obj, "recipientContact"),
            location: field(obj, "location"),
            eta: field(obj, "eta"),
            category: field(obj, "category"),
            created_at: field(obj, "createdAt"),
            updated_at: field(obj, "updatedAt"),
            last_update: field(obj, "lastUpdate"),
            extra: extra_fields(obj),
        })
    }

    /// Map a remote list of packages.
    pub fn list_from_remote(value: &Value) -> Result<Vec<Self>, LookupError> {
        let items = value
            .as_array()
            .ok_or_else(|| LookupError::Decode("expected a list of packages".to_string()))?;
        items.iter().map(|v| Self::from_remote(v, None)).collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
