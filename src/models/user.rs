//! User model for storage and API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored at `users/{userId}`.
///
/// The document id is the auth uid supplied at creation and is not repeated
/// inside the document. Values are stored exactly as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id as read back; never stored as a field or returned
    #[serde(rename = "_firestore_id", skip_serializing)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<Value>,
    /// Account creation time as sent by the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
    /// Weight given at sign-up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    /// Weight set through a profile update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Value>,
    /// Any other stored field, returned unchanged on read
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub extra: Map<String, Value>,
}

/// Fields replaced by a profile update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<Value>,
}

impl ProfileUpdate {
    /// Document fields this update overwrites.
    pub const FIELDS: [&'static str; 2] = ["height", "currentWeight"];
}
