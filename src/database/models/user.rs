use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{default_field, input_document, stamp_new};
use crate::database::store::{Document, StoreError};
use crate::types::Role;

/// Typed view of a stored user, including the fields never sent to clients
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub reset_password_token: Option<String>,
    #[serde(default)]
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(doc.clone()))
            .map_err(|e| StoreError::Backend(format!("malformed user document: {}", e)))
    }
}

/// Writable user fields. `role` stays a string so the validator can report
/// an out-of-range value with its own message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserInput {
    pub fn into_new_document(self) -> Document {
        let mut doc = input_document(&self);
        default_field(&mut doc, "role", Role::default().as_str());
        stamp_new(doc)
    }

    pub fn into_changes(self) -> Document {
        input_document(&self)
    }
}
