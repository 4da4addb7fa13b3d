use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::models::{input_document, stamp_new};
use crate::database::store::Document;

/// Writable review fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<f64>,
}

impl ReviewInput {
    pub fn into_new_document(self, bootcamp: &str, user: &str) -> Document {
        let mut doc = input_document(&self);
        doc.insert("bootcamp".to_string(), Value::String(bootcamp.to_string()));
        doc.insert("user".to_string(), Value::String(user.to_string()));
        stamp_new(doc)
    }

    pub fn into_changes(self) -> Document {
        input_document(&self)
    }
}
