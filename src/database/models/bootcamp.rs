use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::models::{default_field, input_document, stamp_new};
use crate::database::store::Document;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Writable bootcamp fields. `address` is input only; geocoding turns it
/// into `location` before the document is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl BootcampInput {
    pub fn into_new_document(self, user: &str) -> Document {
        let mut doc = input_document(&self);
        for flag in ["housing", "jobAssistance", "jobGuarantee", "acceptGi"] {
            default_field(&mut doc, flag, false);
        }
        doc.insert("photo".to_string(), Value::String(DEFAULT_PHOTO.to_string()));
        doc.insert("user".to_string(), Value::String(user.to_string()));
        stamp_new(doc)
    }

    pub fn into_changes(self) -> Document {
        input_document(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derived_fields_cannot_be_supplied() {
        let input: BootcampInput = serde_json::from_value(json!({
            "name": "Devworks Bootcamp",
            "averageCost": 1,
            "photo": "mine.jpg",
            "slug": "custom"
        }))
        .unwrap();
        let doc = input.into_new_document("owner");
        assert_eq!(doc["photo"], json!(DEFAULT_PHOTO));
        assert!(doc.get("averageCost").is_none());
        assert!(doc.get("slug").is_none());
        assert_eq!(doc["housing"], json!(false));
    }
}
