use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::database::models::{default_field, input_document, stamp_new};
use crate::database::store::Document;

/// Writable course fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    /// New course owned by `user` under `bootcamp`
    pub fn into_new_document(self, bootcamp: &str, user: &str) -> Document {
        let mut doc = input_document(&self);
        default_field(&mut doc, "scholarshipAvailable", false);
        doc.insert("bootcamp".to_string(), Value::String(bootcamp.to_string()));
        doc.insert("user".to_string(), Value::String(user.to_string()));
        stamp_new(doc)
    }

    pub fn into_changes(self) -> Document {
        input_document(&self)
    }
}

/// Accept `"8"` as well as `8` for a week count
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("invalid weeks value: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weeks_accepts_numbers() {
        let input: CourseInput = serde_json::from_value(json!({ "weeks": 12 })).unwrap();
        assert_eq!(input.weeks.as_deref(), Some("12"));
        assert!(serde_json::from_value::<CourseInput>(json!({ "weeks": [1] })).is_err());
    }

    #[test]
    fn new_course_carries_references() {
        let doc = CourseInput::default().into_new_document("b-1", "u-1");
        assert_eq!(doc["bootcamp"], json!("b-1"));
        assert_eq!(doc["user"], json!("u-1"));
        assert_eq!(doc["scholarshipAvailable"], json!(false));
    }
}
