pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::BootcampInput;
pub use course::CourseInput;
pub use review::ReviewInput;
pub use user::{User, UserInput};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::store::Document;

/// Current time in the RFC 3339 form stored on documents
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize a request payload into document fields, leaving out fields the
/// client did not send
pub fn input_document<T: Serialize>(input: &T) -> Document {
    match serde_json::to_value(input) {
        Ok(Value::Object(mut map)) => {
            map.retain(|_, v| !v.is_null());
            map
        }
        _ => Document::new(),
    }
}

/// Give a new document its identity: a fresh `id` and `createdAt`
pub fn stamp_new(mut doc: Document) -> Document {
    doc.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    doc.insert("createdAt".to_string(), Value::String(timestamp_now()));
    doc
}

/// Read a reference field such as `user` or `bootcamp`
pub fn doc_uuid(doc: &Document, field: &str) -> Option<Uuid> {
    doc.get(field).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

/// Insert `value` for `field` unless the document already has one
pub fn default_field(doc: &mut Document, field: &str, value: impl Into<Value>) {
    let present = doc.get(field).is_some_and(|v| !v.is_null());
    if !present {
        doc.insert(field.to_string(), value.into());
    }
}
