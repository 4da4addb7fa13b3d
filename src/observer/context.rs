use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use crate::database::schema::Collection;
use crate::database::store::{document_id, Document, DocumentStore};
use crate::observer::error::ObserverError;
use crate::observer::traits::ObserverRing;
use crate::services::geocoder::Geocoder;
use crate::types::Operation;

/// Collaborators observers may call while a write is in flight
#[derive(Clone)]
pub struct ObserverServices {
    pub store: Arc<dyn DocumentStore>,
    pub geocoder: Arc<dyn Geocoder>,
}

/// State that flows through the observer pipeline for a single write
pub struct ObserverContext {
    pub operation: Operation,
    pub collection: Collection,

    /// Document to be written: the new document on create, the merged
    /// document on update, the stored document on delete
    pub record: Document,

    /// Stored state before an update or delete
    pub original: Option<Document>,

    pub services: ObserverServices,

    /// Skip ring 1, used for internal bookkeeping writes
    pub skip_validation: bool,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,
    pub errors: Vec<ObserverError>,
}

impl ObserverContext {
    pub fn new(
        operation: Operation,
        collection: Collection,
        record: Document,
        original: Option<Document>,
        services: ObserverServices,
    ) -> Self {
        Self {
            operation,
            collection,
            record,
            original,
            services,
            skip_validation: false,
            start_time: Instant::now(),
            current_ring: None,
            errors: Vec::new(),
        }
    }

    pub fn record_id(&self) -> Option<Uuid> {
        document_id(&self.record).ok()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.record.insert(field.to_string(), value.into());
    }

    /// True on create when the field is present, or on update when it
    /// differs from the stored value
    pub fn changed(&self, field: &str) -> bool {
        match (&self.original, self.operation) {
            (_, Operation::Delete) => false,
            (None, _) => self.get(field).is_some(),
            (Some(original), _) => original.get(field) != self.record.get(field),
        }
    }

    /// Get total execution time
    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
