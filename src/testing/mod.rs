use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::AppConfig;
use crate::database::models::stamp_new;
use crate::database::{Collection, Document, DocumentStore, MemoryStore, Repository};
use crate::observer::{ObserverContext, ObserverServices};
use crate::services::email::{EmailError, Mailer, OutgoingEmail};
use crate::services::geocoder::{GeoLocation, GeocodeError, Geocoder};
use crate::state::AppState;
use crate::types::Operation;

pub const TEST_JWT_SECRET: &str = "devcamper-test-secret";

/// Geocoder answering from a fixed table of postal codes. A query matches
/// when it contains one of the known zipcodes.
pub struct StaticGeocoder {
    places: Vec<GeoLocation>,
}

fn place(latitude: f64, longitude: f64, street: &str, city: &str, state: &str, zipcode: &str) -> GeoLocation {
    GeoLocation {
        latitude,
        longitude,
        formatted_address: format!("{}, {}, {} {}, US", street, city, state, zipcode),
        street: Some(street.to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        zipcode: Some(zipcode.to_string()),
        country: Some("US".to_string()),
    }
}

impl Default for StaticGeocoder {
    fn default() -> Self {
        Self {
            places: vec![
                place(42.350846, -71.104028, "233 Bay State Rd", "Boston", "MA", "02215"),
                place(42.638469, -71.324637, "220 Pawtucket St", "Lowell", "MA", "01854"),
                place(44.478314, -73.196866, "45 Upper College Rd", "Burlington", "VT", "05405"),
                place(41.48086, -71.525909, "85 South Prospect St", "Kingston", "RI", "02881"),
            ],
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeoLocation, GeocodeError> {
        self.places
            .iter()
            .find(|p| p.zipcode.as_deref().is_some_and(|zip| query.contains(zip)))
            .cloned()
            .ok_or_else(|| GeocodeError::NoResults(query.to_string()))
    }
}

/// Mailer that keeps every message in memory, optionally refusing to send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.set_failing(true);
        mailer
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Token at the end of the reset link in the most recent message
    pub fn last_reset_token(&self) -> Option<String> {
        let last = self.sent().pop()?;
        let start = last.body.find("/resetpassword/")? + "/resetpassword/".len();
        let token: String = last.body[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();
        (!token.is_empty()).then_some(token)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::Transport("recording mailer is set to fail".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

pub fn memory_services() -> ObserverServices {
    ObserverServices {
        store: Arc::new(MemoryStore::new()),
        geocoder: Arc::new(StaticGeocoder::default()),
    }
}

pub fn memory_repository() -> Repository {
    Repository::new(Arc::new(MemoryStore::new()), Arc::new(StaticGeocoder::default()))
}

/// Context for a create of `record` against fresh in-memory services
pub fn observer_context(collection: Collection, record: Value) -> ObserverContext {
    ObserverContext::new(Operation::Create, collection, as_document(record), None, memory_services())
}

/// Insert straight into the store, bypassing the observer pipeline
pub async fn seed(services: &ObserverServices, collection: Collection, record: Value) -> Document {
    seed_with(services.store.as_ref(), collection, record).await
}

pub async fn seed_with(store: &dyn DocumentStore, collection: Collection, record: Value) -> Document {
    store
        .insert(collection, stamp_new(as_document(record)))
        .await
        .unwrap_or_else(|e| panic!("seeding {} failed: {}", collection, e))
}

fn as_document(record: Value) -> Document {
    match record {
        Value::Object(map) => map,
        other => panic!("test record must be a JSON object, got {}", other),
    }
}

/// Development defaults with a signing secret and uploads under `upload_dir`
pub fn test_config(upload_dir: &Path) -> AppConfig {
    let upload_dir = upload_dir.to_string_lossy().into_owned();
    AppConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
        "FILE_UPLOAD_PATH" => Some(upload_dir.clone()),
        "MAX_FILE_UPLOAD" => Some("10000".to_string()),
        _ => None,
    })
}

/// Application state over an in-memory store with the test doubles wired in
pub struct TestContext {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn new(upload_dir: &Path) -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let repository = memory_repository();
        let state = AppState::new(test_config(upload_dir), repository, mailer.clone());
        Self { state, mailer }
    }
}
