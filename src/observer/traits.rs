use async_trait::async_trait;
use std::time::Duration;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::types::Operation;

/// Observer rings with semantic meaning, executed in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    InputValidation = 1,    // Required fields, formats, enums
    Business = 3,           // Domain rules, cascades
    Enrichment = 4,         // Derived fields, hashing, geocoding
    Database = 5,           // Store write (handled by repository)
    PostDatabase = 6,       // Aggregates that depend on the write
}

impl ObserverRing {
    pub fn pre_database() -> [Self; 3] {
        [ObserverRing::InputValidation, ObserverRing::Business, ObserverRing::Enrichment]
    }
}

/// Base trait for all observers with metadata and applicability checks
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Check if observer applies to this operation
    fn applies_to_operation(&self, op: Operation) -> bool;

    /// Check if observer applies to this collection
    fn applies_to_collection(&self, collection: Collection) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }
}

/// Ring 1: Input Validation - required fields, formats, enums
#[async_trait]
pub trait InputValidationObserver: Observer {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}

/// Ring 3: Business Logic - domain rules, cascades
#[async_trait]
pub trait BusinessObserver: Observer {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}

/// Ring 4: Enrichment - derived fields
#[async_trait]
pub trait EnrichmentObserver: Observer {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}

/// Ring 6: Post-Database - sees the persisted record
#[async_trait]
pub trait PostDatabaseObserver: Observer {
    async fn execute(&self, ctx: &ObserverContext) -> Result<(), ObserverError>;
}

/// Concrete observer kinds for dynamic dispatch
pub enum ObserverBox {
    InputValidation(Box<dyn InputValidationObserver>),
    Business(Box<dyn BusinessObserver>),
    Enrichment(Box<dyn EnrichmentObserver>),
    PostDatabase(Box<dyn PostDatabaseObserver>),
}

impl ObserverBox {
    pub fn name(&self) -> &'static str {
        match self {
            ObserverBox::InputValidation(o) => o.name(),
            ObserverBox::Business(o) => o.name(),
            ObserverBox::Enrichment(o) => o.name(),
            ObserverBox::PostDatabase(o) => o.name(),
        }
    }

    pub fn ring(&self) -> ObserverRing {
        match self {
            ObserverBox::InputValidation(o) => o.ring(),
            ObserverBox::Business(o) => o.ring(),
            ObserverBox::Enrichment(o) => o.ring(),
            ObserverBox::PostDatabase(o) => o.ring(),
        }
    }

    pub fn applies(&self, op: Operation, collection: Collection) -> bool {
        match self {
            ObserverBox::InputValidation(o) => o.applies_to_operation(op) && o.applies_to_collection(collection),
            ObserverBox::Business(o) => o.applies_to_operation(op) && o.applies_to_collection(collection),
            ObserverBox::Enrichment(o) => o.applies_to_operation(op) && o.applies_to_collection(collection),
            ObserverBox::PostDatabase(o) => o.applies_to_operation(op) && o.applies_to_collection(collection),
        }
    }

    pub fn timeout(&self) -> Duration {
        match self {
            ObserverBox::InputValidation(o) => o.timeout(),
            ObserverBox::Business(o) => o.timeout(),
            ObserverBox::Enrichment(o) => o.timeout(),
            ObserverBox::PostDatabase(o) => o.timeout(),
        }
    }

    pub async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        match self {
            ObserverBox::InputValidation(o) => o.execute(ctx).await,
            ObserverBox::Business(o) => o.execute(ctx).await,
            ObserverBox::Enrichment(o) => o.execute(ctx).await,
            ObserverBox::PostDatabase(o) => o.execute(ctx).await,
        }
    }
}
