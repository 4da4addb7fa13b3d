pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{public_view, project, Populate, Repository};
pub use schema::Collection;
pub use store::{Document, DocumentStore, StoreError};
