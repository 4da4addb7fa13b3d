use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::schema::Collection;
use crate::database::store::{document_id, unique_key, Document, DocumentStore, StoreError};
use crate::filter::Filter;

/// In-process document store. Each collection keeps insertion order so
/// unsorted reads come back the way they were written.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(
        collection: Collection,
        docs: &[Document],
        candidate: &Document,
        skip: Option<Uuid>,
    ) -> Result<(), StoreError> {
        for fields in collection.schema().unique {
            let Some(key) = unique_key(candidate, fields) else {
                continue;
            };
            let clash = docs.iter().any(|existing| {
                let same_doc = skip.is_some() && document_id(existing).ok() == skip;
                !same_doc && unique_key(existing, fields).as_ref() == Some(&key)
            });
            if clash {
                return Err(StoreError::Duplicate);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        filter.sort(&mut docs);
        Ok(filter.paginate(docs))
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d).ok() == Some(id)))
            .cloned())
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        document_id(&doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        Self::check_unique(collection, docs, &doc, None)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn replace(&self, collection: Collection, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        Self::check_unique(collection, docs, &doc, Some(id))?;
        let slot = docs
            .iter_mut()
            .find(|d| document_id(d).ok() == Some(id))
            .ok_or(StoreError::NotFound { collection: collection.label(), id })?;
        *slot = doc.clone();
        Ok(doc)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| document_id(d).ok() != Some(id));
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
