use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{doc_uuid, stamp_new};
use crate::database::schema::Collection;
use crate::database::store::{document_id, Document, DocumentStore, StoreError};
use crate::filter::{Filter, FilterOp};
use crate::observer::{ObserverContext, ObserverError, ObserverPipeline, ObserverServices};
use crate::services::geocoder::Geocoder;
use crate::types::Operation;

/// Related documents joined into a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Populate {
    /// Embed each bootcamp's courses as `courses`
    Courses,
    /// Replace a `bootcamp` reference with `{id, name, description}`
    Bootcamp,
}

/// Reads go straight to the store. Writes run the observer pipeline: rings
/// 1 to 4, the store write, then ring 6.
#[derive(Clone)]
pub struct Repository {
    services: ObserverServices,
    pipeline: Arc<ObserverPipeline>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_pipeline(store, geocoder, ObserverPipeline::with_defaults())
    }

    pub fn with_pipeline(
        store: Arc<dyn DocumentStore>,
        geocoder: Arc<dyn Geocoder>,
        pipeline: ObserverPipeline,
    ) -> Self {
        Self {
            services: ObserverServices { store, geocoder },
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.services.store.as_ref()
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.services.geocoder.as_ref()
    }

    /// Parse a path identifier; malformed ids are a client error
    pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    pub async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        self.store().find(collection, filter).await
    }

    pub async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        self.store().count(collection, filter).await
    }

    /// First match of `filter`, in its order
    pub async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut filter = filter.clone();
        filter.limit(1, None);
        Ok(self.store().find(collection, &filter).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        self.store().find_by_id(collection, id).await
    }

    /// Insert a new document through the pipeline
    pub async fn create(&self, collection: Collection, doc: Document) -> Result<Document, ObserverError> {
        let doc = if doc.contains_key("id") { doc } else { stamp_new(doc) };
        let mut ctx = ObserverContext::new(Operation::Create, collection, doc, None, self.services.clone());

        self.pipeline.run_before_write(&mut ctx).await?;
        let stored = self.store().insert(collection, ctx.record.clone()).await?;
        tracing::debug!("Created {} {}", collection.label(), document_id(&stored)?);

        ctx.record = stored;
        self.pipeline.run_after_write(&mut ctx).await;
        Ok(ctx.record)
    }

    /// Merge `changes` onto the stored document and write it back through
    /// the pipeline. A `null` change removes the field.
    pub async fn update(&self, collection: Collection, id: Uuid, changes: Document) -> Result<Document, ObserverError> {
        self.update_with(collection, id, changes, false).await
    }

    /// Like `update` but skips input validation, for internal bookkeeping
    /// such as reset-token fields
    pub async fn update_unchecked(
        &self,
        collection: Collection,
        id: Uuid,
        changes: Document,
    ) -> Result<Document, ObserverError> {
        self.update_with(collection, id, changes, true).await
    }

    async fn update_with(
        &self,
        collection: Collection,
        id: Uuid,
        changes: Document,
        skip_validation: bool,
    ) -> Result<Document, ObserverError> {
        let original = self.require(collection, id).await?;

        let mut merged = original.clone();
        for (field, value) in changes {
            if field == "id" || field == "createdAt" {
                continue;
            }
            if value.is_null() {
                merged.remove(&field);
            } else {
                merged.insert(field, value);
            }
        }

        let mut ctx = ObserverContext::new(Operation::Update, collection, merged, Some(original), self.services.clone());
        ctx.skip_validation = skip_validation;

        self.pipeline.run_before_write(&mut ctx).await?;
        let stored = self.store().replace(collection, ctx.record.clone()).await?;
        tracing::debug!("Updated {} {}", collection.label(), id);

        ctx.record = stored;
        self.pipeline.run_after_write(&mut ctx).await;
        Ok(ctx.record)
    }

    /// Remove a document through the pipeline, returning what was stored
    pub async fn delete(&self, collection: Collection, id: Uuid) -> Result<Document, ObserverError> {
        let original = self.require(collection, id).await?;
        let mut ctx = ObserverContext::new(
            Operation::Delete,
            collection,
            original.clone(),
            Some(original),
            self.services.clone(),
        );

        self.pipeline.run_before_write(&mut ctx).await?;
        if !self.store().delete(collection, id).await? {
            return Err(StoreError::NotFound { collection: collection.label(), id }.into());
        }
        tracing::debug!("Deleted {} {}", collection.label(), id);

        self.pipeline.run_after_write(&mut ctx).await;
        Ok(ctx.record)
    }

    async fn require(&self, collection: Collection, id: Uuid) -> Result<Document, StoreError> {
        self.store()
            .find_by_id(collection, id)
            .await?
            .ok_or(StoreError::NotFound { collection: collection.label(), id })
    }

    /// Join related documents into `docs` in place
    pub async fn populate(&self, populate: Populate, docs: &mut [Document]) -> Result<(), StoreError> {
        match populate {
            Populate::Courses => self.populate_courses(docs).await,
            Populate::Bootcamp => self.populate_bootcamp(docs).await,
        }
    }

    async fn populate_courses(&self, bootcamps: &mut [Document]) -> Result<(), StoreError> {
        let ids: Vec<Value> = bootcamps
            .iter()
            .filter_map(|doc| doc.get("id").cloned())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let mut filter = Filter::new(Collection::Courses.schema());
        filter.condition("bootcamp", FilterOp::In, Value::Array(ids))?;
        filter.order("createdAt")?;

        let mut by_bootcamp: HashMap<String, Vec<Value>> = HashMap::new();
        for course in self.find(Collection::Courses, &filter).await? {
            if let Some(bootcamp) = course.get("bootcamp").and_then(Value::as_str) {
                by_bootcamp
                    .entry(bootcamp.to_string())
                    .or_default()
                    .push(Value::Object(course));
            }
        }

        for bootcamp in bootcamps.iter_mut() {
            let courses = bootcamp
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| by_bootcamp.remove(id))
                .unwrap_or_default();
            bootcamp.insert("courses".to_string(), Value::Array(courses));
        }
        Ok(())
    }

    async fn populate_bootcamp(&self, docs: &mut [Document]) -> Result<(), StoreError> {
        let ids: BTreeSet<Uuid> = docs.iter().filter_map(|doc| doc_uuid(doc, "bootcamp")).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let mut filter = Filter::new(Collection::Bootcamps.schema());
        filter.condition(
            "id",
            FilterOp::In,
            Value::Array(ids.iter().map(|id| Value::String(id.to_string())).collect()),
        )?;

        let summaries: HashMap<String, Value> = self
            .find(Collection::Bootcamps, &filter)
            .await?
            .into_iter()
            .filter_map(|bootcamp| {
                let id = bootcamp.get("id")?.as_str()?.to_string();
                let summary = json!({
                    "id": id,
                    "name": bootcamp.get("name"),
                    "description": bootcamp.get("description"),
                });
                Some((id, summary))
            })
            .collect();

        for doc in docs.iter_mut() {
            let summary = doc
                .get("bootcamp")
                .and_then(Value::as_str)
                .and_then(|id| summaries.get(id))
                .cloned();
            if let Some(summary) = summary {
                doc.insert("bootcamp".to_string(), summary);
            }
        }
        Ok(())
    }
}

/// Drop the fields of `collection` that never leave the service
pub fn public_view(collection: Collection, mut doc: Document) -> Document {
    for field in collection.schema().hidden {
        doc.remove(*field);
    }
    doc
}

/// Keep only the selected top-level fields; `id` is always kept
pub fn project(doc: Document, fields: &[String]) -> Document {
    if fields.is_empty() {
        return doc;
    }
    let roots: BTreeSet<&str> = fields
        .iter()
        .map(|f| f.split('.').next().unwrap_or(f.as_str()))
        .chain(std::iter::once("id"))
        .collect();
    doc.into_iter().filter(|(k, _)| roots.contains(k.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_repository, seed_with};

    fn object(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn public_view_strips_hidden_fields() {
        let user = object(json!({
            "id": "1", "name": "John", "password": "$argon2id$x",
            "resetPasswordToken": "abc", "resetPasswordExpire": "2024-01-01T00:00:00.000Z"
        }));
        let view = public_view(Collection::Users, user);
        assert_eq!(view.len(), 2);
        assert!(view.get("password").is_none());
    }

    #[test]
    fn project_keeps_id_and_roots() {
        let doc = object(json!({ "id": "1", "name": "A", "description": "d", "location": { "city": "Boston" } }));
        let view = project(doc, &["name".to_string(), "location.city".to_string()]);
        let mut keys: Vec<&str> = view.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["id", "location", "name"]);
    }

    #[test]
    fn malformed_id_is_invalid() {
        assert!(matches!(Repository::parse_id("5d713995b721c3bb38c1f5d0"), Err(StoreError::InvalidId(_))));
    }

    #[tokio::test]
    async fn create_runs_validation_and_enrichment() {
        let repo = memory_repository();
        let err = repo
            .create(Collection::Users, object(json!({ "name": "John" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ObserverError::ValidationError(_)));

        let user = repo
            .create(
                Collection::Users,
                object(json!({ "name": "John", "email": "john@gmail.com", "password": "123456", "role": "user" })),
            )
            .await
            .unwrap();
        assert_ne!(user["password"], "123456");
        assert!(user.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn update_merges_and_null_removes() {
        let repo = memory_repository();
        let user = repo
            .create(
                Collection::Users,
                object(json!({
                    "name": "John", "email": "john@gmail.com", "password": "123456",
                    "role": "user", "resetPasswordToken": "abc"
                })),
            )
            .await
            .unwrap();
        let id = document_id(&user).unwrap();

        let updated = repo
            .update_unchecked(
                Collection::Users,
                id,
                object(json!({ "name": "Johnny", "resetPasswordToken": null })),
            )
            .await
            .unwrap();
        assert_eq!(updated["name"], "Johnny");
        assert_eq!(updated["email"], "john@gmail.com");
        assert!(updated.get("resetPasswordToken").is_none());
        assert_eq!(updated["password"], user["password"]);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = memory_repository();
        let err = repo.delete(Collection::Courses, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ObserverError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn populates_both_directions() {
        let repo = memory_repository();
        let bootcamp = seed_with(repo.store(), Collection::Bootcamps, json!({ "name": "Devworks", "description": "d" })).await;
        let bootcamp_id = bootcamp["id"].clone();
        seed_with(repo.store(), Collection::Courses, json!({ "title": "Front End", "bootcamp": bootcamp_id })).await;

        let mut bootcamps = vec![bootcamp.clone()];
        repo.populate(Populate::Courses, &mut bootcamps).await.unwrap();
        assert_eq!(bootcamps[0]["courses"][0]["title"], "Front End");

        let mut courses = repo
            .find(Collection::Courses, &Filter::new(Collection::Courses.schema()))
            .await
            .unwrap();
        repo.populate(Populate::Bootcamp, &mut courses).await.unwrap();
        assert_eq!(courses[0]["bootcamp"]["name"], "Devworks");
        assert_eq!(courses[0]["bootcamp"]["id"], bootcamp_id);
    }
}
