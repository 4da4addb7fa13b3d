// Ring 6: keep a bootcamp's averageCost in step with its courses
use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::doc_uuid;
use crate::database::schema::Collection;
use crate::database::store::{DocumentStore, StoreError};
use crate::filter::Filter;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, PostDatabaseObserver};
use crate::types::Operation;

#[derive(Default)]
pub struct AverageCost;

/// Mean of a numeric field over every document of `collection` belonging
/// to the bootcamp, `None` when there are none
pub(crate) async fn bootcamp_mean(
    store: &dyn DocumentStore,
    collection: Collection,
    bootcamp_id: Uuid,
    field: &str,
) -> Result<Option<f64>, StoreError> {
    let mut filter = Filter::new(collection.schema());
    filter.where_eq("bootcamp", bootcamp_id.to_string())?;

    let values: Vec<f64> = store
        .find(collection, &filter)
        .await?
        .iter()
        .filter_map(|doc| doc.get(field).and_then(Value::as_f64))
        .collect();

    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Write one aggregate field onto the bootcamp document
pub(crate) async fn store_on_bootcamp(
    store: &dyn DocumentStore,
    bootcamp_id: Uuid,
    field: &str,
    value: Value,
) -> Result<(), ObserverError> {
    let Some(mut bootcamp) = store.find_by_id(Collection::Bootcamps, bootcamp_id).await? else {
        // Bootcamp already gone, nothing to keep in step
        return Ok(());
    };
    bootcamp.insert(field.to_string(), value);
    store.replace(Collection::Bootcamps, bootcamp).await?;
    Ok(())
}

/// Average tuition rounded up to the next multiple of ten
pub fn round_cost(mean: f64) -> f64 {
    (mean / 10.0).ceil() * 10.0
}

impl Observer for AverageCost {
    fn name(&self) -> &'static str {
        "AverageCost"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::PostDatabase
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Courses
    }
}

#[async_trait]
impl PostDatabaseObserver for AverageCost {
    async fn execute(&self, ctx: &ObserverContext) -> Result<(), ObserverError> {
        let Some(bootcamp_id) = doc_uuid(&ctx.record, "bootcamp") else {
            return Ok(());
        };
        let store = ctx.services.store.as_ref();

        let average = bootcamp_mean(store, Collection::Courses, bootcamp_id, "tuition")
            .await?
            .map(round_cost);
        tracing::debug!("Bootcamp {} averageCost now {:?}", bootcamp_id, average);

        store_on_bootcamp(store, bootcamp_id, "averageCost", json!(average)).await
    }
}
