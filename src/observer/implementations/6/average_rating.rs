// Ring 6: keep a bootcamp's averageRating in step with its reviews
use async_trait::async_trait;
use serde_json::json;

use crate::database::models::doc_uuid;
use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, PostDatabaseObserver};
use crate::types::Operation;

use super::average_cost::{bootcamp_mean, store_on_bootcamp};

#[derive(Default)]
pub struct AverageRating;

impl Observer for AverageRating {
    fn name(&self) -> &'static str {
        "AverageRating"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::PostDatabase
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Reviews
    }
}

#[async_trait]
impl PostDatabaseObserver for AverageRating {
    async fn execute(&self, ctx: &ObserverContext) -> Result<(), ObserverError> {
        let Some(bootcamp_id) = doc_uuid(&ctx.record, "bootcamp") else {
            return Ok(());
        };
        let store = ctx.services.store.as_ref();

        let average = bootcamp_mean(store, Collection::Reviews, bootcamp_id, "rating").await?;
        store_on_bootcamp(store, bootcamp_id, "averageRating", json!(average)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_services, seed};
    use uuid::Uuid;

    #[tokio::test]
    async fn averages_review_ratings() {
        let services = memory_services();
        let bootcamp = seed(&services, Collection::Bootcamps, json!({ "name": "Devworks" })).await;
        let bootcamp_id = bootcamp["id"].as_str().unwrap().to_string();
        let review = seed(&services, Collection::Reviews, json!({ "rating": 8, "bootcamp": bootcamp_id })).await;
        seed(&services, Collection::Reviews, json!({ "rating": 5, "bootcamp": bootcamp_id })).await;

        let ctx = ObserverContext::new(Operation::Create, Collection::Reviews, review, None, services.clone());
        AverageRating.execute(&ctx).await.unwrap();

        let id = Uuid::parse_str(&bootcamp_id).unwrap();
        let stored = services.store.find_by_id(Collection::Bootcamps, id).await.unwrap().unwrap();
        assert_eq!(stored["averageRating"], 6.5);
    }
}
