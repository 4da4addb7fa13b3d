// Ring 3: removing a bootcamp removes its courses and reviews
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::database::store::StoreError;
use crate::filter::Filter;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{BusinessObserver, Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct BootcampCascadeDelete;

impl Observer for BootcampCascadeDelete {
    fn name(&self) -> &'static str {
        "BootcampCascadeDelete"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op == Operation::Delete
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Bootcamps
    }
}

#[async_trait]
impl BusinessObserver for BootcampCascadeDelete {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let Some(bootcamp_id) = ctx.record_id() else {
            return Ok(());
        };

        for child in [Collection::Courses, Collection::Reviews] {
            let mut filter = Filter::new(child.schema());
            filter
                .where_eq("bootcamp", bootcamp_id.to_string())
                .map_err(StoreError::from)?;
            let removed = ctx.services.store.delete_many(child, &filter).await?;
            tracing::info!("Removed {} {} of bootcamp {}", removed, child, bootcamp_id);
        }
        Ok(())
    }
}
