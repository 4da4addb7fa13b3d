// Ring 4: store an argon2 hash in place of a new plaintext password
use async_trait::async_trait;

use crate::auth::password::hash_password_blocking;
use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{EnrichmentObserver, Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct PasswordHash;

impl Observer for PasswordHash {
    fn name(&self) -> &'static str {
        "PasswordHash"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Users
    }
}

#[async_trait]
impl EnrichmentObserver for PasswordHash {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if !ctx.changed("password") {
            return Ok(());
        }
        let Some(plain) = ctx.get_str("password").map(str::to_string) else {
            return Ok(());
        };

        let hash = hash_password_blocking(plain)
            .await
            .map_err(|e| ObserverError::ServiceError(e.to_string()))?;
        ctx.set("password", hash);
        Ok(())
    }
}
