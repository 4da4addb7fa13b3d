// Ring 1: review field rules
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::validation::FieldChecks;
use crate::observer::traits::{InputValidationObserver, Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct ReviewValidator;

impl Observer for ReviewValidator {
    fn name(&self) -> &'static str {
        "ReviewValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Reviews
    }
}

#[async_trait]
impl InputValidationObserver for ReviewValidator {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut checks = FieldChecks::new(ctx);
        if checks.required("title", "Please add a title for the review") {
            checks.max_len("title", 100, "Title can not be more than 100 characters");
        }
        checks.required("text", "Please add some text");
        if checks.required("rating", "Please add a rating between 1 and 10") {
            checks.range("rating", 1.0, 10.0, "Please add a rating between 1 and 10");
        }
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::observer_context;
    use serde_json::json;

    #[tokio::test]
    async fn rating_must_be_in_range() {
        let mut ctx = observer_context(
            Collection::Reviews,
            json!({ "title": "Learned a ton!", "text": "Great", "rating": 11 }),
        );
        assert!(matches!(
            ReviewValidator.execute(&mut ctx).await,
            Err(ObserverError::ValidationError(_))
        ));

        let mut ctx = observer_context(
            Collection::Reviews,
            json!({ "title": "Learned a ton!", "text": "Great", "rating": 8 }),
        );
        assert!(ReviewValidator.execute(&mut ctx).await.is_ok());
    }
}
