// Ring 1: bootcamp field rules
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::validation::{FieldChecks, EMAIL_PATTERN, URL_PATTERN};
use crate::observer::traits::{InputValidationObserver, Observer, ObserverRing};
use crate::types::Operation;

pub const CAREERS: [&str; 6] = [
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

#[derive(Default)]
pub struct BootcampValidator;

impl Observer for BootcampValidator {
    fn name(&self) -> &'static str {
        "BootcampValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Bootcamps
    }
}

#[async_trait]
impl InputValidationObserver for BootcampValidator {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut checks = FieldChecks::new(ctx);
        if checks.required("name", "Please add a name") {
            checks.max_len("name", 50, "Name can not be more than 50 characters");
        }
        if checks.required("description", "Please add a description") {
            checks.max_len("description", 500, "Description can not be more than 500 characters");
        }
        checks.pattern("website", &URL_PATTERN, "Please use a valid URL with HTTP or HTTPS");
        checks.max_len("phone", 20, "Phone number can not be longer than 20 characters");
        checks.pattern("email", &EMAIL_PATTERN, "Please add a valid email");
        if ctx.operation == Operation::Create {
            checks.required("address", "Please add an address");
        }
        if checks.required("careers", "Please add at least one career") {
            checks.each_one_of("careers", &CAREERS, "Please select valid careers");
        }
        checks.range("averageRating", 1.0, 10.0, "Average rating must be between 1 and 10");
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::observer_context;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "name": "Devworks Bootcamp",
            "description": "Devworks is a full stack JavaScript Bootcamp",
            "website": "https://devworks.com",
            "phone": "(111) 111-1111",
            "email": "enroll@devworks.com",
            "address": "233 Bay State Rd Boston MA 02215",
            "careers": ["Web Development", "UI/UX", "Business"]
        })
    }

    #[tokio::test]
    async fn accepts_valid_bootcamp() {
        let mut ctx = observer_context(Collection::Bootcamps, valid());
        assert!(BootcampValidator.execute(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_long_name_and_unknown_career() {
        let mut doc = valid();
        doc["name"] = json!("x".repeat(51));
        doc["careers"] = json!(["Basket Weaving"]);
        let mut ctx = observer_context(Collection::Bootcamps, doc);
        match BootcampValidator.execute(&mut ctx).await {
            Err(ObserverError::ValidationError(messages)) => assert_eq!(
                messages,
                vec!["Name can not be more than 50 characters", "Please select valid careers"]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn address_required_on_create() {
        let mut doc = valid();
        doc.as_object_mut().unwrap().remove("address");
        let mut ctx = observer_context(Collection::Bootcamps, doc);
        assert!(BootcampValidator.execute(&mut ctx).await.is_err());
    }
}
