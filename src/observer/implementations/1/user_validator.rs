// Ring 1: user field rules
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::validation::{FieldChecks, EMAIL_PATTERN};
use crate::observer::traits::{InputValidationObserver, Observer, ObserverRing};
use crate::types::Operation;

pub const ROLES: [&str; 3] = ["user", "publisher", "admin"];

#[derive(Default)]
pub struct UserValidator;

impl Observer for UserValidator {
    fn name(&self) -> &'static str {
        "UserValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Users
    }
}

#[async_trait]
impl InputValidationObserver for UserValidator {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut checks = FieldChecks::new(ctx);
        checks.required("name", "Please add a name");
        if checks.required("email", "Please add an email") {
            checks.pattern("email", &EMAIL_PATTERN, "Please add a valid email");
        }
        if checks.required("password", "Please add a password") && ctx.changed("password") {
            checks.min_len("password", 6, "Password must be at least 6 characters");
        }
        checks.one_of("role", &ROLES, "Please select a valid role");
        checks.finish()
    }
}
