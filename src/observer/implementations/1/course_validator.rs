// Ring 1: course field rules
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::validation::FieldChecks;
use crate::observer::traits::{InputValidationObserver, Observer, ObserverRing};
use crate::types::Operation;

pub const SKILLS: [&str; 3] = ["beginner", "intermediate", "advanced"];

#[derive(Default)]
pub struct CourseValidator;

impl Observer for CourseValidator {
    fn name(&self) -> &'static str {
        "CourseValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Courses
    }
}

#[async_trait]
impl InputValidationObserver for CourseValidator {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let mut checks = FieldChecks::new(ctx);
        checks.required("title", "Please add a course title");
        checks.required("description", "Please add a course description");
        checks.required("weeks", "Please add number of weeks");
        if checks.required("tuition", "Please add a tuition cost") {
            checks.range("tuition", 0.0, f64::MAX, "Tuition can not be negative");
        }
        if checks.required("minimumSkill", "Please add a minimum skill") {
            checks.one_of("minimumSkill", &SKILLS, "Minimum skill must be beginner, intermediate or advanced");
        }
        checks.required("bootcamp", "Course must belong to a bootcamp");
        checks.required("user", "Course must have an owner");
        checks.finish()
    }
}
