// Observer implementations organized by rings
// Each ring handles a specific phase of a write

pub mod validation;

// Ring 1: Input Validation - required fields, formats, enums
#[path = "1/bootcamp_validator.rs"]
pub mod bootcamp_validator;
#[path = "1/course_validator.rs"]
pub mod course_validator;
#[path = "1/review_validator.rs"]
pub mod review_validator;
#[path = "1/user_validator.rs"]
pub mod user_validator;

// Ring 3: Business Logic - cascades
#[path = "3/cascade_delete.rs"]
pub mod cascade_delete;

// Ring 4: Enrichment - derived and protected fields
#[path = "4/bootcamp_geocode.rs"]
pub mod bootcamp_geocode;
#[path = "4/bootcamp_slug.rs"]
pub mod bootcamp_slug;
#[path = "4/password_hash.rs"]
pub mod password_hash;

// Ring 6: Post-Database - bootcamp aggregates
#[path = "6/average_cost.rs"]
pub mod average_cost;
#[path = "6/average_rating.rs"]
pub mod average_rating;

pub use average_cost::AverageCost;
pub use average_rating::AverageRating;
pub use bootcamp_geocode::BootcampGeocode;
pub use bootcamp_slug::BootcampSlug;
pub use bootcamp_validator::BootcampValidator;
pub use cascade_delete::BootcampCascadeDelete;
pub use course_validator::CourseValidator;
pub use password_hash::PasswordHash;
pub use review_validator::ReviewValidator;
pub use user_validator::UserValidator;

use crate::observer::pipeline::ObserverPipeline;
use crate::observer::traits::ObserverBox;

/// Register every built-in observer with the pipeline
pub fn register_default_observers(pipeline: &mut ObserverPipeline) {
    pipeline.register_observer(ObserverBox::InputValidation(Box::new(UserValidator)));
    pipeline.register_observer(ObserverBox::InputValidation(Box::new(BootcampValidator)));
    pipeline.register_observer(ObserverBox::InputValidation(Box::new(CourseValidator)));
    pipeline.register_observer(ObserverBox::InputValidation(Box::new(ReviewValidator)));

    pipeline.register_observer(ObserverBox::Business(Box::new(BootcampCascadeDelete)));

    pipeline.register_observer(ObserverBox::Enrichment(Box::new(PasswordHash)));
    pipeline.register_observer(ObserverBox::Enrichment(Box::new(BootcampSlug)));
    pipeline.register_observer(ObserverBox::Enrichment(Box::new(BootcampGeocode)));

    pipeline.register_observer(ObserverBox::PostDatabase(Box::new(AverageCost)));
    pipeline.register_observer(ObserverBox::PostDatabase(Box::new(AverageRating)));

    tracing::info!("Registered {} observers", pipeline.observer_count());
}
