use std::fmt;

use crate::filter::{CollectionSchema, FieldDef, FieldKind};

use FieldKind::*;

/// The four document collections of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Bootcamps,
    Courses,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Bootcamps,
        Collection::Courses,
        Collection::Reviews,
    ];

    pub fn schema(&self) -> &'static CollectionSchema {
        match self {
            Collection::Users => &USERS,
            Collection::Bootcamps => &BOOTCAMPS,
            Collection::Courses => &COURSES,
            Collection::Reviews => &REVIEWS,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.schema().name
    }

    /// Singular noun used in not-found messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Users => "User",
            Collection::Bootcamps => "Bootcamp",
            Collection::Courses => "Course",
            Collection::Reviews => "Review",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

pub static USERS: CollectionSchema = CollectionSchema {
    name: "users",
    fields: &[
        FieldDef::new("id", Id),
        FieldDef::new("name", Text),
        FieldDef::new("email", Text),
        FieldDef::new("role", Text),
        FieldDef::new("createdAt", Date),
        FieldDef::new("password", Text),
        FieldDef::new("resetPasswordToken", Text),
        FieldDef::new("resetPasswordExpire", Date),
    ],
    unique: &[&["email"]],
    hidden: &["password", "resetPasswordToken", "resetPasswordExpire"],
};

pub static BOOTCAMPS: CollectionSchema = CollectionSchema {
    name: "bootcamps",
    fields: &[
        FieldDef::new("id", Id),
        FieldDef::new("name", Text),
        FieldDef::new("slug", Text),
        FieldDef::new("description", Text),
        FieldDef::new("website", Text),
        FieldDef::new("phone", Text),
        FieldDef::new("email", Text),
        FieldDef::new("location.formattedAddress", Text),
        FieldDef::new("location.street", Text),
        FieldDef::new("location.city", Text),
        FieldDef::new("location.state", Text),
        FieldDef::new("location.zipcode", Text),
        FieldDef::new("location.country", Text),
        FieldDef::new("careers", TextList),
        FieldDef::new("averageRating", Number),
        FieldDef::new("averageCost", Number),
        FieldDef::new("photo", Text),
        FieldDef::new("housing", Bool),
        FieldDef::new("jobAssistance", Bool),
        FieldDef::new("jobGuarantee", Bool),
        FieldDef::new("acceptGi", Bool),
        FieldDef::new("createdAt", Date),
        FieldDef::new("user", Id),
    ],
    unique: &[&["name"]],
    hidden: &[],
};

pub static COURSES: CollectionSchema = CollectionSchema {
    name: "courses",
    fields: &[
        FieldDef::new("id", Id),
        FieldDef::new("title", Text),
        FieldDef::new("description", Text),
        FieldDef::new("weeks", Text),
        FieldDef::new("tuition", Number),
        FieldDef::new("minimumSkill", Text),
        FieldDef::new("scholarshipAvailable", Bool),
        FieldDef::new("createdAt", Date),
        FieldDef::new("bootcamp", Id),
        FieldDef::new("user", Id),
    ],
    unique: &[],
    hidden: &[],
};

pub static REVIEWS: CollectionSchema = CollectionSchema {
    name: "reviews",
    fields: &[
        FieldDef::new("id", Id),
        FieldDef::new("title", Text),
        FieldDef::new("text", Text),
        FieldDef::new("rating", Number),
        FieldDef::new("createdAt", Date),
        FieldDef::new("bootcamp", Id),
        FieldDef::new("user", Id),
    ],
    unique: &[&["bootcamp", "user"]],
    hidden: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_parents_are_selectable() {
        assert!(BOOTCAMPS.is_selectable("location"));
        assert!(BOOTCAMPS.is_selectable("location.city"));
        assert!(!BOOTCAMPS.is_selectable("loc"));
    }

    #[test]
    fn hidden_user_fields_are_not_selectable() {
        assert!(USERS.field("password").is_some());
        assert!(!USERS.is_selectable("password"));
        assert!(USERS.is_selectable("email"));
    }
}
