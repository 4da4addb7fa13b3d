// handlers/mod.rs - request handlers grouped by resource
//
// Public reads need no session. Writes go through `protect` and a role
// check configured in routes.rs before they reach these handlers.

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod health;
pub mod reviews;
pub mod users;
pub mod utils;
