pub mod advanced_results;
pub mod auth;
pub mod response;

pub use advanced_results::{advanced_results, AdvancedResults, Pagination, ResultsSpec};
pub use auth::{admin_only, authorize, protect, publisher_or_admin, user_or_admin, CurrentUser};
pub use response::{ApiResponse, ApiResult};
