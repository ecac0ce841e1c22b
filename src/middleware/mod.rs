pub mod auth;
pub mod response;

pub use auth::require_access;
pub use response::{ApiResponse, ApiResult};
