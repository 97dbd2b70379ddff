pub mod auth_service;
pub mod match_service;
pub mod user_service;

pub use match_service::*;
pub use user_service::*;
