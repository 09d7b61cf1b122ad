pub mod auth_service;
pub mod story_service;
