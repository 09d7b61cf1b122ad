pub mod auth;
pub mod method_override;

pub use auth::{AuthGuard, GuestGuard};
pub use method_override::MethodOverride;
