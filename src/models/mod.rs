pub mod story;
pub mod user;

pub use story::*;
pub use user::*;
