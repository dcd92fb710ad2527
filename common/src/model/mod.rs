pub mod admin;
pub mod guide;
pub mod membership;
