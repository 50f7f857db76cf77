pub mod organization;
pub mod profile;
pub mod user;
