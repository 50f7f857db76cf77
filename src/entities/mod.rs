pub mod prelude;

pub mod doctor_profiles;
pub mod organizations;
pub mod users;
