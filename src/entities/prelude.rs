pub use super::doctor_profiles::Entity as DoctorProfiles;
pub use super::organizations::Entity as Organizations;
pub use super::users::Entity as Users;
