use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Identity provider organization id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    /// User id of the creator. Not a foreign key: the user row may be
    /// written after the organization is registered.
    pub created_by: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::doctor_profiles::Entity")]
    DoctorProfile,
}

impl Related<super::doctor_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DoctorProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
