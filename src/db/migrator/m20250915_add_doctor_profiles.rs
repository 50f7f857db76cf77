use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DoctorProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DoctorProfiles::OrganizationId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DoctorProfiles::Data).json().not_null())
                    .col(ColumnDef::new(DoctorProfiles::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctor_profiles_organization")
                            .from(DoctorProfiles::Table, DoctorProfiles::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DoctorProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DoctorProfiles {
    Table,
    OrganizationId,
    Data,
    UpdatedAt,
}

#[derive(Iden)]
enum Organizations {
    Table,
    Id,
}
