use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::doctor_profiles;
use crate::models::doctor::DoctorProfile;

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, organization_id: &str) -> Result<Option<DoctorProfile>> {
        let row = doctor_profiles::Entity::find_by_id(organization_id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query doctor profile")?;

        row.map(|r| {
            serde_json::from_value(r.data)
                .with_context(|| format!("Corrupt doctor profile for {organization_id}"))
        })
        .transpose()
    }

    pub async fn upsert(&self, organization_id: &str, profile: &DoctorProfile) -> Result<()> {
        let data = serde_json::to_value(profile).context("Failed to serialize doctor profile")?;

        let active = doctor_profiles::ActiveModel {
            organization_id: Set(organization_id.to_string()),
            data: Set(data),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        doctor_profiles::Entity::insert(active)
            .on_conflict(
                OnConflict::column(doctor_profiles::Column::OrganizationId)
                    .update_columns([
                        doctor_profiles::Column::Data,
                        doctor_profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to save doctor profile")?;

        Ok(())
    }
}
