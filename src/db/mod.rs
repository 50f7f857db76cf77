use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::doctor::DoctorProfile;

pub mod migrator;
pub mod repositories;

pub use crate::entities::organizations::Model as Organization;
pub use crate::entities::users::Model as User;
pub use repositories::organization::NewOrganization;
pub use repositories::user::NewUser;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        // Every pooled connection to an in-memory sqlite db sees its own empty db
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if db_url.starts_with("sqlite:") && !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let opt = connect_options(db_url, in_memory, max_connections, min_connections);
        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn organization_repo(&self) -> repositories::organization::OrganizationRepository {
        repositories::organization::OrganizationRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get(id).await
    }

    // Organizations

    pub async fn get_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        self.organization_repo().get_by_slug(slug).await
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.organization_repo().slug_exists(slug).await
    }

    pub async fn list_organizations_created_by(&self, user_id: &str) -> Result<Vec<Organization>> {
        self.organization_repo().list_created_by(user_id).await
    }

    pub async fn has_completed_onboarding(&self, user_id: &str) -> Result<bool> {
        if self.user_repo().get(user_id).await?.is_none() {
            return Ok(false);
        }
        self.organization_repo().any_created_by(user_id).await
    }

    pub async fn register_organization(&self, org: NewOrganization) -> Result<Organization> {
        self.organization_repo().insert(org).await
    }

    /// Writes the user row (only if absent) and the organization row in one
    /// transaction.
    pub async fn complete_onboarding(
        &self,
        user: NewUser,
        org: NewOrganization,
    ) -> Result<(User, Organization)> {
        repositories::organization::complete_onboarding(&self.conn, user, org).await
    }

    // Doctor profiles

    pub async fn get_profile(&self, organization_id: &str) -> Result<Option<DoctorProfile>> {
        self.profile_repo().get(organization_id).await
    }

    pub async fn upsert_profile(
        &self,
        organization_id: &str,
        profile: &DoctorProfile,
    ) -> Result<()> {
        self.profile_repo().upsert(organization_id, profile).await
    }
}

fn connect_options(
    db_url: &str,
    in_memory: bool,
    max_connections: u32,
    min_connections: u32,
) -> ConnectOptions {
    let mut opt = ConnectOptions::new(db_url.to_string());
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // Closing the only connection would drop the whole in-memory database
    if in_memory {
        opt.max_lifetime(Duration::MAX);
    } else {
        opt.idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600));
    }

    opt
}

/// True when the error chain carries a unique or primary key violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}
