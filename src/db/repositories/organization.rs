use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::user::{NewUser, insert_if_absent};
use crate::entities::{organizations, users};

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_by: String,
}

pub struct OrganizationRepository {
    conn: DatabaseConnection,
}

impl OrganizationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<organizations::Model>> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query organization by slug")
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.conn)
            .await
            .context("Failed to count organizations by slug")?;
        Ok(count > 0)
    }

    pub async fn list_created_by(&self, user_id: &str) -> Result<Vec<organizations::Model>> {
        organizations::Entity::find()
            .filter(organizations::Column::CreatedBy.eq(user_id))
            .order_by_asc(organizations::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list organizations for user")
    }

    pub async fn any_created_by(&self, user_id: &str) -> Result<bool> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::CreatedBy.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count organizations for user")?;
        Ok(count > 0)
    }

    pub async fn insert(&self, org: NewOrganization) -> Result<organizations::Model> {
        insert(&self.conn, org).await
    }
}

async fn insert<C>(conn: &C, org: NewOrganization) -> Result<organizations::Model>
where
    C: ConnectionTrait,
{
    let active = organizations::ActiveModel {
        id: Set(org.id),
        name: Set(org.name),
        slug: Set(org.slug),
        created_by: Set(org.created_by),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    active
        .insert(conn)
        .await
        .context("Failed to insert organization")
}

pub(crate) async fn complete_onboarding(
    conn: &DatabaseConnection,
    user: NewUser,
    org: NewOrganization,
) -> Result<(users::Model, organizations::Model)> {
    let txn = conn.begin().await.context("Failed to begin transaction")?;

    // Dropping an uncommitted transaction rolls it back
    let user = insert_if_absent(&txn, user).await?;
    let org = insert(&txn, org).await?;

    txn.commit().await.context("Failed to commit onboarding")?;

    Ok((user, org))
}
