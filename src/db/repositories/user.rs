use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::users;

/// Fields the caller supplies for a new user row. The timestamp is set here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub username: String,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }
}

/// Inserts the user unless a row with the same id already exists, then
/// returns whatever row is stored. Existing rows are never rewritten.
pub(crate) async fn insert_if_absent<C>(conn: &C, user: NewUser) -> Result<users::Model>
where
    C: ConnectionTrait,
{
    let id = user.id.clone();
    let active = users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email),
        full_name: Set(user.full_name),
        username: Set(user.username),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    users::Entity::insert(active)
        .on_conflict(OnConflict::column(users::Column::Id).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await
        .context("Failed to insert user")?;

    users::Entity::find_by_id(id.clone())
        .one(conn)
        .await
        .context("Failed to read back user")?
        .ok_or_else(|| anyhow::anyhow!("User {id} missing after insert"))
}
