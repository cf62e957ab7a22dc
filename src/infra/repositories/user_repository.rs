//! User repository.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::User;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List all users ordered by ID
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        queries::find_by_id(&self.db, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        queries::find_by_username(&self.db, username).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        queries::list(&self.db).await
    }
}

pub(crate) mod queries {
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    };

    use super::super::conflict_or_db;
    use super::super::entities::user::{self, ActiveModel, Entity as UserEntity};
    use crate::domain::User;
    use crate::errors::{AppError, AppResult};

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    pub async fn find_by_username<C: ConnectionTrait>(
        db: &C,
        username: &str,
    ) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        username: String,
        email: String,
        password_hash: String,
        is_staff: bool,
    ) -> AppResult<User> {
        let active_model = ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            is_staff: Set(is_staff),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(db)
            .await
            .map_err(|e| conflict_or_db(e, "Username"))?;

        Ok(User::from(model))
    }
}
