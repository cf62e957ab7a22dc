//! Profile repository. Every user has exactly one profile row.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{Profile, ProfileChanges};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find the profile owned by a user
    async fn find_by_user_id(&self, user_id: i32) -> AppResult<Option<Profile>>;

    /// Apply changes to a user's profile
    async fn update(&self, user_id: i32, changes: ProfileChanges) -> AppResult<Profile>;
}

pub struct ProfileStore {
    db: DatabaseConnection,
}

impl ProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find_by_user_id(&self, user_id: i32) -> AppResult<Option<Profile>> {
        queries::find_by_user_id(&self.db, user_id).await
    }

    async fn update(&self, user_id: i32, changes: ProfileChanges) -> AppResult<Profile> {
        queries::update(&self.db, user_id, changes).await
    }
}

pub(crate) mod queries {
    use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

    use super::super::entities::profile::{self, ActiveModel, Entity as ProfileEntity};
    use crate::domain::{Profile, ProfileChanges};
    use crate::errors::{AppError, AppResult};

    pub async fn find_by_user_id<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> AppResult<Option<Profile>> {
        let result = ProfileEntity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Profile::from))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<Profile> {
        let active_model = ActiveModel {
            user_id: Set(user_id),
            bio: Set(String::new()),
            avatar: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(db).await.map_err(AppError::from)?;
        Ok(Profile::from(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        changes: ProfileChanges,
    ) -> AppResult<Profile> {
        let profile = ProfileEntity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(AppError::NotFound)?;

        if changes.is_empty() {
            return Ok(Profile::from(profile));
        }

        let mut active: ActiveModel = profile.into();

        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some(avatar) = changes.avatar {
            active.avatar = Set(avatar);
        }

        let model = active.update(db).await.map_err(AppError::from)?;
        Ok(Profile::from(model))
    }
}
