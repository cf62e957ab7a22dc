//! User service - Accounts and their profiles.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{ProfileChanges, ProfileResponse, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Profile of a user, joined with the user
    async fn get_profile(&self, user_id: i32) -> AppResult<ProfileResponse>;

    /// Change a user's profile.
    ///
    /// Staff may change any profile, everybody else only their own.
    async fn update_profile(
        &self,
        actor_id: i32,
        actor_role: UserRole,
        user_id: i32,
        changes: ProfileChanges,
    ) -> AppResult<ProfileResponse>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn get_profile(&self, user_id: i32) -> AppResult<ProfileResponse> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;
        let profile = self
            .uow
            .profiles()
            .find_by_user_id(user_id)
            .await?
            .ok_or_not_found()?;

        Ok(ProfileResponse::new(profile, UserResponse::from(user)))
    }

    async fn update_profile(
        &self,
        actor_id: i32,
        actor_role: UserRole,
        user_id: i32,
        changes: ProfileChanges,
    ) -> AppResult<ProfileResponse> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;

        if !actor_role.is_staff() && actor_id != user.id {
            tracing::warn!(actor_id, user_id, "Profile update refused");
            return Err(AppError::Forbidden);
        }

        let profile = self.uow.profiles().update(user_id, changes).await?;
        Ok(ProfileResponse::new(profile, UserResponse::from(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;
    use crate::infra::{MockProfileRepository, MockUserRepository};
    use crate::services::testing::TestUnitOfWork;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn user(id: i32) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: String::new(),
            password_hash: "hashed".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    fn profile(user_id: i32, bio: &str) -> Profile {
        Profile {
            id: user_id + 100,
            user_id,
            bio: bio.into(),
            avatar: None,
        }
    }

    fn service(users: MockUserRepository, profiles: MockProfileRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(Arc::new(TestUnitOfWork {
            users: Arc::new(users),
            profiles: Arc::new(profiles),
            ..Default::default()
        }))
    }

    fn changes(bio: &str) -> ProfileChanges {
        ProfileChanges {
            bio: Some(bio.into()),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_get_profile_joins_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(user(id))));
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_user_id()
            .returning(|id| Ok(Some(profile(id, "hello"))));

        let result = service(users, profiles).get_profile(3).await.unwrap();
        assert_eq!(result.bio, "hello");
        assert_eq!(result.user.username, "user3");
    }

    #[tokio::test]
    async fn test_get_profile_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let result = service(users, MockProfileRepository::new()).get_profile(3).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_owner_can_update_own_profile() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_update()
            .times(1)
            .returning(|id, changes| Ok(profile(id, changes.bio.as_deref().unwrap_or(""))));

        let result = service(users, profiles)
            .update_profile(3, UserRole::User, 3, changes("mine"))
            .await
            .unwrap();
        assert_eq!(result.bio, "mine");
    }

    #[tokio::test]
    async fn test_other_user_cannot_update_profile() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut profiles = MockProfileRepository::new();
        profiles.expect_update().never();

        let result = service(users, profiles)
            .update_profile(4, UserRole::User, 3, changes("not mine"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_staff_can_update_any_profile() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_update()
            .times(1)
            .returning(|id, _| Ok(profile(id, "moderated")));

        let result = service(users, profiles)
            .update_profile(1, UserRole::Staff, 3, changes("moderated"))
            .await;
        assert!(result.is_ok());
    }
}
