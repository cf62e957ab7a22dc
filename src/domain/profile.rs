//! User profile, created alongside every account.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub bio: String,
    pub avatar: Option<String>,
}

/// Profile together with its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    pub bio: String,
    #[schema(example = "avatars/7/me.png")]
    pub avatar: Option<String>,
    pub user: UserResponse,
}

impl ProfileResponse {
    pub fn new(profile: Profile, user: UserResponse) -> Self {
        Self {
            id: profile.id,
            bio: profile.bio,
            avatar: profile.avatar,
            user,
        }
    }
}

/// Fields a user can change on a profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.avatar.is_none()
    }
}
