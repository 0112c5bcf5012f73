use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// A user record as stored in the `user` table.
///
/// `password` holds the argon2 PHC string and must never reach a client;
/// every outgoing shape goes through [`UserResponse`] or [`UserSummary`],
/// neither of which carries the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Thing,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub liked_posts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content for a new `user` record. The record id is assigned separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub liked_posts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(username: String, email: String, password: String, full_name: String) -> Self {
        let now = Utc::now();
        Self {
            username,
            email,
            password,
            full_name,
            bio: None,
            link: None,
            profile_img: None,
            cover_img: None,
            followers: Vec::new(),
            following: Vec::new(),
            liked_posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Partial profile update. Absent or empty fields are left untouched;
/// password rotation requires both password fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub liked_posts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The identity slice embedded in posts, comments and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub profile_img: Option<String>,
}

impl User {
    /// Raw record id without the table prefix.
    pub fn raw_id(&self) -> String {
        self.id.id.to_raw()
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.raw_id(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            link: self.link.clone(),
            profile_img: self.profile_img.clone(),
            cover_img: self.cover_img.clone(),
            followers: self.followers.clone(),
            following: self.following.clone(),
            liked_posts: self.liked_posts.clone(),
            created_at: self.created_at,
        }
    }

    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self.raw_id(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            profile_img: self.profile_img.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Thing::from(("user", "abc123")),
            username: "ann".to_string(),
            email: "a@b.com".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            full_name: "Ann Example".to_string(),
            bio: None,
            link: None,
            profile_img: Some("https://cdn.test/img/ann.png".to_string()),
            cover_img: None,
            followers: vec![],
            following: vec![],
            liked_posts: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn raw_id_strips_table_prefix() {
        assert_eq!(sample_user().raw_id(), "abc123");
    }

    #[test]
    fn response_never_contains_password() {
        let response = serde_json::to_value(sample_user().to_response()).unwrap();
        assert!(response.get("password").is_none());
        assert_eq!(response["username"], "ann");

        let summary = serde_json::to_value(sample_user().to_summary()).unwrap();
        assert!(summary.get("password").is_none());
        assert_eq!(summary["id"], "abc123");
    }
}
