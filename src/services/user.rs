use crate::{
    error::{AppError, Result},
    models::user::*,
    services::{AuthService, Database, StorageService},
    utils::validation::{validate_email_format, validate_password},
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Credential store. Owns user records: registration, authentication and
/// profile updates.
#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    auth: AuthService,
    storage: StorageService,
}

impl UserService {
    pub async fn new(db: Arc<Database>, auth: AuthService, storage: StorageService) -> Result<Self> {
        Ok(Self { db, auth, storage })
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.db.get_by_id("user", user_id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.db.find_one("user", "username", username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db.find_one("user", "email", email).await
    }

    /// Register a new user. Rejects bad email formats, duplicate usernames
    /// or emails and short passwords before hashing and persisting.
    pub async fn register(&self, request: SignupRequest) -> Result<User> {
        let email = request.email.unwrap_or_default().trim().to_string();
        let username = request.username.unwrap_or_default().trim().to_string();
        let password = request.password.unwrap_or_default();
        let full_name = request.full_name.unwrap_or_default().trim().to_string();

        validate_email_format(&email)?;

        if self.find_by_username(&username).await?.is_some() {
            return Err(AppError::validation("Username already exists"));
        }
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::validation("Email already exists"));
        }

        validate_password(&password)?;

        if full_name.is_empty() {
            return Err(AppError::validation("Please provide a full name"));
        }

        let password_hash = self.auth.hash_password(&password)?;
        let id = Uuid::new_v4().to_string();
        let user: User = self
            .db
            .create_with_id(
                "user",
                &id,
                NewUser::new(username, email, password_hash, full_name),
            )
            .await?;

        info!("Registered new user {} ({})", user.username, user.raw_id());
        Ok(user)
    }

    /// Authenticate by username and password. Unknown usernames and wrong
    /// passwords produce the same error so neither leaks which one failed.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User> {
        let username = request.username.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(AppError::bad_request("Please provide username and password"));
        }

        let Some(user) = self.find_by_username(&username).await? else {
            return Err(AppError::validation("Invalid username or password"));
        };

        if !self.auth.verify_password(&password, &user.password)? {
            return Err(AppError::validation("Invalid username or password"));
        }

        debug!("Authenticated user {}", user.raw_id());
        Ok(user)
    }

    pub async fn get_profile(&self, username: &str) -> Result<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Up to four users the requester does not already follow, drawn from a
    /// random sample that excludes the requester.
    pub async fn suggested_users(&self, user_id: &str) -> Result<Vec<User>> {
        let me = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM user WHERE meta::id(id) != $me ORDER BY rand() LIMIT 10",
                json!({ "me": user_id }),
            )
            .await?;
        let candidates: Vec<User> = response.take(0)?;

        Ok(filter_suggestions(candidates, &me.following))
    }

    /// Apply a partial profile update: optional password rotation, optional
    /// image replacement (old image destroyed first), and field overwrites
    /// for the provided non-empty values.
    pub async fn update_user(&self, user_id: &str, request: UpdateUserRequest) -> Result<User> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let mut updates = Map::new();

        match (
            non_empty(request.current_password.as_deref()),
            non_empty(request.new_password.as_deref()),
        ) {
            (Some(current), Some(new)) => {
                if !self.auth.verify_password(current, &user.password)? {
                    return Err(AppError::validation("Invalid current password"));
                }
                validate_password(new)?;
                updates.insert("password".to_string(), json!(self.auth.hash_password(new)?));
            }
            (None, None) => {}
            _ => {
                return Err(AppError::bad_request(
                    "Please provide both current password and new password",
                ));
            }
        }

        if let Some(payload) = non_empty(request.profile_img.as_deref()) {
            if let Some(old) = &user.profile_img {
                self.storage.destroy(old).await?;
            }
            let url = self.storage.upload(payload).await?;
            updates.insert("profile_img".to_string(), json!(url));
        }

        if let Some(payload) = non_empty(request.cover_img.as_deref()) {
            if let Some(old) = &user.cover_img {
                self.storage.destroy(old).await?;
            }
            let url = self.storage.upload(payload).await?;
            updates.insert("cover_img".to_string(), json!(url));
        }

        if let Some(username) = non_empty(request.username.as_deref()) {
            if username != user.username {
                if self.find_by_username(username).await?.is_some() {
                    return Err(AppError::validation("Username already exists"));
                }
                updates.insert("username".to_string(), json!(username));
            }
        }

        if let Some(email) = non_empty(request.email.as_deref()) {
            if email != user.email {
                validate_email_format(email)?;
                if self.find_by_email(email).await?.is_some() {
                    return Err(AppError::validation("Email already exists"));
                }
                updates.insert("email".to_string(), json!(email));
            }
        }

        if let Some(full_name) = non_empty(request.full_name.as_deref()) {
            updates.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(bio) = non_empty(request.bio.as_deref()) {
            updates.insert("bio".to_string(), json!(bio));
        }
        if let Some(link) = non_empty(request.link.as_deref()) {
            updates.insert("link".to_string(), json!(link));
        }

        updates.insert("updated_at".to_string(), json!(Utc::now()));

        let updated: User = self
            .db
            .update_by_id_with_json("user", user_id, Value::Object(updates))
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        info!("Updated profile for user {}", updated.raw_id());
        Ok(updated)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Drop already-followed users from a suggestion sample and cap it at four.
fn filter_suggestions(candidates: Vec<User>, following: &[String]) -> Vec<User> {
    candidates
        .into_iter()
        .filter(|user| !following.contains(&user.raw_id()))
        .take(4)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::sql::Thing;

    fn user_with_id(id: &str) -> User {
        User {
            id: Thing::from(("user", id)),
            username: format!("user-{}", id),
            email: format!("{}@example.com", id),
            password: "hash".to_string(),
            full_name: "Test User".to_string(),
            bio: None,
            link: None,
            profile_img: None,
            cover_img: None,
            followers: vec![],
            following: vec![],
            liked_posts: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn non_empty_skips_blank_values() {
        assert_eq!(non_empty(Some("value")), Some("value"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn suggestions_drop_followed_users_and_cap_at_four() {
        let candidates: Vec<User> = (0..8).map(|i| user_with_id(&format!("u{}", i))).collect();
        let following = vec!["u0".to_string(), "u1".to_string()];

        let suggested = filter_suggestions(candidates, &following);

        assert_eq!(suggested.len(), 4);
        assert!(suggested.iter().all(|u| !following.contains(&u.raw_id())));
    }

    #[test]
    fn suggestions_may_be_fewer_than_four() {
        let candidates: Vec<User> = (0..2).map(|i| user_with_id(&format!("u{}", i))).collect();
        let suggested = filter_suggestions(candidates, &[]);
        assert_eq!(suggested.len(), 2);
    }
}
