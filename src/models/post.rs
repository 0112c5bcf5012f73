use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::models::user::UserSummary;

/// A comment embedded in its post. Comments are only ever appended; there
/// is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post record as stored in the `post` table.
///
/// `likes` behaves as a set: the toggle path never appends an id that is
/// already present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Thing,
    pub user_id: String,
    pub text: Option<String>,
    pub img: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content for a new `post` record. The record id is assigned separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub user_id: String,
    pub text: Option<String>,
    pub img: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(user_id: String, text: Option<String>, img: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            text,
            img,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub user: UserSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post with author and commenter identities resolved.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub user: UserSummary,
    pub text: Option<String>,
    pub img: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Raw record id without the table prefix.
    pub fn raw_id(&self) -> String {
        self.id.id.to_raw()
    }
}
