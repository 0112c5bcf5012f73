use crate::{
    error::{AppError, Result},
    models::notification::{NewNotification, NotificationKind},
    models::post::*,
    models::user::{User, UserSummary},
    services::{Database, NotificationService, StorageService},
};
use chrono::Utc;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Content store. Owns post records: creation, deletion, comments, the
/// like toggle and the feed-style read operations.
#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
    notification_service: NotificationService,
    storage: StorageService,
}

impl PostService {
    pub async fn new(
        db: Arc<Database>,
        notification_service: NotificationService,
        storage: StorageService,
    ) -> Result<Self> {
        Ok(Self {
            db,
            notification_service,
            storage,
        })
    }

    /// Create a post. The image payload, if any, is uploaded to external
    /// storage first and replaced by its URL.
    pub async fn create_post(&self, user_id: &str, request: CreatePostRequest) -> Result<PostResponse> {
        let author: User = self
            .db
            .get_by_id("user", user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let text = request.text.filter(|t| !t.trim().is_empty());
        let img_payload = request.img.filter(|i| !i.trim().is_empty());

        if text.is_none() && img_payload.is_none() {
            return Err(AppError::bad_request("Please provide text or image"));
        }

        let img = match img_payload {
            Some(payload) => Some(self.storage.upload(&payload).await?),
            None => None,
        };

        let id = Uuid::new_v4().to_string();
        let post: Post = self
            .db
            .create_with_id("post", &id, NewPost::new(user_id.to_string(), text, img))
            .await?;

        info!("User {} created post {}", user_id, post.raw_id());
        self.resolve_post(post, &author).await
    }

    /// Delete a post. Only the owning author may delete; an associated
    /// image is destroyed in external storage before the record goes.
    pub async fn delete_post(&self, post_id: &str, user_id: &str) -> Result<()> {
        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        if post.user_id != user_id {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        if let Some(img) = &post.img {
            self.storage.destroy(img).await?;
        }

        self.db.delete_by_id("post", post_id).await?;
        info!("User {} deleted post {}", user_id, post_id);
        Ok(())
    }

    /// Append a comment to a post. Any authenticated user may comment.
    pub async fn comment_on_post(
        &self,
        post_id: &str,
        user_id: &str,
        request: CommentRequest,
    ) -> Result<PostResponse> {
        let text = request
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("Please provide text"))?;

        let existing: Option<Post> = self.db.get_by_id("post", post_id).await?;
        if existing.is_none() {
            return Err(AppError::not_found("Post"));
        }

        let now = Utc::now();
        let comment = Comment {
            user_id: user_id.to_string(),
            text,
            created_at: now,
        };

        let mut response = self
            .db
            .query_with_params(
                r#"
                    UPDATE type::thing('post', $post)
                        SET comments += $comment, updated_at = $now
                        RETURN AFTER
                "#,
                json!({ "post": post_id, "comment": comment, "now": now }),
            )
            .await?;
        let updated: Vec<Post> = response.take(0)?;
        let post = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Failed to append comment"))?;

        debug!("User {} commented on post {}", user_id, post_id);
        self.resolve_posts(vec![post])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Failed to resolve updated post"))
    }

    /// Toggle the acting user's like on a post. Both sides of the
    /// relationship (the post's likes and the user's liked-posts list) are
    /// kept in sync inside one transaction. Liking records a notification
    /// to the post's author; unliking does not.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<LikeAction> {
        let post: Post = self
            .db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        let now = Utc::now();

        if post.likes.contains(&user_id.to_string()) {
            self.db
                .query_with_params(
                    r#"
                        BEGIN TRANSACTION;
                        UPDATE type::thing('post', $post) SET likes -= $user, updated_at = $now;
                        UPDATE type::thing('user', $user) SET liked_posts -= $post, updated_at = $now;
                        COMMIT TRANSACTION;
                    "#,
                    json!({ "post": post_id, "user": user_id, "now": now }),
                )
                .await?;

            debug!("User {} unliked post {}", user_id, post_id);
            Ok(LikeAction::Unliked)
        } else {
            self.db
                .query_with_params(
                    r#"
                        BEGIN TRANSACTION;
                        UPDATE type::thing('post', $post)
                            SET likes = array::union(likes, [$user]), updated_at = $now;
                        UPDATE type::thing('user', $user)
                            SET liked_posts = array::union(liked_posts, [$post]), updated_at = $now;
                        COMMIT TRANSACTION;
                    "#,
                    json!({ "post": post_id, "user": user_id, "now": now }),
                )
                .await?;

            let notification = NewNotification::new(
                user_id.to_string(),
                post.user_id.clone(),
                NotificationKind::Like,
            );
            if let Err(e) = self.notification_service.record(notification).await {
                warn!("Failed to record like notification: {}", e);
            }

            debug!("User {} liked post {}", user_id, post_id);
            Ok(LikeAction::Liked)
        }
    }

    /// All posts, newest first.
    pub async fn get_all_posts(&self) -> Result<Vec<PostResponse>> {
        let mut response = self
            .db
            .query("SELECT * FROM post ORDER BY created_at DESC")
            .await?;
        let posts: Vec<Post> = response.take(0)?;
        self.resolve_posts(posts).await
    }

    /// Posts liked by the given user, newest first.
    pub async fn get_liked_posts(&self, user_id: &str) -> Result<Vec<PostResponse>> {
        let user: User = self
            .db
            .get_by_id("user", user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if user.liked_posts.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM post WHERE meta::id(id) IN $ids ORDER BY created_at DESC",
                json!({ "ids": user.liked_posts }),
            )
            .await?;
        let posts: Vec<Post> = response.take(0)?;
        self.resolve_posts(posts).await
    }

    /// Posts authored by users the requester follows, newest first.
    pub async fn get_following_posts(&self, user_id: &str) -> Result<Vec<PostResponse>> {
        let user: User = self
            .db
            .get_by_id("user", user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if user.following.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM post WHERE user_id IN $ids ORDER BY created_at DESC",
                json!({ "ids": user.following }),
            )
            .await?;
        let posts: Vec<Post> = response.take(0)?;
        self.resolve_posts(posts).await
    }

    /// Posts authored by the named user, newest first.
    pub async fn get_user_posts(&self, username: &str) -> Result<Vec<PostResponse>> {
        let user: User = self
            .db
            .find_one("user", "username", username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM post WHERE user_id = $user ORDER BY created_at DESC",
                json!({ "user": user.raw_id() }),
            )
            .await?;
        let posts: Vec<Post> = response.take(0)?;
        self.resolve_posts(posts).await
    }

    /// Resolve author and commenter identities for a batch of posts.
    async fn resolve_posts(&self, posts: Vec<Post>) -> Result<Vec<PostResponse>> {
        let mut ids: HashSet<String> = HashSet::new();
        for post in &posts {
            ids.insert(post.user_id.clone());
            for comment in &post.comments {
                ids.insert(comment.user_id.clone());
            }
        }

        let users = self.resolve_users(&ids.into_iter().collect::<Vec<_>>()).await?;

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = users.get(&post.user_id) else {
                    warn!("Dropping post {} with unknown author {}", post.raw_id(), post.user_id);
                    return None;
                };
                Some(build_post_response(post, author.clone(), &users))
            })
            .collect())
    }

    /// Resolve a single fresh post whose author record is already at hand.
    async fn resolve_post(&self, post: Post, author: &User) -> Result<PostResponse> {
        let mut users = HashMap::new();
        users.insert(author.raw_id(), author.to_summary());
        Ok(build_post_response(post, author.to_summary(), &users))
    }

    async fn resolve_users(&self, ids: &[String]) -> Result<HashMap<String, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT * FROM user WHERE meta::id(id) IN $ids",
                json!({ "ids": ids }),
            )
            .await?;
        let users: Vec<User> = response.take(0)?;

        Ok(users
            .into_iter()
            .map(|user| (user.raw_id(), user.to_summary()))
            .collect())
    }
}

fn build_post_response(
    post: Post,
    author: UserSummary,
    users: &HashMap<String, UserSummary>,
) -> PostResponse {
    let id = post.raw_id();
    let comments = post
        .comments
        .into_iter()
        .filter_map(|comment| {
            let user = users.get(&comment.user_id)?.clone();
            Some(CommentResponse {
                user,
                text: comment.text,
                created_at: comment.created_at,
            })
        })
        .collect();

    PostResponse {
        id,
        user: author,
        text: post.text,
        img: post.img,
        likes: post.likes,
        comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::sql::Thing;

    fn summary(id: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            username: format!("user-{}", id),
            full_name: "Test User".to_string(),
            profile_img: None,
        }
    }

    fn post_with_comments(author: &str, commenters: &[&str]) -> Post {
        let now = Utc::now();
        Post {
            id: Thing::from(("post", "p1")),
            user_id: author.to_string(),
            text: Some("hello".to_string()),
            img: None,
            likes: vec![],
            comments: commenters
                .iter()
                .map(|c| Comment {
                    user_id: c.to_string(),
                    text: "nice".to_string(),
                    created_at: now,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn response_resolves_commenter_identities() {
        let post = post_with_comments("author", &["c1", "c2"]);
        let mut users = HashMap::new();
        users.insert("author".to_string(), summary("author"));
        users.insert("c1".to_string(), summary("c1"));
        users.insert("c2".to_string(), summary("c2"));

        let response = build_post_response(post, summary("author"), &users);

        assert_eq!(response.id, "p1");
        assert_eq!(response.comments.len(), 2);
        assert_eq!(response.comments[0].user.username, "user-c1");
    }

    #[test]
    fn unresolvable_commenters_are_skipped() {
        let post = post_with_comments("author", &["c1", "ghost"]);
        let mut users = HashMap::new();
        users.insert("author".to_string(), summary("author"));
        users.insert("c1".to_string(), summary("c1"));

        let response = build_post_response(post, summary("author"), &users);

        assert_eq!(response.comments.len(), 1);
    }
}
