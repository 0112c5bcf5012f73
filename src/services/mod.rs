pub mod auth;
pub mod database;
pub mod follow;
pub mod notification;
pub mod post;
pub mod storage;
pub mod user;

// Re-export the service types
pub use auth::AuthService;
pub use database::Database;
pub use follow::FollowService;
pub use notification::NotificationService;
pub use post::PostService;
pub use storage::StorageService;
pub use user::UserService;
