pub mod auth;
pub mod notifications;
pub mod posts;
pub mod users;
