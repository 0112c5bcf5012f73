use crate::{
    config::Config,
    services::{
        auth::AuthService, database::Database, follow::FollowService,
        notification::NotificationService, post::PostService, storage::StorageService,
        user::UserService,
    },
};

/// Shared application state: configuration plus one instance of every
/// service, cloned cheaply into each request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,

    /// Database connection
    pub db: Database,

    /// Session issuer
    pub auth_service: AuthService,

    /// Credential store
    pub user_service: UserService,

    /// Social graph mutator
    pub follow_service: FollowService,

    /// Content store
    pub post_service: PostService,

    /// Notification recorder
    pub notification_service: NotificationService,

    /// Object-storage client
    pub storage_service: StorageService,
}

impl AppState {
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }

    pub fn is_development(&self) -> bool {
        self.config.is_development()
    }
}
