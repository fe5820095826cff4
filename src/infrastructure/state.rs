//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::BookRepository;
use crate::infrastructure::{
    SeaOrmBookRepository, config::Config, oauth::GoogleOAuthClient,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Catalog repository
    pub book_repo: Arc<dyn BookRepository>,
    /// `None` when Google sign-in is not configured
    pub google: Option<Arc<GoogleOAuthClient>>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let google = config
            .google
            .as_ref()
            .map(|g| Arc::new(GoogleOAuthClient::new(g)));

        Self {
            db,
            config: Arc::new(config),
            book_repo,
            google,
        }
    }

    /// Replace the Google client, e.g. with one pointed at a stub server.
    pub fn with_google(mut self, client: GoogleOAuthClient) -> Self {
        self.google = Some(Arc::new(client));
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
