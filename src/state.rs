use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Repository;
use crate::services::email::Mailer;

/// Shared per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Repository,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: Arc::new(config),
            repository,
            mailer,
        }
    }
}
