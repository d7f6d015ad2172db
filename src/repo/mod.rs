pub mod activity;
pub mod users;

use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;

pub use activity::{ActivityAction, ActivityEntry, ActivityRepository, InMemoryActivityRepository};
pub use users::{InMemoryUserRepository, NewUser, User, UserRepository};

/// Repository-level errors
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Conflict: {0}")]
    Conflict(String),
}

pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub activity: Arc<dyn ActivityRepository>,
}

impl Repositories {
    pub fn in_memory(cfg: &Config) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            activity: Arc::new(InMemoryActivityRepository::new(cfg.activity.max_entries)),
        }
    }
}
