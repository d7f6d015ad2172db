//! Per-user activity log (logins, scenario changes).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::Display;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityAction {
    Register,
    Login,
    ScenarioChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: ActivityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        detail: Option<String>,
    ) -> Result<ActivityEntry, RepoError>;

    /// Most recent entries for a user, newest first
    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityEntry>, RepoError>;
}

/// Bounded in-memory log; the oldest entries are dropped once full
pub struct InMemoryActivityRepository {
    entries: RwLock<VecDeque<ActivityEntry>>,
    max_entries: usize,
}

impl InMemoryActivityRepository {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn record(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        detail: Option<String>,
    ) -> Result<ActivityEntry, RepoError> {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            user_id,
            action,
            detail,
            at: Utc::now(),
        };
        let mut entries = self.entries.write().await;
        while entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(entry)
    }

    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityEntry>, RepoError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
