//! Webhook Event Repository
//!
//! event_id 唯一索引；重复投递在这里被识别并跳过。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::WebhookEvent;

const WEBHOOK_EVENT_TABLE: &str = "webhook_event";

#[derive(Clone)]
pub struct WebhookEventRepository {
    base: BaseRepository,
}

impl WebhookEventRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record an event id; returns false when the id was already processed
    pub async fn record(&self, event_id: &str, event_type: &str) -> RepoResult<bool> {
        let event = WebhookEvent {
            id: None,
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            received_at: shared::util::now_millis(),
        };

        let result: Result<Option<WebhookEvent>, surrealdb::Error> = self
            .base
            .db()
            .create(WEBHOOK_EVENT_TABLE)
            .content(event)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match RepoError::from(e) {
                RepoError::Duplicate(_) => Ok(false),
                other => Err(other),
            },
        }
    }
}
