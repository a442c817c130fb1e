//! Notification Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Notification, NotificationType, NotificationTypeCount, PartyRef};

const NOTIFICATION_TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, notification: Notification) -> RepoResult<Notification> {
        let created: Option<Notification> = self
            .base
            .db()
            .create(NOTIFICATION_TABLE)
            .content(notification)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Notification>> {
        let rid = make_record_id(NOTIFICATION_TABLE, id);
        let notification: Option<Notification> = self.base.db().select(rid).await?;
        Ok(notification)
    }

    /// List one recipient's notifications, newest first
    pub async fn list_for_recipient(
        &self,
        recipient: &PartyRef,
        unread_only: bool,
        kind: Option<NotificationType>,
        page: u32,
        limit: u32,
    ) -> RepoResult<(Vec<Notification>, u64)> {
        let start = (page.max(1) - 1) * limit;

        let mut conditions = vec!["recipient.id = $recipient"];
        if unread_only {
            conditions.push("read = false");
        }
        if kind.is_some() {
            conditions.push("type = $kind");
        }
        let where_clause = conditions.join(" AND ");

        let list_sql = format!(
            "SELECT * FROM notification WHERE {} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_sql = format!(
            "SELECT count() AS total FROM notification WHERE {} GROUP ALL",
            where_clause
        );

        let mut query = self
            .base
            .db()
            .query(list_sql)
            .query(count_sql)
            .bind(("recipient", recipient.id_string()))
            .bind(("limit", limit as i64))
            .bind(("start", start as i64));
        if let Some(k) = kind {
            query = query.bind(("kind", k.as_str().to_string()));
        }

        let mut result = query.await?;
        let notifications: Vec<Notification> = result.take(0)?;

        #[derive(serde::Deserialize)]
        struct Total {
            total: u64,
        }
        let totals: Vec<Total> = result.take(1)?;
        let total = totals.first().map(|t| t.total).unwrap_or(0);

        Ok((notifications, total))
    }

    /// Unread count for one recipient
    pub async fn unread_count(&self, recipient: &PartyRef) -> RepoResult<u64> {
        #[derive(serde::Deserialize)]
        struct Total {
            total: u64,
        }
        let totals: Vec<Total> = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM notification WHERE recipient.id = $recipient AND read = false GROUP ALL",
            )
            .bind(("recipient", recipient.id_string()))
            .await?
            .take(0)?;
        Ok(totals.first().map(|t| t.total).unwrap_or(0))
    }

    /// Mark one notification read; setting read twice has no further effect
    pub async fn mark_as_read(&self, id: &str) -> RepoResult<Notification> {
        let rid = make_record_id(NOTIFICATION_TABLE, id);

        let mut notification: Notification = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)))?;

        if !notification.read {
            notification.read = true;
            notification.read_at = Some(shared::util::now_millis());
            notification.id = None;
            let updated: Option<Notification> =
                self.base.db().update(rid).content(notification).await?;
            return updated
                .ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)));
        }

        Ok(notification)
    }

    /// Bulk idempotent mark-all-read for one recipient
    pub async fn mark_all_as_read(&self, recipient: &PartyRef) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE notification SET read = true, read_at = $now \
                 WHERE recipient.id = $recipient AND read = false RETURN AFTER",
            )
            .bind(("recipient", recipient.id_string()))
            .bind(("now", shared::util::now_millis()))
            .await?;
        let updated: Vec<Notification> = result.take(0)?;
        Ok(updated.len())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = make_record_id(NOTIFICATION_TABLE, id);
        let deleted: Option<Notification> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!(
                "Notification {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Per-type counts (total + unread) for one recipient
    pub async fn type_breakdown(
        &self,
        recipient: &PartyRef,
    ) -> RepoResult<Vec<NotificationTypeCount>> {
        #[derive(serde::Deserialize)]
        struct TypeCount {
            #[serde(rename = "type")]
            kind: NotificationType,
            count: i64,
        }

        let mut result = self
            .base
            .db()
            .query(
                "SELECT type, count() AS count FROM notification \
                 WHERE recipient.id = $recipient GROUP BY type",
            )
            .query(
                "SELECT type, count() AS count FROM notification \
                 WHERE recipient.id = $recipient AND read = false GROUP BY type",
            )
            .bind(("recipient", recipient.id_string()))
            .await?;

        let totals: Vec<TypeCount> = result.take(0)?;
        let unread: Vec<TypeCount> = result.take(1)?;

        let counts = totals
            .into_iter()
            .map(|t| {
                let unread_count = unread
                    .iter()
                    .find(|u| u.kind == t.kind)
                    .map(|u| u.count)
                    .unwrap_or(0);
                NotificationTypeCount {
                    kind: t.kind,
                    count: t.count,
                    unread: unread_count,
                }
            })
            .collect();
        Ok(counts)
    }

    /// Total notification count for one recipient
    pub async fn total_count(&self, recipient: &PartyRef) -> RepoResult<u64> {
        #[derive(serde::Deserialize)]
        struct Total {
            total: u64,
        }
        let totals: Vec<Total> = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM notification WHERE recipient.id = $recipient GROUP ALL",
            )
            .bind(("recipient", recipient.id_string()))
            .await?
            .take(0)?;
        Ok(totals.first().map(|t| t.total).unwrap_or(0))
    }
}
