//! 通知分发器
//!
//! 状态变更动作在这里落一条 Notification 记录。
//! 推送/邮件投递是未实现的挂钩；分发失败只记 warn，
//! 不回滚触发它的主变更。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{NewNotification, Notification};
use crate::db::repository::NotificationRepository;

/// Persists one notification record per state-changing action
#[derive(Clone)]
pub struct NotificationDispatcher {
    repo: NotificationRepository,
}

impl NotificationDispatcher {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: NotificationRepository::new(db),
        }
    }

    /// Persist one notification record
    ///
    /// Returns the stored record on success. A storage failure is logged
    /// and swallowed: the primary mutation this notification accompanies
    /// has already been committed and must stand.
    pub async fn dispatch(&self, new: NewNotification) -> Option<Notification> {
        let notification = Notification {
            id: None,
            recipient: new.recipient,
            sender: new.sender,
            kind: new.kind,
            title: new.title,
            message: new.message,
            related_order: new.related_order,
            related_reservation: new.related_reservation,
            related_product: new.related_product,
            read: false,
            read_at: None,
            priority: new.priority,
            created_at: shared::util::now_millis(),
        };

        match self.repo.create(notification).await {
            Ok(stored) => {
                // TODO: push notification hook
                // TODO: email hook
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist notification");
                None
            }
        }
    }
}
