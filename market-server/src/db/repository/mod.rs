//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Accounts
pub mod buyer;
pub mod supplier;

// Catalog
pub mod product;

// Workflow
pub mod notification;
pub mod order;
pub mod rating;
pub mod reservation;
pub mod webhook_event;

// Re-exports
pub use buyer::BuyerRepository;
pub use notification::NotificationRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use rating::RatingRepository;
pub use reservation::ReservationRepository;
pub use supplier::SupplierRepository;
pub use webhook_event::WebhookEventRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique-index violations surface as plain database errors; classify
        // them so callers can map to the conflict-class API error
        let lowered = msg.to_lowercase();
        if lowered.contains("already contains") || lowered.contains("duplicate") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "product:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("product", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Coerce an API-supplied id ("table:key" or bare key) into a RecordId
pub fn make_record_id(table: &str, id: &str) -> RecordId {
    if id.contains(':') {
        if let Ok(rid) = id.parse::<RecordId>() {
            return rid;
        }
    }
    RecordId::from_table_key(table, id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
