//! Database Module
//!
//! 嵌入式 SurrealDB 存储：连接初始化 + 唯一索引定义

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

/// Open the embedded database at the given path and apply schema constraints
pub async fn connect(path: &Path) -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

    db.use_ns("market")
        .use_db("market")
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

    define_schema(&db).await?;

    tracing::info!(path = %path.display(), "Database connection established");
    Ok(db)
}

/// Declare the unique indexes the workflows rely on
///
/// - email uniqueness for both account tables
/// - document-number uniqueness for orders and reservations
/// - one rating per rater/ratee(/order) combination
/// - webhook event-id dedup ledger
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS buyer_email ON TABLE buyer COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS supplier_email ON TABLE supplier COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS order_number ON TABLE order COLUMNS order_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS reservation_number ON TABLE reservation COLUMNS reservation_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS rating_unique ON TABLE rating COLUMNS unique_key UNIQUE;
        DEFINE INDEX IF NOT EXISTS webhook_event_id ON TABLE webhook_event COLUMNS event_id UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;

    Ok(())
}
