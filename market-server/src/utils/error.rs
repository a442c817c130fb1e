//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，此处统一 re-export，
//! 并提供仓储层错误到应用错误的转换。

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::with_message(ErrorCode::ValidationFailed, msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}
