//! Shared types for the marketplace backend
//!
//! Common types used by the server crate: unified error codes and
//! responses, pagination helpers, and document-number utilities.

pub mod error;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
