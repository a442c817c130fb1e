//! Unified error system
//!
//! Every failure in the backend is one [`ErrorCode`] (u16, range-partitioned
//! by domain: 0xxx general, 1xxx auth, 2xxx permission, 3xxx account, 4xxx
//! order, 5xxx payment, 6xxx product, 7xxx reservation, 8xxx rating, 9xxx
//! system). [`AppError`] wraps a code with a message and optional details;
//! [`ApiResponse`] is the wire envelope; [`ErrorCategory`] groups codes for
//! logging.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Only 3 left")
//!     .with_detail("available", 3);
//! assert_eq!(err.http_status(), shared::http::StatusCode::BAD_REQUEST);
//!
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(6003));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorDetails};
