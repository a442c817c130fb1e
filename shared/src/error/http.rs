//! HTTP status code mapping for error codes
//!
//! The public API contract uses a deliberately small status set:
//! 200/201 success, 400 validation or business-rule violation, 401
//! unauthenticated, 403 unauthorized, 404 not found, 500 unexpected.
//! Conflict-class codes (duplicates, invalid state transitions) map to
//! 400, not 409.

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BuyerNotFound
            | Self::SupplierNotFound
            | Self::ShopNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::ReservationNotFound
            | Self::NotificationNotFound
            | Self::PaymentIntentNotFound => StatusCode::NOT_FOUND,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled
            | Self::WebhookSignatureInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 400 Bad Request (validation + business-rule violations,
            // including conflict-class codes)
            Self::ValidationFailed
            | Self::AlreadyExists
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::EmailExists
            | Self::OrderAlreadyPaid
            | Self::InvalidStatusTransition
            | Self::OrderEmpty
            | Self::MixedSupplierOrder
            | Self::PaymentFailed
            | Self::PaymentNotCompleted
            | Self::PaymentInvalidMethod
            | Self::PaymentAlreadyRefunded
            | Self::ProductInvalidPrice
            | Self::InsufficientStock
            | Self::ReservationExpired
            | Self::ReservationNotPending
            | Self::ReservationNotAccepted
            | Self::ReservationAlreadyConverted
            | Self::BankDetailsRequired
            | Self::RatingDuplicate
            | Self::RatingSelfForbidden
            | Self::RatingOutOfRange => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::NetworkError
            | Self::TimeoutError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_class_maps_to_bad_request() {
        // Duplicates and invalid transitions are business-rule violations
        // on this API surface, not 409s
        assert_eq!(
            ErrorCode::AlreadyExists.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::RatingDuplicate.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ReservationAlreadyConverted.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::EmailExists.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_webhook_signature_fails_closed() {
        assert_eq!(
            ErrorCode::WebhookSignatureInvalid.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
