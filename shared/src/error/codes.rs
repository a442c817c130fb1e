//! Unified error codes for the marketplace backend
//!
//! One u16 per failure mode, range-partitioned by domain:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Reservation errors
//! - 8xxx: Rating / notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its numeric value so clients in other languages can
/// switch on it without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// No error
    Success = 0,
    /// Failure with no better classification
    Unknown = 1,
    /// Input failed validation
    ValidationFailed = 2,
    /// Referenced entity is absent
    NotFound = 3,
    /// A unique constraint was violated
    AlreadyExists = 4,
    /// Request is structurally wrong
    InvalidRequest = 5,
    /// Wrong format for a field
    InvalidFormat = 6,
    /// A mandatory field is absent
    RequiredField = 7,
    /// Numeric value outside the accepted range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// No credential presented
    NotAuthenticated = 1001,
    /// Email/password pair does not match
    InvalidCredentials = 1002,
    /// Bearer token past its expiry
    TokenExpired = 1003,
    /// Bearer token malformed or badly signed
    TokenInvalid = 1004,
    /// Account exists but is deactivated
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Actor lacks permission over the entity
    PermissionDenied = 2001,
    /// Route requires a specific role
    RoleRequired = 2002,
    /// Route requires the admin role
    AdminRequired = 2003,

    // ==================== 3xxx: Account ====================
    /// Buyer not found
    BuyerNotFound = 3001,
    /// Supplier not found
    SupplierNotFound = 3002,
    /// Email already registered
    EmailExists = 3003,
    /// Shop identity resolves to neither supplier nor buyer
    ShopNotFound = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Requested status is not reachable from the current status
    InvalidStatusTransition = 4003,
    /// Order has no items
    OrderEmpty = 4004,
    /// Order items belong to more than one supplier
    MixedSupplierOrder = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment is not in completed state
    PaymentNotCompleted = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Payment has already been refunded
    PaymentAlreadyRefunded = 5004,
    /// Payment intent not found
    PaymentIntentNotFound = 5005,
    /// Webhook signature could not be verified
    WebhookSignatureInvalid = 5006,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Requested quantity exceeds current stock
    InsufficientStock = 6003,

    // ==================== 7xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 7001,
    /// Reservation has expired
    ReservationExpired = 7002,
    /// Reservation is no longer pending
    ReservationNotPending = 7003,
    /// Reservation must be accepted before conversion
    ReservationNotAccepted = 7004,
    /// Reservation has already been converted to an order
    ReservationAlreadyConverted = 7005,
    /// Bank details required for advance payment
    BankDetailsRequired = 7006,

    // ==================== 8xxx: Rating / Notification ====================
    /// Duplicate rating for the same rater/ratee pair
    RatingDuplicate = 8001,
    /// Users cannot rate themselves
    RatingSelfForbidden = 8002,
    /// Rating value must be between 1 and 5
    RatingOutOfRange = 8003,
    /// Notification not found
    NotificationNotFound = 8101,

    // ==================== 9xxx: System ====================
    /// Unclassified server-side failure
    InternalError = 9001,
    /// Storage layer failure
    DatabaseError = 9002,
    /// Downstream network failure
    NetworkError = 9003,
    /// Downstream call timed out
    TimeoutError = 9004,
    /// Bad or missing configuration
    ConfigError = 9005,
}

impl ErrorCode {
    /// Numeric wire value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this is the success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default developer-facing message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Account
            ErrorCode::BuyerNotFound => "Buyer not found",
            ErrorCode::SupplierNotFound => "Supplier not found",
            ErrorCode::EmailExists => "Email is already registered",
            ErrorCode::ShopNotFound => "Shop not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::InvalidStatusTransition => "Invalid order status transition",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::MixedSupplierOrder => "All items must be from the same supplier",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentNotCompleted => "Payment is not completed",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentAlreadyRefunded => "Payment has already been refunded",
            ErrorCode::PaymentIntentNotFound => "Payment intent not found",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature verification failed",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::InsufficientStock => "Insufficient stock",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationExpired => "Reservation has expired",
            ErrorCode::ReservationNotPending => "Reservation is no longer pending",
            ErrorCode::ReservationNotAccepted => "Reservation must be accepted first",
            ErrorCode::ReservationAlreadyConverted => {
                "Reservation has already been converted to an order"
            }
            ErrorCode::BankDetailsRequired => "Bank details are required for advance payment",

            // Rating / Notification
            ErrorCode::RatingDuplicate => "Rating already submitted for this counterparty",
            ErrorCode::RatingSelfForbidden => "Users cannot rate themselves",
            ErrorCode::RatingOutOfRange => "Rating must be between 1 and 5",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Raised when a u16 maps to no known code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code value: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            // General
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,

            // Auth
            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1005 => ErrorCode::AccountDisabled,

            // Permission
            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleRequired,
            2003 => ErrorCode::AdminRequired,

            // Account
            3001 => ErrorCode::BuyerNotFound,
            3002 => ErrorCode::SupplierNotFound,
            3003 => ErrorCode::EmailExists,
            3004 => ErrorCode::ShopNotFound,

            // Order
            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderAlreadyPaid,
            4003 => ErrorCode::InvalidStatusTransition,
            4004 => ErrorCode::OrderEmpty,
            4005 => ErrorCode::MixedSupplierOrder,

            // Payment
            5001 => ErrorCode::PaymentFailed,
            5002 => ErrorCode::PaymentNotCompleted,
            5003 => ErrorCode::PaymentInvalidMethod,
            5004 => ErrorCode::PaymentAlreadyRefunded,
            5005 => ErrorCode::PaymentIntentNotFound,
            5006 => ErrorCode::WebhookSignatureInvalid,

            // Product
            6001 => ErrorCode::ProductNotFound,
            6002 => ErrorCode::ProductInvalidPrice,
            6003 => ErrorCode::InsufficientStock,

            // Reservation
            7001 => ErrorCode::ReservationNotFound,
            7002 => ErrorCode::ReservationExpired,
            7003 => ErrorCode::ReservationNotPending,
            7004 => ErrorCode::ReservationNotAccepted,
            7005 => ErrorCode::ReservationAlreadyConverted,
            7006 => ErrorCode::BankDetailsRequired,

            // Rating / Notification
            8001 => ErrorCode::RatingDuplicate,
            8002 => ErrorCode::RatingSelfForbidden,
            8003 => ErrorCode::RatingOutOfRange,
            8101 => ErrorCode::NotificationNotFound,

            // System
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9003 => ErrorCode::NetworkError,
            9004 => ErrorCode::TimeoutError,
            9005 => ErrorCode::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

// Display prints the numeric value, matching the wire format
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every code a workflow can raise, used by the loop tests below
    const ALL_CODES: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::AccountDisabled,
        ErrorCode::PermissionDenied,
        ErrorCode::RoleRequired,
        ErrorCode::AdminRequired,
        ErrorCode::BuyerNotFound,
        ErrorCode::SupplierNotFound,
        ErrorCode::EmailExists,
        ErrorCode::ShopNotFound,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::InvalidStatusTransition,
        ErrorCode::OrderEmpty,
        ErrorCode::MixedSupplierOrder,
        ErrorCode::PaymentFailed,
        ErrorCode::PaymentNotCompleted,
        ErrorCode::PaymentInvalidMethod,
        ErrorCode::PaymentAlreadyRefunded,
        ErrorCode::PaymentIntentNotFound,
        ErrorCode::WebhookSignatureInvalid,
        ErrorCode::ProductNotFound,
        ErrorCode::ProductInvalidPrice,
        ErrorCode::InsufficientStock,
        ErrorCode::ReservationNotFound,
        ErrorCode::ReservationExpired,
        ErrorCode::ReservationNotPending,
        ErrorCode::ReservationNotAccepted,
        ErrorCode::ReservationAlreadyConverted,
        ErrorCode::BankDetailsRequired,
        ErrorCode::RatingDuplicate,
        ErrorCode::RatingSelfForbidden,
        ErrorCode::RatingOutOfRange,
        ErrorCode::NotificationNotFound,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::NetworkError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
    ];

    #[test]
    fn test_well_known_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::ShopNotFound.code(), 3004);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 4003);
        assert_eq!(ErrorCode::WebhookSignatureInvalid.code(), 5006);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::ReservationAlreadyConverted.code(), 7005);
        assert_eq!(ErrorCode::RatingDuplicate.code(), 8001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_u16_round_trip_for_every_code() {
        for code in ALL_CODES {
            let raw: u16 = (*code).into();
            assert_eq!(ErrorCode::try_from(raw), Ok(*code), "code {raw}");
        }
    }

    #[test]
    fn test_serde_round_trip_for_every_code() {
        for code in ALL_CODES {
            let json = serde_json::to_string(code).unwrap();
            assert_eq!(json, code.code().to_string());
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *code);
        }
    }

    #[test]
    fn test_every_code_has_a_message() {
        for code in ALL_CODES {
            assert!(!code.message().is_empty(), "code {}", code.code());
        }
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(
            ErrorCode::MixedSupplierOrder.message(),
            "All items must be from the same supplier"
        );
    }

    #[test]
    fn test_unknown_values_rejected() {
        for raw in [999u16, 1234, 4999, 10000] {
            assert_eq!(ErrorCode::try_from(raw), Err(InvalidErrorCode(raw)));
        }
        let err = InvalidErrorCode(999);
        assert_eq!(err.to_string(), "unknown error code value: 999");
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(ErrorCode::Success.to_string(), "0");
        assert_eq!(ErrorCode::ReservationExpired.to_string(), "7002");
    }
}
