//! Error category classification
//!
//! The leading digit of a code's numeric range determines its category;
//! the category drives boundary logging and client-side grouping.

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain grouping for error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Account errors (3xxx)
    Account,
    /// Order errors (4xxx)
    Order,
    /// Payment errors (5xxx)
    Payment,
    /// Product errors (6xxx)
    Product,
    /// Reservation errors (7xxx)
    Reservation,
    /// Rating / notification errors (8xxx)
    Rating,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Classify a raw code value by its thousand-range
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Account,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Product,
            7000..8000 => Self::Reservation,
            8000..9000 => Self::Rating,
            _ => Self::System,
        }
    }

    /// Snake-case label used in logs and responses
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Account => "account",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Product => "product",
            Self::Reservation => "reservation",
            Self::Rating => "rating",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// The category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_classification() {
        let cases: [(u16, ErrorCategory); 13] = [
            (0, ErrorCategory::General),
            (999, ErrorCategory::General),
            (1001, ErrorCategory::Auth),
            (1999, ErrorCategory::Auth),
            (2001, ErrorCategory::Permission),
            (3004, ErrorCategory::Account),
            (4003, ErrorCategory::Order),
            (5006, ErrorCategory::Payment),
            (6003, ErrorCategory::Product),
            (7005, ErrorCategory::Reservation),
            (8101, ErrorCategory::Rating),
            (9002, ErrorCategory::System),
            (65535, ErrorCategory::System),
        ];
        for (code, expected) in cases {
            assert_eq!(ErrorCategory::from_code(code), expected, "code {code}");
        }
    }

    #[test]
    fn test_codes_carry_their_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::ShopNotFound.category(), ErrorCategory::Account);
        assert_eq!(
            ErrorCode::InvalidStatusTransition.category(),
            ErrorCategory::Order
        );
        assert_eq!(
            ErrorCode::WebhookSignatureInvalid.category(),
            ErrorCategory::Payment
        );
        assert_eq!(
            ErrorCode::ReservationAlreadyConverted.category(),
            ErrorCategory::Reservation
        );
        assert_eq!(
            ErrorCode::NotificationNotFound.category(),
            ErrorCategory::Rating
        );
    }

    #[test]
    fn test_names_are_snake_case() {
        let all = [
            ErrorCategory::General,
            ErrorCategory::Auth,
            ErrorCategory::Permission,
            ErrorCategory::Account,
            ErrorCategory::Order,
            ErrorCategory::Payment,
            ErrorCategory::Product,
            ErrorCategory::Reservation,
            ErrorCategory::Rating,
            ErrorCategory::System,
        ];
        for category in all {
            let name = category.name();
            assert!(name.chars().all(|c| c.is_ascii_lowercase()));
            // serde uses the same label
            assert_eq!(
                serde_json::to_string(&category).unwrap(),
                format!("\"{name}\"")
            );
        }
    }
}
