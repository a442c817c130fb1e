//! Reservation Model
//!
//! 预订是针对某商品未来数量的请求，区别于已成立的订单。
//! 默认 7 天后过期；只能转换为订单一次。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::order::Address;
use super::party::PartyRef;
use super::serde_helpers;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Expired,
    ConvertedToOrder,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Expired => "expired",
            ReservationStatus::ConvertedToOrder => "converted_to_order",
        }
    }
}

/// Payment method for reservations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationPaymentMethod {
    /// Advance bank transfer, requires bank details
    Advance,
    /// Cash on delivery
    Cod,
}

/// Bank details, only meaningful for advance payment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankDetails {
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub branch_holder_name: String,
}

impl BankDetails {
    /// All fields blanked (the persisted shape for cod reservations)
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.account_number.is_empty() && self.bank_name.is_empty()
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Unique human-readable number (RES-<millis>-<seq>)
    pub reservation_number: String,
    /// The shop taking the reservation — a supplier or a buyer business
    pub shop: PartyRef,
    /// The account that filed the request, when it was made while logged in
    pub requester: Option<PartyRef>,
    /// Requested product line
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub product_name: String,
    // Requester contact
    pub name: String,
    pub mobile_no: String,
    pub location: String,
    pub quantity: f64,
    #[serde(default)]
    pub quality_grade: String,
    /// Requested delivery date, epoch millis
    pub delivery_date: Option<i64>,
    pub payment_method: ReservationPaymentMethod,
    /// Present iff payment_method is advance; cleared for cod
    pub bank_details: BankDetails,
    pub delivery_address: Option<Address>,
    pub status: ReservationStatus,
    /// epoch millis
    pub expires_at: i64,
    pub responded_at: Option<i64>,
    pub response_notes: Option<String>,
    // Supplier counter-offer, set on accept
    pub proposed_price: Option<f64>,
    pub proposed_quantity: Option<f64>,
    pub proposed_delivery_date: Option<i64>,
    // One-way, one-time conversion
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub converted_order: Option<RecordId>,
    pub converted_at: Option<i64>,
    #[serde(default)]
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Create payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReservationCreate {
    /// Shop identity — may resolve to a supplier or a buyer business
    pub shop_id: String,
    pub product_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 10, max = 15))]
    pub mobile_no: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(range(min = 0.001))]
    pub quantity: f64,
    pub quality_grade: Option<String>,
    pub delivery_date: Option<i64>,
    pub payment_method: ReservationPaymentMethod,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
    pub branch_holder_name: Option<String>,
    pub delivery_address: Option<Address>,
    pub notes: Option<String>,
}

/// Supplier response payload (accept carries an optional counter-offer)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReservationResponse {
    pub message: Option<String>,
    pub proposed_price: Option<f64>,
    pub proposed_quantity: Option<f64>,
    pub proposed_delivery_date: Option<i64>,
}

/// Per-status breakdown for reservation statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusCount {
    pub status: ReservationStatus,
    pub count: i64,
}

/// Reservation statistics response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationStatistics {
    pub total: i64,
    pub by_status: Vec<ReservationStatusCount>,
}
