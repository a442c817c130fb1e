//! Order Model
//!
//! 订单只通过状态机转移和支付处理器变更，从不删除。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::party::PartyRef;
use super::serde_helpers;

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        }
    }
}

/// Payment method for orders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    CashOnDelivery,
    BankTransfer,
}

/// Payment status within an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

/// Embedded payment sub-record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// External processor intent id
    pub intent_id: Option<String>,
    pub transaction_id: Option<String>,
    pub paid_amount: Option<f64>,
    /// epoch millis
    pub payment_date: Option<i64>,
}

impl PaymentInfo {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            status: PaymentStatus::Pending,
            intent_id: None,
            transaction_id: None,
            paid_amount: None,
            payment_date: None,
        }
    }
}

/// Shipping address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "Sri Lanka".to_string()
}

/// Order line item with price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i32,
    /// Unit price at order time; immune to later product price edits
    pub price_at_time: f64,
    pub subtotal: f64,
}

/// Append-only status history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    /// epoch millis
    pub timestamp: i64,
    pub actor: Option<PartyRef>,
    pub notes: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Unique human-readable number (ORD-<millis>-<seq>)
    pub order_number: String,
    #[serde(with = "serde_helpers::record_id")]
    pub buyer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub supplier: RecordId,
    pub items: Vec<OrderItem>,
    /// Sum of item subtotals at creation
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub shipping_address: Address,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<i64>,
    pub actual_delivery: Option<i64>,
    pub notes: Option<String>,
    pub buyer_notes: Option<String>,
    pub supplier_notes: Option<String>,
    /// Append-only; every transition pushes exactly one entry
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// API Request Types
// =============================================================================

/// One requested line of a checkout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Status transition payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
}

/// Filter/pagination for order listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Per-status breakdown for statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub status: OrderStatus,
    pub count: i64,
    pub total_amount: f64,
}

/// Order statistics response
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub status_breakdown: Vec<StatusBreakdown>,
}
