//! Product Model
//!
//! 商品由唯一一个参与方（买家店铺或供应商）持有，
//! 价格历史为 append-only 日志。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::party::PartyRef;
use super::serde_helpers;

/// Append-only price history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub price: f64,
    /// epoch millis
    pub date: i64,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_by: Option<RecordId>,
    pub reason: String,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Owning party (a buyer shop or a supplier)
    pub owner: PartyRef,
    pub name: String,
    pub shop_name: String,
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Current unit price
    pub price: f64,
    /// Units in stock
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Append-only; every price mutation pushes a new entry
    #[serde(default)]
    pub price_history: Vec<PriceEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create payload
///
/// shop_name/location 缺省时回填所有者账号上的资料
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub shop_name: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i32,
}

/// Update payload
///
/// A price change appends a history entry; other fields overwrite in place.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
    /// Reason recorded with a price change (default "Product update")
    pub reason: Option<String>,
}

/// One entry of a bulk price update request
#[derive(Debug, Clone, Deserialize)]
pub struct BulkPriceUpdate {
    pub product_id: String,
    pub new_price: f64,
    pub reason: Option<String>,
}

/// Per-item outcome of a bulk price update
#[derive(Debug, Clone, Serialize)]
pub struct BulkPriceResult {
    pub product_id: String,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_price: Option<f64>,
}
