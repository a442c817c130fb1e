//! Order Repository
//!
//! 订单读写；变更走整单 read-modify-write，从不删除行。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Order, OrderStatus, PaymentStatus, StatusBreakdown};

const ORDER_TABLE: &str = "order";

/// Which side of the order a party is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buyer,
    Supplier,
}

impl OrderSide {
    fn column(&self) -> &'static str {
        match self {
            OrderSide::Buyer => "buyer",
            OrderSide::Supplier => "supplier",
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a freshly built order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = make_record_id(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// Find the order carrying a given payment intent id
    pub async fn find_by_intent_id(&self, intent_id: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE payment.intent_id = $intent LIMIT 1")
            .bind(("intent", intent_id.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Write back a mutated order (read-modify-write)
    pub async fn save(&self, mut order: Order) -> RepoResult<Order> {
        let rid = order
            .id
            .take()
            .ok_or_else(|| RepoError::Validation("order has no id".into()))?;
        // id 由目标记录决定，content 里不带
        let updated: Option<Order> = self.base.db().update(rid).content(order).await?;
        updated.ok_or_else(|| RepoError::NotFound("Order not found".to_string()))
    }

    /// List one party's orders, newest first, with optional status filter
    pub async fn list_for_party(
        &self,
        side: OrderSide,
        party_id: &str,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> RepoResult<(Vec<Order>, u64)> {
        let start = (page.max(1) - 1) * limit;
        let (where_clause, count_clause) = match status {
            Some(_) => (
                format!(
                    "SELECT * FROM order WHERE {} = $party AND status = $status ORDER BY created_at DESC LIMIT $limit START $start",
                    side.column()
                ),
                format!(
                    "SELECT count() AS total FROM order WHERE {} = $party AND status = $status GROUP ALL",
                    side.column()
                ),
            ),
            None => (
                format!(
                    "SELECT * FROM order WHERE {} = $party ORDER BY created_at DESC LIMIT $limit START $start",
                    side.column()
                ),
                format!(
                    "SELECT count() AS total FROM order WHERE {} = $party GROUP ALL",
                    side.column()
                ),
            ),
        };

        let mut query = self
            .base
            .db()
            .query(where_clause)
            .query(count_clause)
            .bind(("party", party_id.to_string()))
            .bind(("limit", limit as i64))
            .bind(("start", start as i64));
        if let Some(s) = status {
            query = query.bind(("status", s.as_str().to_string()));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;

        #[derive(serde::Deserialize)]
        struct Total {
            total: u64,
        }
        let totals: Vec<Total> = result.take(1)?;
        let total = totals.first().map(|t| t.total).unwrap_or(0);

        Ok((orders, total))
    }

    /// Orders whose payment reached a settled state, newest payment first
    pub async fn list_payment_history(
        &self,
        side: OrderSide,
        party_id: &str,
        status: Option<PaymentStatus>,
        page: u32,
        limit: u32,
    ) -> RepoResult<Vec<Order>> {
        let start = (page.max(1) - 1) * limit;
        let sql = match status {
            Some(_) => format!(
                "SELECT * FROM order WHERE {} = $party AND payment.status = $status ORDER BY payment.payment_date DESC LIMIT $limit START $start",
                side.column()
            ),
            None => format!(
                "SELECT * FROM order WHERE {} = $party AND payment.status IN ['completed', 'failed', 'refunded'] ORDER BY payment.payment_date DESC LIMIT $limit START $start",
                side.column()
            ),
        };

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("party", party_id.to_string()))
            .bind(("limit", limit as i64))
            .bind(("start", start as i64));
        if let Some(s) = status {
            let label = match s {
                PaymentStatus::Pending => "pending",
                PaymentStatus::Processing => "processing",
                PaymentStatus::Completed => "completed",
                PaymentStatus::Failed => "failed",
                PaymentStatus::Refunded => "refunded",
                PaymentStatus::Cancelled => "cancelled",
            };
            query = query.bind(("status", label.to_string()));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Per-status count and amount for one party
    pub async fn status_breakdown(
        &self,
        side: OrderSide,
        party_id: &str,
    ) -> RepoResult<Vec<StatusBreakdown>> {
        let sql = format!(
            "SELECT status, count() AS count, math::sum(total_amount) AS total_amount FROM order WHERE {} = $party GROUP BY status",
            side.column()
        );
        let breakdown: Vec<StatusBreakdown> = self
            .base
            .db()
            .query(sql)
            .bind(("party", party_id.to_string()))
            .await?
            .take(0)?;
        Ok(breakdown)
    }

    /// Revenue across completed payments for one party
    pub async fn completed_revenue(&self, side: OrderSide, party_id: &str) -> RepoResult<f64> {
        let sql = format!(
            "SELECT math::sum(total_amount) AS total FROM order WHERE {} = $party AND payment.status = 'completed' GROUP ALL",
            side.column()
        );

        #[derive(serde::Deserialize)]
        struct Total {
            total: f64,
        }
        let totals: Vec<Total> = self
            .base
            .db()
            .query(sql)
            .bind(("party", party_id.to_string()))
            .await?
            .take(0)?;
        Ok(totals.first().map(|t| t.total).unwrap_or(0.0))
    }
}
