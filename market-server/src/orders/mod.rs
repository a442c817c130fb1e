//! 订单工作流
//!
//! 校验库存、计算总额、执行固定状态转移表、写入历史、分发通知。
//!
//! # 状态机
//!
//! ```text
//! pending    → confirmed | rejected[T] | cancelled[T]
//! confirmed  → processing | cancelled[T]
//! processing → shipped | cancelled[T]
//! shipped    → delivered[T]
//! ```
//!
//! 转移表按字面执行：同状态转移也会被拒绝。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{CurrentUser, Role};
use crate::db::models::{
    NewNotification, NotificationType, Order, OrderCreate, OrderItem, OrderStatistics,
    OrderStatus, OrderStatusUpdate, PartyRef, PaymentInfo, StatusEntry,
};
use crate::db::repository::{OrderRepository, ProductRepository, order::OrderSide};
use crate::notify::NotificationDispatcher;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Allowed successor states; terminal states return an empty slice
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Pending => &[
            OrderStatus::Confirmed,
            OrderStatus::Rejected,
            OrderStatus::Cancelled,
        ],
        OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
        OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
        OrderStatus::Shipped => &[OrderStatus::Delivered],
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Rejected => &[],
    }
}

/// Whether `from → to` is in the transition table
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Notification type announcing a transition to the counterparty
fn transition_notification(status: OrderStatus) -> NotificationType {
    match status {
        OrderStatus::Pending => NotificationType::OrderCreated,
        OrderStatus::Confirmed => NotificationType::OrderConfirmed,
        OrderStatus::Processing => NotificationType::OrderProcessing,
        OrderStatus::Shipped => NotificationType::OrderShipped,
        OrderStatus::Delivered => NotificationType::OrderDelivered,
        OrderStatus::Cancelled => NotificationType::OrderCancelled,
        OrderStatus::Rejected => NotificationType::OrderRejected,
    }
}

/// Order workflow service
#[derive(Clone)]
pub struct OrderWorkflow {
    orders: OrderRepository,
    products: ProductRepository,
    notifier: NotificationDispatcher,
}

impl OrderWorkflow {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            notifier: NotificationDispatcher::new(db),
        }
    }

    /// Create an order from a checkout request
    ///
    /// 写入前全量校验：商品存在、库存充足、单一供应商。
    /// 任何一项失败整单失败，不留半成品。
    pub async fn create_order(&self, actor: &CurrentUser, req: OrderCreate) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let buyer = PartyRef::from_user(actor)?;

        // Validate every line before any write
        let mut supplier: Option<PartyRef> = None;
        let mut items: Vec<OrderItem> = Vec::with_capacity(req.items.len());
        let mut total_amount = 0.0;

        for line in &req.items {
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ProductNotFound,
                        format!("Product {} not found", line.product_id),
                    )
                })?;

            if product.stock < line.quantity {
                return Err(AppError::with_message(
                    ErrorCode::InsufficientStock,
                    format!(
                        "Insufficient stock for {}. Available: {}, Requested: {}",
                        product.name, product.stock, line.quantity
                    ),
                ));
            }

            // 第一个商品的卖方确立整单供应商
            match &supplier {
                None => supplier = Some(product.owner.clone()),
                Some(s) if s.same_party(&product.owner) => {}
                Some(_) => return Err(AppError::new(ErrorCode::MixedSupplierOrder)),
            }

            let product_id = product
                .id
                .clone()
                .ok_or_else(|| AppError::internal("stored product has no id"))?;
            let subtotal = product.price * line.quantity as f64;
            total_amount += subtotal;

            items.push(OrderItem {
                product: product_id,
                quantity: line.quantity,
                price_at_time: product.price,
                subtotal,
            });
        }

        let supplier = supplier.ok_or_else(|| AppError::new(ErrorCode::OrderEmpty))?;

        let now = shared::util::now_millis();
        let order = Order {
            id: None,
            order_number: shared::util::document_number("ORD"),
            buyer: buyer.id.clone(),
            supplier: supplier.id.clone(),
            items,
            total_amount,
            status: OrderStatus::Pending,
            payment: PaymentInfo::new(req.payment_method),
            shipping_address: req.shipping_address,
            tracking_number: None,
            estimated_delivery: None,
            actual_delivery: None,
            notes: req.notes,
            buyer_notes: None,
            supplier_notes: None,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                actor: Some(buyer.clone()),
                notes: Some("Order created".to_string()),
            }],
            created_at: now,
            updated_at: now,
        };

        let order = self.orders.create(order).await.map_err(AppError::from)?;

        // Decrement stock per ordered line
        for item in &order.items {
            if let Err(e) = self.products.adjust_stock(&item.product, -item.quantity).await {
                tracing::warn!(product = %item.product, error = %e, "Stock decrement failed");
            }
        }

        // Notify the supplier of the new order
        let order_id = order.id.clone();
        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    supplier,
                    NotificationType::OrderCreated,
                    "New Order Received",
                    format!(
                        "New order {} for {:.2}",
                        order.order_number, order.total_amount
                    ),
                )
                .from(buyer)
                .about_order(order_id.unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("order", "unknown")
                })),
            )
            .await;

        tracing::info!(
            order_number = %order.order_number,
            total = order.total_amount,
            "Order created"
        );

        Ok(order)
    }

    /// Transition an order through the fixed table
    ///
    /// 只有订单的买方或供应商可以转移；表中查不到的转移一律拒绝。
    /// 成功时追加一条历史并向对方分发一条通知。
    pub async fn update_status(
        &self,
        order_id: &str,
        req: OrderStatusUpdate,
        actor: &CurrentUser,
    ) -> AppResult<Order> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let actor_ref = PartyRef::from_user(actor)?;
        let is_buyer = actor.role == Role::Buyer && order.buyer == actor_ref.id;
        let is_supplier = actor.role == Role::Supplier && order.supplier == actor_ref.id;
        if !is_buyer && !is_supplier {
            return Err(AppError::forbidden("Access denied"));
        }

        if !can_transition(order.status, req.status) {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!(
                    "Cannot transition from {} to {}",
                    order.status.as_str(),
                    req.status.as_str()
                ),
            ));
        }

        let now = shared::util::now_millis();
        order.status = req.status;
        if let Some(notes) = &req.notes {
            if is_buyer {
                order.buyer_notes = Some(notes.clone());
            } else {
                order.supplier_notes = Some(notes.clone());
            }
        }
        if let Some(tracking) = req.tracking_number {
            order.tracking_number = Some(tracking);
        }
        if req.status == OrderStatus::Delivered {
            order.actual_delivery = Some(now);
        }
        order.status_history.push(StatusEntry {
            status: req.status,
            timestamp: now,
            actor: Some(actor_ref.clone()),
            notes: req.notes,
        });
        order.updated_at = now;

        let order = self.orders.save(order).await.map_err(AppError::from)?;

        // Exactly one notification to the counterparty
        let recipient = if is_buyer {
            PartyRef::supplier(order.supplier.clone())
        } else {
            PartyRef::buyer(order.buyer.clone())
        };
        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    recipient,
                    transition_notification(req.status),
                    "Order Status Updated",
                    format!(
                        "Order {} status changed to {}",
                        order.order_number,
                        req.status.as_str()
                    ),
                )
                .from(actor_ref)
                .about_order(order.id.clone().unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("order", "unknown")
                })),
            )
            .await;

        Ok(order)
    }

    /// Fetch an order, restricted to its two participants
    pub async fn get_order(&self, order_id: &str, actor: &CurrentUser) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let actor_ref = PartyRef::from_user(actor)?;
        let has_access = (actor.role == Role::Buyer && order.buyer == actor_ref.id)
            || (actor.role == Role::Supplier && order.supplier == actor_ref.id);
        if !has_access {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(order)
    }

    /// Side of the order table this user's listings live on
    pub fn side_for(actor: &CurrentUser) -> OrderSide {
        match actor.role {
            Role::Supplier => OrderSide::Supplier,
            _ => OrderSide::Buyer,
        }
    }

    /// Per-party statistics: status breakdown + completed-payment revenue
    pub async fn statistics(&self, actor: &CurrentUser) -> AppResult<OrderStatistics> {
        let actor_ref = PartyRef::from_user(actor)?;
        let side = Self::side_for(actor);
        let party_id = actor_ref.id_string();

        let breakdown = self
            .orders
            .status_breakdown(side, &party_id)
            .await
            .map_err(AppError::from)?;
        let total_orders = breakdown.iter().map(|b| b.count).sum();
        let total_revenue = self
            .orders
            .completed_revenue(side, &party_id)
            .await
            .map_err(AppError::from)?;

        Ok(OrderStatistics {
            total_orders,
            total_revenue,
            status_breakdown: breakdown,
        })
    }

    pub fn repo(&self) -> &OrderRepository {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Rejected,
    ];

    #[test]
    fn test_transition_table_literal() {
        assert!(can_transition(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(can_transition(OrderStatus::Pending, OrderStatus::Rejected));
        assert!(can_transition(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(can_transition(
            OrderStatus::Confirmed,
            OrderStatus::Processing
        ));
        assert!(can_transition(
            OrderStatus::Processing,
            OrderStatus::Shipped
        ));
        assert!(can_transition(OrderStatus::Shipped, OrderStatus::Delivered));

        // No skipping
        assert!(!can_transition(OrderStatus::Pending, OrderStatus::Shipped));
        assert!(!can_transition(
            OrderStatus::Pending,
            OrderStatus::Delivered
        ));
        assert!(!can_transition(
            OrderStatus::Confirmed,
            OrderStatus::Shipped
        ));

        // Shipped can no longer be cancelled
        assert!(!can_transition(
            OrderStatus::Shipped,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        assert!(allowed_transitions(OrderStatus::Delivered).is_empty());
        assert!(allowed_transitions(OrderStatus::Cancelled).is_empty());
        assert!(allowed_transitions(OrderStatus::Rejected).is_empty());
    }

    #[test]
    fn test_same_state_is_rejected() {
        // The table is consulted literally: no same-state no-ops
        for state in ALL_STATES {
            assert!(!can_transition(state, state), "{:?}", state);
        }
    }

    #[test]
    fn test_table_is_total() {
        // Every (from, to) pair has a defined verdict
        for from in ALL_STATES {
            for to in ALL_STATES {
                let verdict = can_transition(from, to);
                // Deterministic: asking twice gives the same answer
                assert_eq!(verdict, can_transition(from, to));
            }
        }
    }

    #[test]
    fn test_transition_notification_types() {
        assert_eq!(
            transition_notification(OrderStatus::Shipped),
            NotificationType::OrderShipped
        );
        assert_eq!(
            transition_notification(OrderStatus::Cancelled),
            NotificationType::OrderCancelled
        );
    }
}
