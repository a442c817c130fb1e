//! 预订工作流
//!
//! 预订是对某商品未来数量的请求：pending 起步，店铺接受/拒绝，
//! 买方可撤回，逾期由批量清扫置为 expired，接受后可一次性转为订单。
//!
//! 店铺身份可能是 Supplier，也可能是作为卖方的 Buyer 店铺，
//! 先查 supplier 再查 buyer。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{
    Address, BankDetails, NewNotification, NotificationType, Order, OrderItem, OrderStatus,
    PartyRef, PaymentInfo, PaymentMethod, Priority, Reservation, ReservationCreate,
    ReservationPaymentMethod, ReservationResponse, ReservationStatistics, ReservationStatus,
    StatusEntry,
};
use crate::db::repository::{
    BuyerRepository, OrderRepository, ProductRepository, ReservationRepository,
    SupplierRepository,
};
use crate::notify::NotificationDispatcher;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Default reservation lifetime: 7 days
const EXPIRY_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Reservation workflow service
#[derive(Clone)]
pub struct ReservationWorkflow {
    reservations: ReservationRepository,
    products: ProductRepository,
    orders: OrderRepository,
    buyers: BuyerRepository,
    suppliers: SupplierRepository,
    notifier: NotificationDispatcher,
}

impl ReservationWorkflow {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            buyers: BuyerRepository::new(db.clone()),
            suppliers: SupplierRepository::new(db.clone()),
            notifier: NotificationDispatcher::new(db),
        }
    }

    /// Resolve a shop id against suppliers first, then buyer businesses
    async fn resolve_shop(&self, shop_id: &str) -> AppResult<PartyRef> {
        if let Some(supplier) = self
            .suppliers
            .find_by_id(shop_id)
            .await
            .map_err(AppError::from)?
        {
            let id = supplier
                .id
                .ok_or_else(|| AppError::internal("stored supplier has no id"))?;
            return Ok(PartyRef::supplier(id));
        }

        if let Some(buyer) = self
            .buyers
            .find_by_id(shop_id)
            .await
            .map_err(AppError::from)?
        {
            let id = buyer
                .id
                .ok_or_else(|| AppError::internal("stored buyer has no id"))?;
            return Ok(PartyRef::buyer(id));
        }

        Err(AppError::new(ErrorCode::ShopNotFound))
    }

    /// Create a reservation
    ///
    /// advance 付款必须带银行信息；cod 时提交的银行信息一律清空。
    pub async fn create(
        &self,
        actor: &CurrentUser,
        req: ReservationCreate,
    ) -> AppResult<Reservation> {
        let shop = self.resolve_shop(&req.shop_id).await?;
        let requester = PartyRef::from_user(actor).ok();

        let product = self
            .products
            .find_by_id(&req.product_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        let product_id = product
            .id
            .clone()
            .ok_or_else(|| AppError::internal("stored product has no id"))?;

        let bank_details = match req.payment_method {
            ReservationPaymentMethod::Advance => {
                let details = BankDetails {
                    account_number: req.account_number.unwrap_or_default().trim().to_string(),
                    bank_name: req.bank_name.unwrap_or_default().trim().to_string(),
                    branch_holder_name: req
                        .branch_holder_name
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                };
                if details.is_empty() {
                    return Err(AppError::new(ErrorCode::BankDetailsRequired));
                }
                details
            }
            // cod: whatever was supplied is cleared to empty strings
            ReservationPaymentMethod::Cod => BankDetails::cleared(),
        };

        let now = shared::util::now_millis();
        let reservation = Reservation {
            id: None,
            reservation_number: shared::util::document_number("RES"),
            shop: shop.clone(),
            requester,
            product: product_id.clone(),
            product_name: product.name.clone(),
            name: req.name.trim().to_string(),
            mobile_no: req.mobile_no.trim().to_string(),
            location: req.location.trim().to_string(),
            quantity: req.quantity,
            quality_grade: req.quality_grade.unwrap_or_else(|| "Standard".to_string()),
            delivery_date: req.delivery_date,
            payment_method: req.payment_method,
            bank_details,
            delivery_address: req.delivery_address,
            status: ReservationStatus::Pending,
            expires_at: now + EXPIRY_MILLIS,
            responded_at: None,
            response_notes: None,
            proposed_price: None,
            proposed_quantity: None,
            proposed_delivery_date: None,
            converted_order: None,
            converted_at: None,
            notes: req.notes.unwrap_or_default().trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        let reservation = self
            .reservations
            .create(reservation)
            .await
            .map_err(AppError::from)?;

        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    shop,
                    NotificationType::ReservationReceived,
                    "New Reservation Request",
                    format!(
                        "Reservation {} for {} x{}",
                        reservation.reservation_number, reservation.product_name,
                        reservation.quantity
                    ),
                )
                .about_reservation(reservation.id.clone().unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("reservation", "unknown")
                })),
            )
            .await;

        tracing::info!(
            reservation_number = %reservation.reservation_number,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Load a reservation and check the actor is its shop party
    async fn load_for_shop(
        &self,
        reservation_id: &str,
        actor: &CurrentUser,
    ) -> AppResult<Reservation> {
        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))?;

        let actor_ref = PartyRef::from_user(actor)?;
        if !reservation.shop.same_party(&actor_ref) {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(reservation)
    }

    /// Accept a pending reservation, with an optional counter-offer
    pub async fn accept(
        &self,
        reservation_id: &str,
        actor: &CurrentUser,
        response: ReservationResponse,
    ) -> AppResult<Reservation> {
        let mut reservation = self.load_for_shop(reservation_id, actor).await?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::new(ErrorCode::ReservationNotPending));
        }

        let now = shared::util::now_millis();
        reservation.status = ReservationStatus::Accepted;
        reservation.responded_at = Some(now);
        reservation.response_notes = response.message;
        reservation.proposed_price = response.proposed_price;
        reservation.proposed_quantity = response.proposed_quantity;
        reservation.proposed_delivery_date = response.proposed_delivery_date;
        reservation.updated_at = now;

        let reservation = self
            .reservations
            .save(reservation)
            .await
            .map_err(AppError::from)?;

        self.notify_requester(
            &reservation,
            NotificationType::ReservationAccepted,
            "Reservation Accepted",
            format!(
                "Your reservation {} has been accepted by the shop.",
                reservation.reservation_number
            ),
        )
        .await;

        Ok(reservation)
    }

    /// Reject a pending reservation
    pub async fn reject(
        &self,
        reservation_id: &str,
        actor: &CurrentUser,
        response: ReservationResponse,
    ) -> AppResult<Reservation> {
        let mut reservation = self.load_for_shop(reservation_id, actor).await?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::new(ErrorCode::ReservationNotPending));
        }

        let now = shared::util::now_millis();
        reservation.status = ReservationStatus::Rejected;
        reservation.responded_at = Some(now);
        reservation.response_notes = response.message;
        reservation.updated_at = now;

        let reservation = self
            .reservations
            .save(reservation)
            .await
            .map_err(AppError::from)?;

        self.notify_requester(
            &reservation,
            NotificationType::ReservationRejected,
            "Reservation Rejected",
            format!(
                "Your reservation {} has been rejected by the shop.",
                reservation.reservation_number
            ),
        )
        .await;

        Ok(reservation)
    }

    /// Buyer-side withdrawal of a pending reservation
    pub async fn cancel(&self, reservation_id: &str) -> AppResult<Reservation> {
        let mut reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::new(ErrorCode::ReservationNotPending));
        }

        let now = shared::util::now_millis();
        reservation.status = ReservationStatus::Cancelled;
        reservation.responded_at = Some(now);
        reservation.updated_at = now;

        self.reservations
            .save(reservation)
            .await
            .map_err(AppError::from)
    }

    /// Materialize an accepted reservation into an order — one way, one time
    ///
    /// 只允许从 accepted 出发；已转换的预订返回冲突错误，不会产生第二张订单。
    pub async fn convert_to_order(
        &self,
        reservation_id: &str,
        actor: &CurrentUser,
    ) -> AppResult<Order> {
        let mut reservation = self.load_for_shop(reservation_id, actor).await?;

        match reservation.status {
            ReservationStatus::Accepted => {}
            ReservationStatus::ConvertedToOrder => {
                return Err(AppError::new(ErrorCode::ReservationAlreadyConverted));
            }
            _ => return Err(AppError::new(ErrorCode::ReservationNotAccepted)),
        }

        let product = self
            .products
            .find_by_id(&reservation.product.to_string())
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        // Counter-offer terms win over the requested ones
        let quantity = reservation
            .proposed_quantity
            .unwrap_or(reservation.quantity)
            .round() as i32;
        let quantity = quantity.max(1);
        let unit_price = reservation.proposed_price.unwrap_or(product.price);
        let subtotal = unit_price * quantity as f64;

        let shipping_address = reservation.delivery_address.clone().unwrap_or(Address {
            street: reservation.location.clone(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "Sri Lanka".to_string(),
        });

        let buyer_party = reservation.requester.clone().ok_or_else(|| {
            AppError::validation("Reservation has no requester account to bill the order to")
        })?;
        let now = shared::util::now_millis();
        let order = Order {
            id: None,
            order_number: shared::util::document_number("ORD"),
            buyer: buyer_party.id.clone(),
            supplier: reservation.shop.id.clone(),
            items: vec![OrderItem {
                product: reservation.product.clone(),
                quantity,
                price_at_time: unit_price,
                subtotal,
            }],
            total_amount: subtotal,
            status: OrderStatus::Pending,
            payment: PaymentInfo::new(match reservation.payment_method {
                ReservationPaymentMethod::Advance => PaymentMethod::BankTransfer,
                ReservationPaymentMethod::Cod => PaymentMethod::CashOnDelivery,
            }),
            shipping_address,
            tracking_number: None,
            estimated_delivery: reservation
                .proposed_delivery_date
                .or(reservation.delivery_date),
            actual_delivery: None,
            notes: Some(format!(
                "Converted from reservation {}",
                reservation.reservation_number
            )),
            buyer_notes: None,
            supplier_notes: None,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                actor: Some(reservation.shop.clone()),
                notes: Some("Created from reservation".to_string()),
            }],
            created_at: now,
            updated_at: now,
        };

        let order = self.orders.create(order).await.map_err(AppError::from)?;

        reservation.status = ReservationStatus::ConvertedToOrder;
        reservation.converted_order = order.id.clone();
        reservation.converted_at = Some(now);
        reservation.updated_at = now;
        let reservation = self
            .reservations
            .save(reservation)
            .await
            .map_err(AppError::from)?;

        self.notify_requester(
            &reservation,
            NotificationType::OrderCreated,
            "Order Created",
            format!(
                "Your reservation {} has been converted to order {}.",
                reservation.reservation_number, order.order_number
            ),
        )
        .await;

        tracing::info!(
            reservation_number = %reservation.reservation_number,
            order_number = %order.order_number,
            "Reservation converted to order"
        );

        Ok(order)
    }

    /// Bulk sweep: pending + past expiry → expired
    ///
    /// 由外部调度器周期性调用；本服务不自带定时器。
    pub async fn expire_old(&self) -> AppResult<usize> {
        let count = self
            .reservations
            .expire_old(shared::util::now_millis())
            .await
            .map_err(AppError::from)?;
        if count > 0 {
            tracing::info!(count, "Expired stale reservations");
        }
        Ok(count)
    }

    pub async fn get(&self, reservation_id: &str) -> AppResult<Reservation> {
        self.reservations
            .find_by_id(reservation_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))
    }

    pub async fn list_for_shop(&self, actor: &CurrentUser) -> AppResult<Vec<Reservation>> {
        let actor_ref = PartyRef::from_user(actor)?;
        self.reservations
            .list_for_shop(&actor_ref.id_string())
            .await
            .map_err(AppError::from)
    }

    pub async fn list_by_mobile(&self, mobile_no: &str) -> AppResult<Vec<Reservation>> {
        self.reservations
            .list_by_mobile(mobile_no)
            .await
            .map_err(AppError::from)
    }

    pub async fn statistics(&self, actor: &CurrentUser) -> AppResult<ReservationStatistics> {
        let actor_ref = PartyRef::from_user(actor)?;
        let by_status = self
            .reservations
            .status_counts(&actor_ref.id_string())
            .await
            .map_err(AppError::from)?;
        let total = by_status.iter().map(|c| c.count).sum();
        Ok(ReservationStatistics { total, by_status })
    }

    async fn notify_requester(
        &self,
        reservation: &Reservation,
        kind: NotificationType,
        title: &str,
        message: String,
    ) {
        // 匿名（无账号）请求方无法收站内通知，只能靠店铺线下联系
        let Some(recipient) = reservation.requester.clone() else {
            tracing::debug!(
                reservation_number = %reservation.reservation_number,
                "Reservation has no requester account, skipping notification"
            );
            return;
        };
        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(recipient, kind, title, message)
                    .from(reservation.shop.clone())
                    .with_priority(Priority::Medium)
                    .about_reservation(reservation.id.clone().unwrap_or_else(|| {
                        surrealdb::RecordId::from_table_key("reservation", "unknown")
                    })),
            )
            .await;
    }
}
