//! End-to-end workflow tests against a temporary embedded database.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use market_server::auth::{CurrentUser, Role};
use market_server::db::models::{
    Address, NewNotification, NotificationType, OrderCreate, OrderItemRequest, OrderStatus,
    OrderStatusUpdate, PartyRef, PaymentMethod, PaymentStatus, PriceEntry, Product, Rating,
    ReservationCreate, ReservationPaymentMethod, ReservationResponse, ReservationStatus, Supplier,
};
use market_server::db::repository::{
    NotificationRepository, ProductRepository, RatingRepository, RepoError, SupplierRepository,
};
use market_server::notify::NotificationDispatcher;
use market_server::orders::OrderWorkflow;
use market_server::payments::processor::MockProcessor;
use market_server::payments::{PaymentService, compute_signature};
use market_server::reservations::ReservationWorkflow;
use market_server::ErrorCode;

async fn test_db() -> (Surreal<Db>, TempDir) {
    let tmp = TempDir::new().unwrap();
    let db = market_server::db::connect(&tmp.path().join("market.db"))
        .await
        .unwrap();
    (db, tmp)
}

fn test_address() -> Address {
    Address {
        street: "12 Spice Lane".to_string(),
        city: "Colombo".to_string(),
        state: "Western".to_string(),
        zip_code: "00100".to_string(),
        country: "Sri Lanka".to_string(),
    }
}

/// Seed a supplier account and return (record, acting user, party ref)
async fn seed_supplier(db: &Surreal<Db>, name: &str, email: &str) -> (Supplier, CurrentUser, PartyRef) {
    let now = shared::util::now_millis();
    let supplier = SupplierRepository::new(db.clone())
        .create(Supplier {
            id: None,
            full_name: name.to_string(),
            contact_number: "0771234567".to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            rating: 0.0,
            rating_count: 0,
            is_active: true,
            is_verified: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let id = supplier.id.clone().unwrap();
    let user = CurrentUser {
        id: id.to_string(),
        role: Role::Supplier,
        email: email.to_string(),
    };
    let party = PartyRef::supplier(id);
    (supplier, user, party)
}

fn buyer_user(key: &str) -> (CurrentUser, PartyRef) {
    let id = surrealdb::RecordId::from_table_key("buyer", key);
    (
        CurrentUser {
            id: id.to_string(),
            role: Role::Buyer,
            email: format!("{key}@example.com"),
        },
        PartyRef::buyer(id),
    )
}

/// Seed a product owned by the given party
async fn seed_product(
    db: &Surreal<Db>,
    owner: &PartyRef,
    name: &str,
    price: f64,
    stock: i32,
) -> Product {
    let now = shared::util::now_millis();
    ProductRepository::new(db.clone())
        .create(Product {
            id: None,
            owner: owner.clone(),
            name: name.to_string(),
            shop_name: "Ceylon Co".to_string(),
            location: "Matale".to_string(),
            category: "Spices".to_string(),
            description: String::new(),
            price,
            stock,
            is_active: true,
            price_history: vec![PriceEntry {
                price,
                date: now,
                updated_by: Some(owner.id.clone()),
                reason: "Initial price".to_string(),
            }],
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap()
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn price_history_grows_by_one_entry() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "ceylon@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let product_id = product.id.clone().unwrap().to_string();

    let repo = ProductRepository::new(db.clone());
    let before = product.price_history.len();

    let updated = repo
        .add_price_history(&product_id, 2600.0, Some(supplier_ref.id.clone()), "Market move")
        .await
        .unwrap();

    assert_eq!(updated.price_history.len(), before + 1);
    assert_eq!(updated.price_history.last().unwrap().price, 2600.0);
    assert_eq!(updated.price, 2600.0);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn order_scenario_totals_stock_and_notification() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "ceylon@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = OrderWorkflow::new(db.clone());
    let order = workflow
        .create_order(
            &buyer,
            OrderCreate {
                items: vec![OrderItemRequest {
                    product_id: product.id.clone().unwrap().to_string(),
                    quantity: 10,
                }],
                shipping_address: test_address(),
                payment_method: PaymentMethod::CashOnDelivery,
                notes: None,
            },
        )
        .await
        .unwrap();

    // Total is the sum of subtotals at creation
    assert_eq!(order.total_amount, 25_000.0);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price_at_time, 2500.0);
    assert_eq!(order.items[0].subtotal, 25_000.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(order.status_history.len(), 1);

    // Stock decremented as a side effect
    let product_after = ProductRepository::new(db.clone())
        .find_by_id(&product.id.unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product_after.stock, 90);

    // Exactly one order_created notification for the supplier
    let (notifications, total) = NotificationRepository::new(db.clone())
        .list_for_recipient(&supplier_ref, false, None, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(notifications[0].kind, NotificationType::OrderCreated);
}

#[tokio::test]
async fn order_create_is_all_or_nothing() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_a) = seed_supplier(&db, "Ceylon Co", "a@example.com").await;
    let (_, _, supplier_b) = seed_supplier(&db, "Kandy Traders", "b@example.com").await;
    let product_a = seed_product(&db, &supplier_a, "Cinnamon", 2500.0, 100).await;
    let product_b = seed_product(&db, &supplier_b, "Pepper", 1800.0, 50).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = OrderWorkflow::new(db.clone());

    // Mixed-supplier order fails wholesale
    let err = workflow
        .create_order(
            &buyer,
            OrderCreate {
                items: vec![
                    OrderItemRequest {
                        product_id: product_a.id.clone().unwrap().to_string(),
                        quantity: 1,
                    },
                    OrderItemRequest {
                        product_id: product_b.id.clone().unwrap().to_string(),
                        quantity: 1,
                    },
                ],
                shipping_address: test_address(),
                payment_method: PaymentMethod::CashOnDelivery,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MixedSupplierOrder);

    // No stock was touched by the failed attempt
    let repo = ProductRepository::new(db.clone());
    assert_eq!(
        repo.find_by_id(&product_a.id.unwrap().to_string())
            .await
            .unwrap()
            .unwrap()
            .stock,
        100
    );
    assert_eq!(
        repo.find_by_id(&product_b.id.unwrap().to_string())
            .await
            .unwrap()
            .unwrap()
            .stock,
        50
    );

    // Oversubscribed quantity fails with the stock error
    let product_c = seed_product(&db, &supplier_a, "Cloves", 900.0, 3).await;
    let err = workflow
        .create_order(
            &buyer,
            OrderCreate {
                items: vec![OrderItemRequest {
                    product_id: product_c.id.unwrap().to_string(),
                    quantity: 5,
                }],
                shipping_address: test_address(),
                payment_method: PaymentMethod::CashOnDelivery,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
}

#[tokio::test]
async fn order_rejects_transition_outside_table() {
    let (db, _tmp) = test_db().await;
    let (_, supplier_user, supplier_ref) =
        seed_supplier(&db, "Ceylon Co", "ceylon@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = OrderWorkflow::new(db.clone());
    let order = workflow
        .create_order(
            &buyer,
            OrderCreate {
                items: vec![OrderItemRequest {
                    product_id: product.id.unwrap().to_string(),
                    quantity: 1,
                }],
                shipping_address: test_address(),
                payment_method: PaymentMethod::CashOnDelivery,
                notes: None,
            },
        )
        .await
        .unwrap();
    let order_id = order.id.clone().unwrap().to_string();

    // pending → shipped is not in the table
    let err = workflow
        .update_status(
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Shipped,
                notes: None,
                tracking_number: None,
            },
            &supplier_user,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

    // State unchanged, nothing appended
    let unchanged = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(unchanged.status, OrderStatus::Pending);
    assert_eq!(unchanged.status_history.len(), 1);

    // Walking the table step by step works and appends one entry per step
    for (status, expected_history) in [
        (OrderStatus::Confirmed, 2),
        (OrderStatus::Processing, 3),
        (OrderStatus::Shipped, 4),
        (OrderStatus::Delivered, 5),
    ] {
        let updated = workflow
            .update_status(
                &order_id,
                OrderStatusUpdate {
                    status,
                    notes: None,
                    tracking_number: None,
                },
                &supplier_user,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, status);
        assert_eq!(updated.status_history.len(), expected_history);
    }

    // Delivered stamps the actual delivery time and is terminal
    let delivered = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert!(delivered.actual_delivery.is_some());

    let err = workflow
        .update_status(
            &order_id,
            OrderStatusUpdate {
                status: OrderStatus::Cancelled,
                notes: None,
                tracking_number: None,
            },
            &supplier_user,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
}

#[tokio::test]
async fn order_transition_requires_participant() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "ceylon@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = OrderWorkflow::new(db.clone());
    let order = workflow
        .create_order(
            &buyer,
            OrderCreate {
                items: vec![OrderItemRequest {
                    product_id: product.id.unwrap().to_string(),
                    quantity: 1,
                }],
                shipping_address: test_address(),
                payment_method: PaymentMethod::CashOnDelivery,
                notes: None,
            },
        )
        .await
        .unwrap();

    let (stranger, _) = buyer_user("someone-else");
    let err = workflow
        .update_status(
            &order.id.unwrap().to_string(),
            OrderStatusUpdate {
                status: OrderStatus::Confirmed,
                notes: None,
                tracking_number: None,
            },
            &stranger,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn mark_all_as_read_is_idempotent() {
    let (db, _tmp) = test_db().await;
    let (_, recipient_ref) = buyer_user("shopa");

    let dispatcher = NotificationDispatcher::new(db.clone());
    for i in 0..3 {
        dispatcher
            .dispatch(NewNotification::new(
                recipient_ref.clone(),
                NotificationType::General,
                "Hello",
                format!("message {i}"),
            ))
            .await
            .unwrap();
    }

    let repo = NotificationRepository::new(db.clone());
    assert_eq!(repo.unread_count(&recipient_ref).await.unwrap(), 3);

    let first = repo.mark_all_as_read(&recipient_ref).await.unwrap();
    assert_eq!(first, 3);
    assert_eq!(repo.unread_count(&recipient_ref).await.unwrap(), 0);

    // Second run touches nothing and leaves identical state
    let second = repo.mark_all_as_read(&recipient_ref).await.unwrap();
    assert_eq!(second, 0);
    assert_eq!(repo.unread_count(&recipient_ref).await.unwrap(), 0);
}

// =============================================================================
// Reservations
// =============================================================================

fn reservation_request(shop_id: String, product_id: String) -> ReservationCreate {
    ReservationCreate {
        shop_id,
        product_id,
        name: "Nimal Perera".to_string(),
        mobile_no: "0779876543".to_string(),
        location: "Galle".to_string(),
        quantity: 25.0,
        quality_grade: None,
        delivery_date: None,
        payment_method: ReservationPaymentMethod::Cod,
        account_number: None,
        bank_name: None,
        branch_holder_name: None,
        delivery_address: None,
        notes: None,
    }
}

#[tokio::test]
async fn cod_reservation_clears_bank_details() {
    let (db, _tmp) = test_db().await;
    let (supplier, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let mut request = reservation_request(
        supplier.id.unwrap().to_string(),
        product.id.unwrap().to_string(),
    );
    // Bank details supplied despite cod
    request.account_number = Some("111222333".to_string());
    request.bank_name = Some("Peoples Bank".to_string());
    request.branch_holder_name = Some("N Perera".to_string());

    let reservation = workflow.create(&buyer, request).await.unwrap();

    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert!(reservation.reservation_number.starts_with("RES-"));
    // Persisted with bank details cleared to empty strings
    assert_eq!(reservation.bank_details.account_number, "");
    assert_eq!(reservation.bank_details.bank_name, "");
    assert_eq!(reservation.bank_details.branch_holder_name, "");
}

#[tokio::test]
async fn advance_reservation_requires_bank_details() {
    let (db, _tmp) = test_db().await;
    let (supplier, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let mut request = reservation_request(
        supplier.id.unwrap().to_string(),
        product.id.unwrap().to_string(),
    );
    request.payment_method = ReservationPaymentMethod::Advance;

    let err = workflow.create(&buyer, request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BankDetailsRequired);
}

#[tokio::test]
async fn unknown_shop_is_rejected() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let request = reservation_request(
        "supplier:does-not-exist".to_string(),
        product.id.unwrap().to_string(),
    );
    let err = workflow.create(&buyer, request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ShopNotFound);
}

#[tokio::test]
async fn conversion_is_one_way_one_time() {
    let (db, _tmp) = test_db().await;
    let (supplier, supplier_user, supplier_ref) =
        seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let reservation = workflow
        .create(
            &buyer,
            reservation_request(
                supplier.id.unwrap().to_string(),
                product.id.unwrap().to_string(),
            ),
        )
        .await
        .unwrap();
    let reservation_id = reservation.id.unwrap().to_string();

    // Conversion before acceptance is refused
    let err = workflow
        .convert_to_order(&reservation_id, &supplier_user)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationNotAccepted);

    // Accept with a counter-offer
    workflow
        .accept(
            &reservation_id,
            &supplier_user,
            ReservationResponse {
                message: Some("Can do 20kg at 2400".to_string()),
                proposed_price: Some(2400.0),
                proposed_quantity: Some(20.0),
                proposed_delivery_date: None,
            },
        )
        .await
        .unwrap();

    let order = workflow
        .convert_to_order(&reservation_id, &supplier_user)
        .await
        .unwrap();
    assert_eq!(order.total_amount, 2400.0 * 20.0);
    assert_eq!(order.items[0].quantity, 20);
    assert_eq!(order.items[0].price_at_time, 2400.0);

    let converted = workflow.get(&reservation_id).await.unwrap();
    assert_eq!(converted.status, ReservationStatus::ConvertedToOrder);
    assert_eq!(converted.converted_order, order.id);

    // Second conversion fails and creates no second order
    let err = workflow
        .convert_to_order(&reservation_id, &supplier_user)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationAlreadyConverted);

    let still = workflow.get(&reservation_id).await.unwrap();
    assert_eq!(still.converted_order, order.id);
}

#[tokio::test]
async fn accept_is_restricted_to_the_shop() {
    let (db, _tmp) = test_db().await;
    let (supplier, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (_, other_user, _) = seed_supplier(&db, "Kandy Traders", "k@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let reservation = workflow
        .create(
            &buyer,
            reservation_request(
                supplier.id.unwrap().to_string(),
                product.id.unwrap().to_string(),
            ),
        )
        .await
        .unwrap();

    let err = workflow
        .accept(
            &reservation.id.unwrap().to_string(),
            &other_user,
            ReservationResponse::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn expiry_sweep_only_touches_stale_pending() {
    let (db, _tmp) = test_db().await;
    let (supplier, supplier_user, supplier_ref) =
        seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let product = seed_product(&db, &supplier_ref, "Cinnamon", 2500.0, 100).await;
    let (buyer, _) = buyer_user("shopa");

    let workflow = ReservationWorkflow::new(db.clone());
    let supplier_id = supplier.id.unwrap().to_string();
    let product_id = product.id.unwrap().to_string();

    let stale = workflow
        .create(
            &buyer,
            reservation_request(supplier_id.clone(), product_id.clone()),
        )
        .await
        .unwrap();
    let fresh = workflow
        .create(
            &buyer,
            reservation_request(supplier_id.clone(), product_id.clone()),
        )
        .await
        .unwrap();
    let accepted = workflow
        .create(&buyer, reservation_request(supplier_id, product_id))
        .await
        .unwrap();
    workflow
        .accept(
            &accepted.id.clone().unwrap().to_string(),
            &supplier_user,
            ReservationResponse::default(),
        )
        .await
        .unwrap();

    // Backdate one pending reservation past its expiry
    let mut backdated = workflow
        .get(&stale.id.clone().unwrap().to_string())
        .await
        .unwrap();
    backdated.expires_at = shared::util::now_millis() - 1000;
    market_server::db::repository::ReservationRepository::new(db.clone())
        .save(backdated)
        .await
        .unwrap();

    let expired = workflow.expire_old().await.unwrap();
    assert_eq!(expired, 1);

    assert_eq!(
        workflow
            .get(&stale.id.unwrap().to_string())
            .await
            .unwrap()
            .status,
        ReservationStatus::Expired
    );
    assert_eq!(
        workflow
            .get(&fresh.id.unwrap().to_string())
            .await
            .unwrap()
            .status,
        ReservationStatus::Pending
    );
    assert_eq!(
        workflow
            .get(&accepted.id.unwrap().to_string())
            .await
            .unwrap()
            .status,
        ReservationStatus::Accepted
    );
}

// =============================================================================
// Payments
// =============================================================================

async fn seed_pending_order(
    db: &Surreal<Db>,
    buyer: &CurrentUser,
    supplier_ref: &PartyRef,
) -> market_server::db::models::Order {
    let product = seed_product(db, supplier_ref, "Cinnamon", 2500.0, 100).await;
    OrderWorkflow::new(db.clone())
        .create_order(
            buyer,
            OrderCreate {
                items: vec![OrderItemRequest {
                    product_id: product.id.unwrap().to_string(),
                    quantity: 10,
                }],
                shipping_address: test_address(),
                payment_method: PaymentMethod::Stripe,
                notes: None,
            },
        )
        .await
        .unwrap()
}

fn payment_service(db: &Surreal<Db>, secret: Option<&str>) -> PaymentService {
    PaymentService::new(
        db.clone(),
        std::sync::Arc::new(MockProcessor::new()),
        secret.map(|s| s.to_string()),
    )
}

#[tokio::test]
async fn demo_payment_confirm_advances_pending_order() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (buyer, _) = buyer_user("shopa");
    let order = seed_pending_order(&db, &buyer, &supplier_ref).await;
    let order_id = order.id.clone().unwrap().to_string();

    let service = payment_service(&db, None);
    let intent = service
        .create_intent(&order_id, None, &buyer)
        .await
        .unwrap();
    assert!(intent.id.starts_with("pi_demo_"));

    let workflow = OrderWorkflow::new(db.clone());
    let processing = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(processing.payment.status, PaymentStatus::Processing);

    let confirmation = service.confirm(&intent.id).await.unwrap();
    assert_eq!(confirmation.status, "succeeded");
    assert_eq!(confirmation.amount, 25_000.0);

    let confirmed = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(confirmed.payment.status, PaymentStatus::Completed);
    assert_eq!(confirmed.payment.paid_amount, Some(25_000.0));
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    // Payment-driven confirmation appended a history entry
    assert_eq!(confirmed.status_history.len(), 2);

    // Supplier was notified of the payment
    let (notifications, _) = NotificationRepository::new(db.clone())
        .list_for_recipient(&supplier_ref, false, Some(NotificationType::PaymentSuccessful), 1, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    // A second intent on a completed payment is refused
    let err = service
        .create_intent(&order_id, None, &buyer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
}

#[tokio::test]
async fn refund_requires_supplier_and_completed_payment() {
    let (db, _tmp) = test_db().await;
    let (_, supplier_user, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (buyer, buyer_ref) = buyer_user("shopa");
    let order = seed_pending_order(&db, &buyer, &supplier_ref).await;
    let order_id = order.id.clone().unwrap().to_string();

    let service = payment_service(&db, None);

    // Refund before completion is refused
    let err = service
        .refund(&order_id, None, None, &supplier_user)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentNotCompleted);

    let intent = service
        .create_intent(&order_id, None, &buyer)
        .await
        .unwrap();
    service.confirm(&intent.id).await.unwrap();

    // Buyer cannot refund
    let err = service
        .refund(&order_id, None, None, &buyer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let refund = service
        .refund(&order_id, None, Some("damaged goods".to_string()), &supplier_user)
        .await
        .unwrap();
    assert_eq!(refund.status, "succeeded");

    let workflow = OrderWorkflow::new(db.clone());
    let refunded = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(refunded.payment.status, PaymentStatus::Refunded);
    assert_eq!(refunded.status, OrderStatus::Cancelled);

    // Buyer was told about the refund
    let (notifications, _) = NotificationRepository::new(db.clone())
        .list_for_recipient(&buyer_ref, false, Some(NotificationType::PaymentRefunded), 1, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn webhook_fails_closed_and_dedups_event_ids() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (buyer, _) = buyer_user("shopa");
    let order = seed_pending_order(&db, &buyer, &supplier_ref).await;
    let order_id = order.id.clone().unwrap().to_string();

    let secret = "whsec_test_secret";
    let service = payment_service(&db, Some(secret));
    let intent = service
        .create_intent(&order_id, None, &buyer)
        .await
        .unwrap();

    let body = serde_json::json!({
        "id": "evt_001",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent.id, "amount": 2_500_000 } }
    })
    .to_string();
    let body = body.as_bytes();

    // Missing signature → rejected before any state change
    let err = service.handle_webhook(body, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::WebhookSignatureInvalid);

    // Bad signature → rejected
    let err = service
        .handle_webhook(body, Some("deadbeef"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::WebhookSignatureInvalid);

    let workflow = OrderWorkflow::new(db.clone());
    let untouched = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(untouched.payment.status, PaymentStatus::Processing);

    // Valid signature settles the payment
    let signature = compute_signature(secret, body);
    let ack = service
        .handle_webhook(body, Some(&signature))
        .await
        .unwrap();
    assert!(ack.received);
    assert!(!ack.duplicate);

    let settled = workflow.get_order(&order_id, &buyer).await.unwrap();
    assert_eq!(settled.payment.status, PaymentStatus::Completed);
    assert_eq!(settled.payment.paid_amount, Some(25_000.0));
    assert_eq!(settled.status, OrderStatus::Confirmed);

    // Redelivery of the same event id is acknowledged but skipped
    let ack = service
        .handle_webhook(body, Some(&signature))
        .await
        .unwrap();
    assert!(ack.duplicate);

    // Exactly one payment notification despite the redelivery
    let (notifications, _) = NotificationRepository::new(db.clone())
        .list_for_recipient(&supplier_ref, false, Some(NotificationType::PaymentSuccessful), 1, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
}

// =============================================================================
// Ratings
// =============================================================================

#[tokio::test]
async fn duplicate_rating_conflicts() {
    let (db, _tmp) = test_db().await;
    let (supplier, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (_, buyer_ref) = buyer_user("shopa");

    let repo = RatingRepository::new(db.clone());
    let make_rating = |score: u8| Rating {
        id: None,
        unique_key: Rating::compose_key(&buyer_ref, &supplier_ref, None),
        rater: buyer_ref.clone(),
        ratee: supplier_ref.clone(),
        rating: score,
        comment: String::new(),
        related_order: None,
        categories: None,
        verified: true,
        created_at: shared::util::now_millis(),
    };

    repo.create(make_rating(5)).await.unwrap();

    // Same rater/ratee pair again → unique index rejects it
    let err = repo.create(make_rating(3)).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    let summary = repo.summary_for_ratee(&supplier_ref).await.unwrap();
    assert_eq!(summary.total_ratings, 1);
    assert_eq!(summary.average_rating, 5.0);
    assert_eq!(summary.rating_distribution, [0, 0, 0, 0, 1]);

    // Aggregate folding on the supplier record
    let suppliers = SupplierRepository::new(db.clone());
    let updated = suppliers
        .apply_rating(&supplier.id.unwrap().to_string(), 5)
        .await
        .unwrap();
    assert_eq!(updated.rating_count, 1);
    assert_eq!(updated.rating, 5.0);
}

#[tokio::test]
async fn party_kind_distinguishes_ratings() {
    let (db, _tmp) = test_db().await;
    let (_, _, supplier_ref) = seed_supplier(&db, "Ceylon Co", "c@example.com").await;
    let (_, buyer_ref) = buyer_user("shopa");

    // Same key both directions are distinct pairs
    let repo = RatingRepository::new(db.clone());
    repo.create(Rating {
        id: None,
        unique_key: Rating::compose_key(&buyer_ref, &supplier_ref, None),
        rater: buyer_ref.clone(),
        ratee: supplier_ref.clone(),
        rating: 4,
        comment: String::new(),
        related_order: None,
        categories: None,
        verified: true,
        created_at: shared::util::now_millis(),
    })
    .await
    .unwrap();

    repo.create(Rating {
        id: None,
        unique_key: Rating::compose_key(&supplier_ref, &buyer_ref, None),
        rater: supplier_ref.clone(),
        ratee: buyer_ref.clone(),
        rating: 5,
        comment: "prompt payment".to_string(),
        related_order: None,
        categories: None,
        verified: true,
        created_at: shared::util::now_millis(),
    })
    .await
    .unwrap();

    assert_eq!(
        repo.summary_for_ratee(&supplier_ref)
            .await
            .unwrap()
            .total_ratings,
        1
    );
    assert_eq!(
        repo.summary_for_ratee(&buyer_ref)
            .await
            .unwrap()
            .total_ratings,
        1
    );
}
