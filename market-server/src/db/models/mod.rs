//! Database Models
//!
//! 每个实体一个规范形态（canonical shape）。

pub mod serde_helpers;

pub mod buyer;
pub mod notification;
pub mod order;
pub mod party;
pub mod product;
pub mod rating;
pub mod reservation;
pub mod supplier;
pub mod webhook_event;

// Re-exports
pub use buyer::{Buyer, BuyerProfile, BuyerRegister, BuyerUpdate};
pub use notification::{
    NewNotification, Notification, NotificationListQuery, NotificationStatistics,
    NotificationType, NotificationTypeCount, Priority,
};
pub use order::{
    Address, Order, OrderCreate, OrderItem, OrderItemRequest, OrderListQuery, OrderStatistics,
    OrderStatus, OrderStatusUpdate, PaymentInfo, PaymentMethod, PaymentStatus, StatusBreakdown,
    StatusEntry,
};
pub use party::{PartyKind, PartyRef};
pub use product::{
    BulkPriceResult, BulkPriceUpdate, PriceEntry, Product, ProductCreate, ProductUpdate,
};
pub use rating::{CategoryScores, Rating, RatingCreate, RatingSummary};
pub use reservation::{
    BankDetails, Reservation, ReservationCreate, ReservationPaymentMethod, ReservationResponse,
    ReservationStatistics, ReservationStatus, ReservationStatusCount,
};
pub use supplier::{Supplier, SupplierProfile, SupplierRegister, SupplierUpdate};
pub use webhook_event::WebhookEvent;
