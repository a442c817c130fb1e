//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册/登录接口
//! - [`buyers`] - 买家资料接口
//! - [`suppliers`] - 供应商资料接口
//! - [`products`] - 商品与价格历史接口
//! - [`orders`] - 订单工作流接口
//! - [`reservations`] - 预订工作流接口
//! - [`payments`] - 支付对账接口
//! - [`notifications`] - 通知接口
//! - [`ratings`] - 评分接口

pub mod auth;
pub mod health;

// Data model APIs
pub mod buyers;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod ratings;
pub mod reservations;
pub mod suppliers;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
