//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::AppError;
use crate::auth::{CurrentUser, Role};
use crate::core::ServerState;
use crate::db::models::{
    BulkPriceResult, BulkPriceUpdate, PartyRef, PriceEntry, Product, ProductCreate, ProductUpdate,
};
use crate::db::repository::{BuyerRepository, ProductRepository, SupplierRepository};
use crate::utils::{AppResult, ErrorCode};

/// 检查商品归属当前用户
fn check_ownership(product: &Product, user: &CurrentUser) -> AppResult<()> {
    let actor = PartyRef::from_user(user)?;
    if !product.owner.same_party(&actor) && !user.is_admin() {
        return Err(AppError::forbidden("Not the product owner"));
    }
    Ok(())
}

/// GET /api/products - 获取所有在售商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await.map_err(AppError::from)?;
    Ok(Json(products))
}

/// GET /api/products/user/:user_id - 按所有者获取商品
pub async fn list_by_owner(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo
        .find_by_owner(&user_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品 (价格历史新者在前)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.get_db());
    let mut product = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    // Newest-first for the reporting surface
    product.price_history.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(product))
}

/// POST /api/products - 创建商品
///
/// 所有者取自当前用户；店铺名/位置缺省回填账号资料。
/// 初始价格作为第一条价格历史入账。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let owner = PartyRef::from_user(&user)?;

    // 回填店铺资料
    let (account_shop_name, account_location) = match user.role {
        Role::Buyer => {
            let buyer = BuyerRepository::new(state.get_db())
                .find_by_id(&user.id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::BuyerNotFound))?;
            (buyer.shop_name, buyer.location)
        }
        Role::Supplier => {
            let supplier = SupplierRepository::new(state.get_db())
                .find_by_id(&user.id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::SupplierNotFound))?;
            (supplier.full_name, String::new())
        }
        Role::Admin => (String::new(), String::new()),
    };

    let now = shared::util::now_millis();
    let product = Product {
        id: None,
        owner: owner.clone(),
        name: payload.name.trim().to_string(),
        shop_name: payload.shop_name.unwrap_or(account_shop_name),
        location: payload.location.unwrap_or(account_location),
        category: payload.category.unwrap_or_default(),
        description: payload.description.unwrap_or_default(),
        price: payload.price,
        stock: payload.stock,
        is_active: true,
        price_history: vec![PriceEntry {
            price: payload.price,
            date: now,
            updated_by: Some(owner.id.clone()),
            reason: "Initial price".to_string(),
        }],
        created_at: now,
        updated_at: now,
    };

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(product).await.map_err(AppError::from)?;

    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品 (价格变化自动入历史)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    check_ownership(&product, &user)?;

    let editor = PartyRef::from_user(&user).ok().map(|p| p.id);
    let product = repo
        .update(&id, payload, editor)
        .await
        .map_err(AppError::from)?;

    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品 (价格历史随之级联删除)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    check_ownership(&product, &user)?;

    let deleted = repo.delete(&id).await.map_err(AppError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "name": deleted.name,
        "price_history_entries": deleted.price_history.len(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// GET /api/products/:id/price-history?limit - 最近价格历史
pub async fn price_history(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PriceEntry>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let mut history = product.price_history;
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history.truncate(query.limit.unwrap_or(10));

    Ok(Json(history))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub days: Option<i64>,
}

/// GET /api/products/:id/price-trends?days - 时间窗内的价格走势
pub async fn price_trends(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<Vec<PriceEntry>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let days = query.days.unwrap_or(30);
    let cutoff = shared::util::now_millis() - days * 24 * 60 * 60 * 1000;

    let mut trend: Vec<PriceEntry> = product
        .price_history
        .into_iter()
        .filter(|e| e.date >= cutoff)
        .collect();
    trend.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(Json(trend))
}

/// PUT /api/products/bulk-price - 批量更新价格
///
/// 每个条目独立成败；价格未变的条目跳过，不产生历史。
pub async fn bulk_update_prices(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(updates): Json<Vec<BulkPriceUpdate>>,
) -> AppResult<Json<serde_json::Value>> {
    if updates.is_empty() {
        return Err(AppError::validation("Updates array is required"));
    }

    let repo = ProductRepository::new(state.get_db());
    let editor = PartyRef::from_user(&user).ok().map(|p| p.id);
    let mut results: Vec<BulkPriceResult> = Vec::with_capacity(updates.len());

    for update in updates {
        let product = match repo.find_by_id(&update.product_id).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                results.push(BulkPriceResult {
                    product_id: update.product_id,
                    status: "error".to_string(),
                    message: "Product not found".to_string(),
                    old_price: None,
                    new_price: None,
                });
                continue;
            }
            Err(e) => {
                results.push(BulkPriceResult {
                    product_id: update.product_id,
                    status: "error".to_string(),
                    message: e.to_string(),
                    old_price: None,
                    new_price: None,
                });
                continue;
            }
        };

        if check_ownership(&product, &user).is_err() {
            results.push(BulkPriceResult {
                product_id: update.product_id,
                status: "error".to_string(),
                message: "Not the product owner".to_string(),
                old_price: None,
                new_price: None,
            });
            continue;
        }

        let old_price = product.price;
        if (old_price - update.new_price).abs() < f64::EPSILON {
            results.push(BulkPriceResult {
                product_id: update.product_id,
                status: "skipped".to_string(),
                message: "Price unchanged".to_string(),
                old_price: Some(old_price),
                new_price: Some(update.new_price),
            });
            continue;
        }

        let reason = update.reason.as_deref().unwrap_or("Bulk price update");
        match repo
            .add_price_history(&update.product_id, update.new_price, editor.clone(), reason)
            .await
        {
            Ok(_) => results.push(BulkPriceResult {
                product_id: update.product_id,
                status: "success".to_string(),
                message: "Price updated successfully".to_string(),
                old_price: Some(old_price),
                new_price: Some(update.new_price),
            }),
            Err(e) => results.push(BulkPriceResult {
                product_id: update.product_id,
                status: "error".to_string(),
                message: e.to_string(),
                old_price: None,
                new_price: None,
            }),
        }
    }

    let successful = results.iter().filter(|r| r.status == "success").count();
    let errors = results.iter().filter(|r| r.status == "error").count();
    let skipped = results.iter().filter(|r| r.status == "skipped").count();

    tracing::info!(successful, errors, skipped, "Bulk price update completed");

    Ok(Json(serde_json::json!({
        "summary": {
            "total": results.len(),
            "successful": successful,
            "errors": errors,
            "skipped": skipped,
        },
        "results": results,
    })))
}
