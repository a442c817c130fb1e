//! Product Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{PriceEntry, Product, ProductUpdate};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product
    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        if product.price < 0.0 {
            return Err(RepoError::Validation("price cannot be negative".into()));
        }
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Find all active products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find products owned by one party
    pub async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE owner.id = $owner ORDER BY name")
            .bind(("owner", owner_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Update a product
    ///
    /// 价格变化时追加一条历史记录（从不覆盖旧条目）
    pub async fn update(
        &self,
        id: &str,
        data: ProductUpdate,
        editor: Option<RecordId>,
    ) -> RepoResult<Product> {
        let rid = make_record_id(PRODUCT_TABLE, id);

        let mut product: Product = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let now = shared::util::now_millis();

        if let Some(new_price) = data.price {
            if new_price < 0.0 {
                return Err(RepoError::Validation("price cannot be negative".into()));
            }
            if (new_price - product.price).abs() > f64::EPSILON {
                product.price_history.push(PriceEntry {
                    price: new_price,
                    date: now,
                    updated_by: editor.clone(),
                    reason: data
                        .reason
                        .clone()
                        .unwrap_or_else(|| "Product update".to_string()),
                });
                product.price = new_price;
            }
        }

        if let Some(v) = data.name {
            product.name = v;
        }
        if let Some(v) = data.category {
            product.category = v;
        }
        if let Some(v) = data.description {
            product.description = v;
        }
        if let Some(v) = data.stock {
            product.stock = v;
        }
        if let Some(v) = data.is_active {
            product.is_active = v;
        }
        product.updated_at = now;
        product.id = None;

        let updated: Option<Product> = self.base.db().update(rid).content(product).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Append a price history entry and set the new current price
    pub async fn add_price_history(
        &self,
        id: &str,
        new_price: f64,
        editor: Option<RecordId>,
        reason: &str,
    ) -> RepoResult<Product> {
        let rid = make_record_id(PRODUCT_TABLE, id);

        let mut product: Product = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let now = shared::util::now_millis();
        product.price_history.push(PriceEntry {
            price: new_price,
            date: now,
            updated_by: editor,
            reason: reason.to_string(),
        });
        product.price = new_price;
        product.updated_at = now;
        product.id = None;

        let updated: Option<Product> = self.base.db().update(rid).content(product).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Adjust stock by a signed delta (negative on order creation)
    pub async fn adjust_stock(&self, id: &RecordId, delta: i32) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $product SET stock = stock + $delta, updated_at = $now")
            .bind(("product", id.clone()))
            .bind(("delta", delta as i64))
            .bind(("now", shared::util::now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Hard delete a product (price history goes with it)
    pub async fn delete(&self, id: &str) -> RepoResult<Product> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}
