//! Supplier Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Supplier, SupplierUpdate};

const SUPPLIER_TABLE: &str = "supplier";

#[derive(Clone)]
pub struct SupplierRepository {
    base: BaseRepository,
}

impl SupplierRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new supplier; the email unique index rejects re-registration
    pub async fn create(&self, supplier: Supplier) -> RepoResult<Supplier> {
        let created: Option<Supplier> = self
            .base
            .db()
            .create(SUPPLIER_TABLE)
            .content(supplier)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create supplier".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Supplier>> {
        let rid = make_record_id(SUPPLIER_TABLE, id);
        let supplier: Option<Supplier> = self.base.db().select(rid).await?;
        Ok(supplier)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Supplier>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM supplier WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let suppliers: Vec<Supplier> = result.take(0)?;
        Ok(suppliers.into_iter().next())
    }

    /// List active suppliers, best-rated first
    pub async fn list_active(&self) -> RepoResult<Vec<Supplier>> {
        let suppliers: Vec<Supplier> = self
            .base
            .db()
            .query("SELECT * FROM supplier WHERE is_active = true ORDER BY rating DESC")
            .await?
            .take(0)?;
        Ok(suppliers)
    }

    /// Update mutable profile fields
    pub async fn update(&self, id: &str, data: SupplierUpdate) -> RepoResult<Supplier> {
        let rid = make_record_id(SUPPLIER_TABLE, id);

        let mut supplier: Supplier = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Supplier {} not found", id)))?;

        if let Some(v) = data.full_name {
            supplier.full_name = v;
        }
        if let Some(v) = data.contact_number {
            supplier.contact_number = v;
        }
        supplier.updated_at = shared::util::now_millis();
        supplier.id = None;

        let updated: Option<Supplier> = self.base.db().update(rid).content(supplier).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Supplier {} not found", id)))
    }

    /// Fold one more rating into the aggregate
    pub async fn apply_rating(&self, id: &str, rating: u8) -> RepoResult<Supplier> {
        let rid = make_record_id(SUPPLIER_TABLE, id);

        let mut supplier: Supplier = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Supplier {} not found", id)))?;

        let total = supplier.rating * supplier.rating_count as f64 + rating as f64;
        supplier.rating_count += 1;
        supplier.rating = total / supplier.rating_count as f64;
        supplier.updated_at = shared::util::now_millis();
        supplier.id = None;

        let updated: Option<Supplier> = self.base.db().update(rid).content(supplier).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Supplier {} not found", id)))
    }

    /// Stamp a successful login
    pub async fn touch_last_login(&self, id: &str) -> RepoResult<()> {
        let rid = make_record_id(SUPPLIER_TABLE, id);
        self.base
            .db()
            .query("UPDATE $supplier SET last_login = $now")
            .bind(("supplier", rid))
            .bind(("now", shared::util::now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}
