//! Buyer Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Buyer, BuyerUpdate};

const BUYER_TABLE: &str = "buyer";

#[derive(Clone)]
pub struct BuyerRepository {
    base: BaseRepository,
}

impl BuyerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new buyer; the email unique index rejects re-registration
    pub async fn create(&self, buyer: Buyer) -> RepoResult<Buyer> {
        let created: Option<Buyer> = self
            .base
            .db()
            .create(BUYER_TABLE)
            .content(buyer)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create buyer".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Buyer>> {
        let rid = make_record_id(BUYER_TABLE, id);
        let buyer: Option<Buyer> = self.base.db().select(rid).await?;
        Ok(buyer)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Buyer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM buyer WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let buyers: Vec<Buyer> = result.take(0)?;
        Ok(buyers.into_iter().next())
    }

    /// Update mutable profile fields
    pub async fn update(&self, id: &str, data: BuyerUpdate) -> RepoResult<Buyer> {
        let rid = make_record_id(BUYER_TABLE, id);

        let mut buyer: Buyer = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Buyer {} not found", id)))?;

        if let Some(v) = data.shop_name {
            buyer.shop_name = v;
        }
        if let Some(v) = data.owner_name {
            buyer.owner_name = v;
        }
        if let Some(v) = data.location {
            buyer.location = v;
        }
        if let Some(v) = data.contact_number {
            buyer.contact_number = v;
        }
        buyer.updated_at = shared::util::now_millis();
        buyer.id = None;

        let updated: Option<Buyer> = self.base.db().update(rid).content(buyer).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Buyer {} not found", id)))
    }

    /// Stamp a successful login
    pub async fn touch_last_login(&self, id: &str) -> RepoResult<()> {
        let rid = make_record_id(BUYER_TABLE, id);
        self.base
            .db()
            .query("UPDATE $buyer SET last_login = $now")
            .bind(("buyer", rid))
            .bind(("now", shared::util::now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}
