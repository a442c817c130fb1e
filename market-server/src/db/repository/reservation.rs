//! Reservation Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Reservation, ReservationStatusCount};

const RESERVATION_TABLE: &str = "reservation";

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, reservation: Reservation) -> RepoResult<Reservation> {
        let created: Option<Reservation> = self
            .base
            .db()
            .create(RESERVATION_TABLE)
            .content(reservation)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create reservation".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let rid = make_record_id(RESERVATION_TABLE, id);
        let reservation: Option<Reservation> = self.base.db().select(rid).await?;
        Ok(reservation)
    }

    /// Write back a mutated reservation (read-modify-write)
    pub async fn save(&self, mut reservation: Reservation) -> RepoResult<Reservation> {
        let rid = reservation
            .id
            .take()
            .ok_or_else(|| RepoError::Validation("reservation has no id".into()))?;
        // id 由目标记录决定，content 里不带
        let updated: Option<Reservation> =
            self.base.db().update(rid).content(reservation).await?;
        updated.ok_or_else(|| RepoError::NotFound("Reservation not found".to_string()))
    }

    /// Reservations addressed to one shop party, newest first
    pub async fn list_for_shop(&self, shop_id: &str) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE shop.id = $shop ORDER BY created_at DESC")
            .bind(("shop", shop_id.to_string()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Reservations filed under one requester mobile number, newest first
    pub async fn list_by_mobile(&self, mobile_no: &str) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE mobile_no = $mobile ORDER BY created_at DESC")
            .bind(("mobile", mobile_no.to_string()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Bulk-expire pending reservations whose expiry passed; returns the count
    pub async fn expire_old(&self, now: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE reservation SET status = 'expired', responded_at = $now, updated_at = $now \
                 WHERE status = 'pending' AND expires_at < $now RETURN AFTER",
            )
            .bind(("now", now))
            .await?;
        let expired: Vec<Reservation> = result.take(0)?;
        Ok(expired.len())
    }

    /// Per-status counts for one shop
    pub async fn status_counts(&self, shop_id: &str) -> RepoResult<Vec<ReservationStatusCount>> {
        let counts: Vec<ReservationStatusCount> = self
            .base
            .db()
            .query(
                "SELECT status, count() AS count FROM reservation WHERE shop.id = $shop GROUP BY status",
            )
            .bind(("shop", shop_id.to_string()))
            .await?
            .take(0)?;
        Ok(counts)
    }
}
