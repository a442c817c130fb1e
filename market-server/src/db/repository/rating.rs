//! Rating Repository
//!
//! unique_key 唯一索引保证同一 rater/ratee(/order) 组合只有一条评分。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{PartyRef, Rating, RatingSummary};

const RATING_TABLE: &str = "rating";

#[derive(Clone)]
pub struct RatingRepository {
    base: BaseRepository,
}

impl RatingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a rating; the unique index turns duplicates into RepoError::Duplicate
    pub async fn create(&self, rating: Rating) -> RepoResult<Rating> {
        let created: Option<Rating> = self.base.db().create(RATING_TABLE).content(rating).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create rating".to_string()))
    }

    /// Verified ratings received by one party, newest first
    pub async fn list_for_ratee(&self, ratee: &PartyRef, limit: u32) -> RepoResult<Vec<Rating>> {
        let ratings: Vec<Rating> = self
            .base
            .db()
            .query(
                "SELECT * FROM rating WHERE ratee.id = $ratee AND verified = true \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("ratee", ratee.id_string()))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(ratings)
    }

    /// Aggregate view: average, total, distribution, recent entries
    pub async fn summary_for_ratee(&self, ratee: &PartyRef) -> RepoResult<RatingSummary> {
        let all: Vec<Rating> = self
            .base
            .db()
            .query("SELECT * FROM rating WHERE ratee.id = $ratee AND verified = true ORDER BY created_at DESC")
            .bind(("ratee", ratee.id_string()))
            .await?
            .take(0)?;

        let total = all.len() as i64;
        let mut distribution = [0i64; 5];
        let mut sum = 0u64;
        for r in &all {
            let score = r.rating.clamp(1, 5);
            distribution[(score - 1) as usize] += 1;
            sum += score as u64;
        }
        let average = if total > 0 {
            // one decimal place, matching the reporting surface
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        let recent_ratings = all.into_iter().take(5).collect();

        Ok(RatingSummary {
            average_rating: average,
            total_ratings: total,
            rating_distribution: distribution,
            recent_ratings,
        })
    }
}
