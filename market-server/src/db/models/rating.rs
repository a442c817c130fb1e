//! Rating Model
//!
//! 评分双方是任意参与方；同一 rater/ratee(/order) 组合只允许一条。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::party::{PartyKind, PartyRef};
use super::serde_helpers;

/// Optional category sub-scores, each 1-5
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub quality: Option<u8>,
    pub delivery: Option<u8>,
    pub communication: Option<u8>,
    pub packaging: Option<u8>,
    pub value: Option<u8>,
}

/// Rating entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub rater: PartyRef,
    pub ratee: PartyRef,
    /// 1-5
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_order: Option<RecordId>,
    pub categories: Option<CategoryScores>,
    #[serde(default = "default_true")]
    pub verified: bool,
    /// `<rater>|<ratee>|<order or ->`, backed by a unique index
    pub unique_key: String,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Rating {
    /// Compose the uniqueness key for a rater/ratee(/order) combination
    pub fn compose_key(rater: &PartyRef, ratee: &PartyRef, order: Option<&RecordId>) -> String {
        format!(
            "{}|{}|{}",
            rater.id_string(),
            ratee.id_string(),
            order.map(|o| o.to_string()).unwrap_or_else(|| "-".into())
        )
    }
}

/// Create payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RatingCreate {
    pub ratee_kind: PartyKind,
    pub ratee_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
    pub order_id: Option<String>,
    pub categories: Option<CategoryScores>,
}

/// Aggregate view of a party's ratings
#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i64,
    /// counts for scores 1..=5
    pub rating_distribution: [i64; 5],
    pub recent_ratings: Vec<Rating>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_key_with_and_without_order() {
        let rater = PartyRef::buyer(RecordId::from_table_key("buyer", "b1"));
        let ratee = PartyRef::supplier(RecordId::from_table_key("supplier", "s1"));
        let order = RecordId::from_table_key("order", "o1");

        assert_eq!(
            Rating::compose_key(&rater, &ratee, None),
            "buyer:b1|supplier:s1|-"
        );
        assert_eq!(
            Rating::compose_key(&rater, &ratee, Some(&order)),
            "buyer:b1|supplier:s1|order:o1"
        );
    }
}
