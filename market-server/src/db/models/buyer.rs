//! Buyer Model
//!
//! 买家同时可以作为店铺（卖方）挂牌商品。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Buyer account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub shop_name: String,
    pub owner_name: String,
    pub location: String,
    pub contact_number: String,
    pub email: String,
    /// Argon2 hash, never exposed through the API
    pub password_hash: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Buyer {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BuyerRegister {
    #[validate(length(min = 1, max = 100))]
    pub shop_name: String,
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 10, max = 15))]
    pub contact_number: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Profile update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BuyerUpdate {
    #[validate(length(min = 1, max = 100))]
    pub shop_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub owner_name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub contact_number: Option<String>,
}

/// API-facing profile (password hash stripped)
#[derive(Debug, Clone, Serialize)]
pub struct BuyerProfile {
    pub id: String,
    pub shop_name: String,
    pub owner_name: String,
    pub location: String,
    pub contact_number: String,
    pub email: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
}

impl From<Buyer> for BuyerProfile {
    fn from(b: Buyer) -> Self {
        Self {
            id: b.id.map(|id| id.to_string()).unwrap_or_default(),
            shop_name: b.shop_name,
            owner_name: b.owner_name,
            location: b.location,
            contact_number: b.contact_number,
            email: b.email,
            is_active: b.is_active,
            is_verified: b.is_verified,
            last_login: b.last_login,
            created_at: b.created_at,
        }
    }
}
