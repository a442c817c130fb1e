//! Supplier Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Supplier account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub full_name: String,
    pub contact_number: String,
    pub email: String,
    /// Argon2 hash, never exposed through the API
    pub password_hash: String,
    /// Aggregate rating 0-5, maintained by the rating workflow
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: i64,
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

impl Supplier {
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
pub struct SupplierRegister {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(min = 10, max = 15))]
    pub contact_number: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Profile update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupplierUpdate {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub contact_number: Option<String>,
}

/// API-facing profile (password hash stripped)
#[derive(Debug, Clone, Serialize)]
pub struct SupplierProfile {
    pub id: String,
    pub full_name: String,
    pub contact_number: String,
    pub email: String,
    pub rating: f64,
    pub rating_count: i64,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
}

impl From<Supplier> for SupplierProfile {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id.map(|id| id.to_string()).unwrap_or_default(),
            full_name: s.full_name,
            contact_number: s.contact_number,
            email: s.email,
            rating: s.rating,
            rating_count: s.rating_count,
            is_active: s.is_active,
            is_verified: s.is_verified,
            last_login: s.last_login,
            created_at: s.created_at,
        }
    }
}
