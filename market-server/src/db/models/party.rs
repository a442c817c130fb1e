//! Party Reference (tagged union)
//!
//! 通知接收方、评分双方、预订店铺都可能是 Buyer 或 Supplier。
//! 用带标签的 `PartyRef` 代替两个可空引用字段，让 match 覆盖所有分支。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use crate::auth::{CurrentUser, Role};
use crate::utils::{AppError, AppResult};

/// 参与方类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Buyer,
    Supplier,
}

impl PartyKind {
    /// 对应的数据库表名
    pub fn table(&self) -> &'static str {
        match self {
            PartyKind::Buyer => "buyer",
            PartyKind::Supplier => "supplier",
        }
    }
}

/// 参与方引用 {kind, id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRef {
    pub kind: PartyKind,
    #[serde(with = "serde_helpers::record_id")]
    pub id: RecordId,
}

impl PartyRef {
    pub fn buyer(id: RecordId) -> Self {
        Self {
            kind: PartyKind::Buyer,
            id,
        }
    }

    pub fn supplier(id: RecordId) -> Self {
        Self {
            kind: PartyKind::Supplier,
            id,
        }
    }

    /// 从认证用户构造参与方引用
    ///
    /// 管理员不是市场参与方，返回 403
    pub fn from_user(user: &CurrentUser) -> AppResult<Self> {
        let kind = match user.role {
            Role::Buyer => PartyKind::Buyer,
            Role::Supplier => PartyKind::Supplier,
            Role::Admin => {
                return Err(AppError::forbidden("Admins are not marketplace parties"));
            }
        };
        let id = user
            .id
            .parse::<RecordId>()
            .map_err(|_| AppError::invalid_token("Malformed subject id"))?;
        Ok(Self { kind, id })
    }

    /// "table:id" 字符串形式
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// 是否指向同一参与方
    pub fn same_party(&self, other: &PartyRef) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_kind_table() {
        assert_eq!(PartyKind::Buyer.table(), "buyer");
        assert_eq!(PartyKind::Supplier.table(), "supplier");
    }

    #[test]
    fn test_party_ref_serde() {
        let p = PartyRef::buyer(RecordId::from_table_key("buyer", "abc"));
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"kind\":\"buyer\""));
        assert!(json.contains("buyer:abc"));

        let back: PartyRef = serde_json::from_str(&json).unwrap();
        assert!(back.same_party(&p));
    }

    #[test]
    fn test_same_party() {
        let a = PartyRef::buyer(RecordId::from_table_key("buyer", "a"));
        let b = PartyRef::supplier(RecordId::from_table_key("supplier", "a"));
        assert!(!a.same_party(&b));
        assert!(a.same_party(&a.clone()));
    }
}
