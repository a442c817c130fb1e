//! RecordId 字段的 serde 辅助
//!
//! API JSON 里 id 以 "table:id" 字符串出现，数据库返回原生 RecordId，
//! 两种来源都要能反序列化；序列化统一输出字符串。

use serde::{Deserialize, Deserializer, Serializer};
use surrealdb::RecordId;

/// 两种线上形态的中间表示
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordIdRepr {
    Text(String),
    Native(RecordId),
}

impl RecordIdRepr {
    fn into_record_id<E: serde::de::Error>(self) -> Result<RecordId, E> {
        match self {
            RecordIdRepr::Text(text) => text
                .parse::<RecordId>()
                .map_err(|_| E::custom(format!("invalid record id: {text}"))),
            RecordIdRepr::Native(id) => Ok(id),
        }
    }
}

/// RecordId <-> "table:id"
pub mod record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &RecordId, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<RecordId, D::Error> {
        RecordIdRepr::deserialize(d)?.into_record_id()
    }
}

/// Option<RecordId> <-> "table:id" | null
pub mod option_record_id {
    use super::*;

    pub fn serialize<S: Serializer>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RecordId>, D::Error> {
        match Option::<RecordIdRepr>::deserialize(d)? {
            Some(repr) => repr.into_record_id().map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use surrealdb::RecordId;

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::record_id")]
        id: RecordId,
    }

    #[test]
    fn test_string_round_trip() {
        let holder = Holder {
            id: RecordId::from_table_key("product", "cinnamon"),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"id":"product:cinnamon"}"#);

        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, holder.id);
    }

    #[test]
    fn test_invalid_string_rejected() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"id":""}"#);
        assert!(result.is_err());
    }
}
