//! 通用工具：时间戳与单据编号生成

use std::sync::atomic::{AtomicU32, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Process-wide sequence for document numbers
static DOC_SEQ: AtomicU32 = AtomicU32::new(0);

/// Generate a human-readable document number: `<PREFIX>-<millis>-<seq04>`.
///
/// The millisecond timestamp plus a wrapping per-process sequence keeps
/// numbers unique without a database round-trip; they are not gapless.
/// Used for order numbers (`ORD-…`) and reservation numbers (`RES-…`).
pub fn document_number(prefix: &str) -> String {
    let seq = DOC_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{}-{}-{:04}", prefix, now_millis(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_format() {
        let n = document_number("ORD");
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_document_number_unique() {
        let a = document_number("RES");
        let b = document_number("RES");
        assert_ne!(a, b);
    }
}
