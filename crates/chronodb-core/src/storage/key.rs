//! Row key encoding for the sled-backed row store.

use std::fmt;

use crate::catalog::TableId;

/// Size of the table id prefix in bytes.
pub const TABLE_ID_SIZE: usize = 8;

/// Size of the timestamp suffix in bytes.
pub const TS_SIZE: usize = 8;

/// Total key size.
pub const KEY_SIZE: usize = TABLE_ID_SIZE + TS_SIZE;

/// A row key combining table id and row timestamp.
///
/// Key format: `[table_id (8 bytes, big-endian)][ts (8 bytes, sign-flipped
/// big-endian)]`
///
/// Big-endian encoding with the timestamp's sign bit flipped makes
/// lexicographic byte order equal to `(table_id, ts)` order, so range scans
/// return a table's rows in timestamp order and the last key in a table's
/// range is the row with the maximum timestamp.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey {
    /// Owning table.
    pub table_id: TableId,
    /// Row timestamp in milliseconds since Unix epoch.
    pub ts: i64,
}

impl RowKey {
    /// Create a new row key.
    pub fn new(table_id: TableId, ts: i64) -> Self {
        Self { table_id, ts }
    }

    /// Encode the key to bytes.
    pub fn encode(&self) -> [u8; KEY_SIZE] {
        let mut buf = [0u8; KEY_SIZE];
        buf[..TABLE_ID_SIZE].copy_from_slice(&self.table_id.to_be_bytes());
        buf[TABLE_ID_SIZE..].copy_from_slice(&order_preserving(self.ts).to_be_bytes());
        buf
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_SIZE {
            return None;
        }

        let mut id_bytes = [0u8; TABLE_ID_SIZE];
        id_bytes.copy_from_slice(&bytes[..TABLE_ID_SIZE]);

        let mut ts_bytes = [0u8; TS_SIZE];
        ts_bytes.copy_from_slice(&bytes[TABLE_ID_SIZE..]);

        Some(Self {
            table_id: TableId::from_be_bytes(id_bytes),
            ts: from_order_preserving(u64::from_be_bytes(ts_bytes)),
        })
    }

    /// Minimum key in a table's range.
    pub fn min_for_table(table_id: TableId) -> Self {
        Self::new(table_id, i64::MIN)
    }

    /// Maximum key in a table's range.
    pub fn max_for_table(table_id: TableId) -> Self {
        Self::new(table_id, i64::MAX)
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowKey")
            .field("table_id", &self.table_id)
            .field("ts", &self.ts)
            .finish()
    }
}

/// Flip the sign bit so signed order matches unsigned byte order.
fn order_preserving(ts: i64) -> u64 {
    (ts as u64) ^ (1 << 63)
}

fn from_order_preserving(encoded: u64) -> i64 {
    (encoded ^ (1 << 63)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        for ts in [i64::MIN, -1, 0, 1, 1699804800000, i64::MAX] {
            let key = RowKey::new(42, ts);
            let decoded = RowKey::decode(&key.encode()).unwrap();
            assert_eq!(decoded, key);
        }
    }

    #[test]
    fn test_byte_order_matches_ts_order() {
        let timestamps = [i64::MIN, -100, -1, 0, 1, 50, i64::MAX];
        for pair in timestamps.windows(2) {
            let a = RowKey::new(7, pair[0]).encode();
            let b = RowKey::new(7, pair[1]).encode();
            assert!(a < b, "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_table_id_dominates_order() {
        let a = RowKey::new(1, i64::MAX).encode();
        let b = RowKey::new(2, i64::MIN).encode();
        assert!(a < b);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(RowKey::decode(&[0u8; 5]).is_none());
    }
}
