//! Per-database cache model configuration.

/// Which last-value cache structures a database maintains.
///
/// Set once at `CREATE DATABASE ... CACHEMODEL '...'` and immutable for the
/// database's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheModel {
    /// Neither cache structure is maintained.
    #[default]
    None,
    /// Only the last-row cache.
    LastRow,
    /// Only the per-column last-non-null cache.
    LastValue,
    /// Both structures.
    Both,
}

impl CacheModel {
    /// Parse the CACHEMODEL clause value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(CacheModel::None),
            "last_row" => Some(CacheModel::LastRow),
            "last_value" => Some(CacheModel::LastValue),
            "both" => Some(CacheModel::Both),
            _ => None,
        }
    }

    /// The canonical clause spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheModel::None => "none",
            CacheModel::LastRow => "last_row",
            CacheModel::LastValue => "last_value",
            CacheModel::Both => "both",
        }
    }

    /// Whether the last-row cache is maintained.
    pub fn allows_row_cache(&self) -> bool {
        matches!(self, CacheModel::LastRow | CacheModel::Both)
    }

    /// Whether the per-column last-non-null cache is maintained.
    pub fn allows_value_cache(&self) -> bool {
        matches!(self, CacheModel::LastValue | CacheModel::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CacheModel::parse("none"), Some(CacheModel::None));
        assert_eq!(CacheModel::parse("last_row"), Some(CacheModel::LastRow));
        assert_eq!(CacheModel::parse("last_value"), Some(CacheModel::LastValue));
        assert_eq!(CacheModel::parse("both"), Some(CacheModel::Both));
        assert_eq!(CacheModel::parse("bogus"), None);
    }

    #[test]
    fn test_allows() {
        assert!(!CacheModel::None.allows_row_cache());
        assert!(!CacheModel::None.allows_value_cache());
        assert!(CacheModel::LastRow.allows_row_cache());
        assert!(!CacheModel::LastRow.allows_value_cache());
        assert!(!CacheModel::LastValue.allows_row_cache());
        assert!(CacheModel::LastValue.allows_value_cache());
        assert!(CacheModel::Both.allows_row_cache());
        assert!(CacheModel::Both.allows_value_cache());
    }

    #[test]
    fn test_as_str_roundtrip() {
        for model in [
            CacheModel::None,
            CacheModel::LastRow,
            CacheModel::LastValue,
            CacheModel::Both,
        ] {
            assert_eq!(CacheModel::parse(model.as_str()), Some(model));
        }
    }
}
