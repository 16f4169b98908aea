//! Internal collection exclusion.

/// Default prefix of server-internal collections.
pub const DEFAULT_INTERNAL_PREFIX: &str = "system.";

/// Default name of the replication operations log.
pub const DEFAULT_OPLOG_NAME: &str = "oplog.rs";

/// Decides which collections are internal and must never be snapshotted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFilter {
    prefixes: Vec<String>,
    names: Vec<String>,
}

impl Default for CollectionFilter {
    fn default() -> Self {
        Self {
            prefixes: vec![DEFAULT_INTERNAL_PREFIX.to_string()],
            names: vec![DEFAULT_OPLOG_NAME.to_string()],
        }
    }
}

impl CollectionFilter {
    /// A filter excluding names with any of `prefixes` and any name in `names`.
    pub fn new(prefixes: Vec<String>, names: Vec<String>) -> Self {
        Self { prefixes, names }
    }

    /// Whether a collection name is internal.
    pub fn is_internal(&self, collection: &str) -> bool {
        self.prefixes.iter().any(|p| collection.starts_with(p.as_str()))
            || self.names.iter().any(|n| n == collection)
    }

    /// Keep only the user collections from a list of names.
    pub fn user_collections(&self, names: Vec<String>) -> Vec<String> {
        names.into_iter().filter(|n| !self.is_internal(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_excludes_system_and_oplog() {
        let filter = CollectionFilter::default();
        assert!(filter.is_internal("system.views"));
        assert!(filter.is_internal("system.profile"));
        assert!(filter.is_internal("oplog.rs"));

        assert!(!filter.is_internal("orders"));
        assert!(!filter.is_internal("oplog"));
        assert!(!filter.is_internal("my.system.notes"));
    }

    #[test]
    fn test_custom_rules() {
        let filter = CollectionFilter::new(vec!["tmp_".to_string()], vec!["locks".to_string()]);
        assert!(filter.is_internal("tmp_import"));
        assert!(filter.is_internal("locks"));
        assert!(!filter.is_internal("system.views"));
    }

    #[test]
    fn test_user_collections() {
        let filter = CollectionFilter::default();
        let names = vec![
            "orders".to_string(),
            "system.indexes".to_string(),
            "oplog.rs".to_string(),
            "users".to_string(),
        ];
        assert_eq!(
            filter.user_collections(names),
            vec!["orders".to_string(), "users".to_string()]
        );
    }
}
