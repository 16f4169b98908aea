//! Qualified collection names.

use core::fmt;

/// A collection qualified by the database it lives in.
///
/// Two collections with the same name in different databases are distinct keys.
/// Keys order by database first, then collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionKey {
    /// Database name.
    pub database: String,
    /// Collection name within the database.
    pub collection: String,
}

impl CollectionKey {
    /// Create a key for `database.collection`.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Parse a `database.collection` namespace string.
    ///
    /// Database names cannot contain dots, so the first dot separates the two
    /// parts; the collection name may contain further dots.
    pub fn parse(namespace: &str) -> Option<Self> {
        let (database, collection) = namespace.split_once('.')?;
        if database.is_empty() || collection.is_empty() {
            return None;
        }
        Some(Self::new(database, collection))
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

// Serialized as a "database.collection" string so that keyed maps stay valid JSON objects.
#[cfg(feature = "serde")]
impl serde::Serialize for CollectionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CollectionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let namespace = String::deserialize(deserializer)?;
        CollectionKey::parse(&namespace).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid collection namespace: {}", namespace))
        })
    }
}
