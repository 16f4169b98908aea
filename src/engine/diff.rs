//! Snapshot comparison.
//!
//! Classifies how document counts moved between two snapshots of the same
//! member slot.

use clusterwatch_types::{ChangeEvent, Delta, Snapshot};

/// Compare a slot's previous snapshot with its current one.
///
/// - No previous snapshot (first observation) yields an empty event: a
///   baseline carries no change signal.
/// - A key whose count rose (counting a missing previous key as 0) is grown.
/// - A key whose count fell is shrunk; a key missing from `current` is
///   removed, recorded with a current count of 0.
/// - Unchanged keys appear in neither map.
pub fn diff(previous: Option<&Snapshot>, current: &Snapshot) -> ChangeEvent {
    let Some(previous) = previous else {
        return ChangeEvent::empty();
    };

    let mut event = ChangeEvent::empty();

    for (key, current_count) in current.iter() {
        let previous_count = previous.count(key).unwrap_or(0);
        let delta = Delta::new(previous_count, current_count);

        if current_count > previous_count {
            event.grown.insert(key.clone(), delta);
        } else if current_count < previous_count {
            event.shrunk_or_removed.insert(key.clone(), delta);
        }
    }

    for (key, previous_count) in previous.iter() {
        if !current.contains(key) && previous_count > 0 {
            event
                .shrunk_or_removed
                .insert(key.clone(), Delta::new(previous_count, 0));
        }
    }

    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_types::CollectionKey;

    fn key(collection: &str) -> CollectionKey {
        CollectionKey::new("db", collection)
    }

    fn snapshot(entries: &[(&str, u64)]) -> Snapshot {
        entries
            .iter()
            .fold(Snapshot::builder().timestamp_ms(0), |b, (c, n)| {
                b.collection("db", *c, *n)
            })
            .build()
    }

    #[test]
    fn test_first_observation_is_empty() {
        let current = snapshot(&[("orders", 10), ("users", 3)]);
        assert!(diff(None, &current).is_empty());
    }

    #[test]
    fn test_identical_snapshots_are_empty() {
        let s = snapshot(&[("orders", 10), ("users", 0)]);
        assert!(diff(Some(&s), &s).is_empty());
    }

    #[test]
    fn test_growth_and_new_collection() {
        let previous = snapshot(&[("orders", 10)]);
        let current = snapshot(&[("orders", 15), ("users", 2)]);

        let event = diff(Some(&previous), &current);
        assert_eq!(event.grown.len(), 2);
        assert_eq!(event.grown[&key("orders")], Delta::new(10, 15));
        assert_eq!(event.grown[&key("users")], Delta::new(0, 2));
        assert!(event.shrunk_or_removed.is_empty());
    }

    #[test]
    fn test_new_collection_appears_as_growth_from_zero() {
        let previous = snapshot(&[]);
        let current = snapshot(&[("logs", 3)]);

        let event = diff(Some(&previous), &current);
        assert_eq!(event.grown[&key("logs")], Delta::new(0, 3));
    }

    #[test]
    fn test_removed_collection_is_recorded_with_zero() {
        let previous = snapshot(&[("carts", 5), ("orders", 10)]);
        let current = snapshot(&[("orders", 10)]);

        let event = diff(Some(&previous), &current);
        assert!(event.grown.is_empty());
        assert_eq!(event.shrunk_or_removed.len(), 1);
        assert_eq!(event.shrunk_or_removed[&key("carts")], Delta::new(5, 0));
    }

    #[test]
    fn test_shrink() {
        let previous = snapshot(&[("orders", 10)]);
        let current = snapshot(&[("orders", 4)]);

        let event = diff(Some(&previous), &current);
        assert_eq!(event.shrunk_or_removed[&key("orders")], Delta::new(10, 4));
    }

    #[test]
    fn test_empty_collection_disappearing_is_not_a_change() {
        // previous 0 -> absent (treated as 0) has equal counts
        let previous = snapshot(&[("scratch", 0)]);
        let current = snapshot(&[]);
        assert!(diff(Some(&previous), &current).is_empty());
    }

    #[test]
    fn test_same_collection_name_in_two_databases() {
        let previous = Snapshot::builder()
            .collection("shop", "orders", 1)
            .collection("archive", "orders", 1)
            .build();
        let current = Snapshot::builder()
            .collection("shop", "orders", 2)
            .collection("archive", "orders", 1)
            .build();

        let event = diff(Some(&previous), &current);
        assert_eq!(event.len(), 1);
        assert!(event.grown.contains_key(&CollectionKey::new("shop", "orders")));
    }

    #[test]
    fn test_maps_are_disjoint_and_deltas_differ() {
        let previous = snapshot(&[("a", 1), ("b", 5), ("c", 3), ("d", 7)]);
        let current = snapshot(&[("a", 2), ("b", 5), ("c", 0), ("e", 9)]);

        let event = diff(Some(&previous), &current);
        for k in event.grown.keys() {
            assert!(!event.shrunk_or_removed.contains_key(k));
        }
        for (_, delta) in event.iter() {
            assert_ne!(delta.previous, delta.current);
        }
        assert_eq!(event.grown.len(), 2); // a, e
        assert_eq!(event.shrunk_or_removed.len(), 2); // c, d
    }

    #[test]
    fn test_diff_is_repeatable() {
        let previous = snapshot(&[("a", 1), ("b", 5)]);
        let current = snapshot(&[("a", 3), ("c", 2)]);
        assert_eq!(
            diff(Some(&previous), &current),
            diff(Some(&previous), &current)
        );
    }
}
