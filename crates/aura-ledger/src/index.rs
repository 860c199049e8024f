use std::collections::HashMap;

/// Secondary index from a string key to entry positions.
///
/// Buckets keep insertion order, and keys iterate in the order they were
/// first seen. Condition searches depend on that key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct BucketIndex {
    slots: HashMap<String, usize>,
    buckets: Vec<(String, Vec<usize>)>,
}

impl BucketIndex {
    /// Push `position` onto the bucket for `key`, creating it on first use.
    pub(crate) fn insert(&mut self, key: &str, position: usize) {
        let slot = match self.slots.get(key) {
            Some(slot) => *slot,
            None => {
                self.buckets.push((key.to_string(), Vec::new()));
                let slot = self.buckets.len() - 1;
                self.slots.insert(key.to_string(), slot);
                slot
            }
        };
        self.buckets[slot].1.push(position);
    }

    /// Positions stored under exactly `key`.
    pub(crate) fn get(&self, key: &str) -> &[usize] {
        self.slots
            .get(key)
            .map(|slot| self.buckets[*slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// Buckets in first-seen key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.buckets
            .iter()
            .map(|(key, positions)| (key.as_str(), positions.as_slice()))
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(key, _)| key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_created_on_first_use() {
        let mut index = BucketIndex::default();
        assert!(index.get("a").is_empty());
        index.insert("a", 0);
        index.insert("a", 2);
        assert_eq!(index.get("a"), &[0, 2]);
    }

    #[test]
    fn keys_iterate_in_first_seen_order() {
        let mut index = BucketIndex::default();
        index.insert("zeta", 0);
        index.insert("alpha", 1);
        index.insert("zeta", 2);
        let keys: Vec<_> = index.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let buckets: Vec<_> = index.iter().collect();
        assert_eq!(buckets[0], ("zeta", &[0usize, 2][..]));
    }

    #[test]
    fn lookups_are_exact() {
        let mut index = BucketIndex::default();
        index.insert("Fatigue", 0);
        assert!(index.get("fatigue").is_empty());
    }
}
