use std::collections::BTreeMap;

pub const DEFAULT_ITEM_NAME: &str = "coin";

/// Multiset of collected item names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: &str) -> u32 {
        let count = self.counts.entry(item.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    pub fn total(&self) -> u32 {
        self.counts.values().copied().fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_items() {
        let mut inventory = Inventory::new();
        assert_eq!(inventory.add(DEFAULT_ITEM_NAME), 1);
        assert_eq!(inventory.add(DEFAULT_ITEM_NAME), 2);
        inventory.add("key");

        assert_eq!(inventory.count(DEFAULT_ITEM_NAME), 2);
        assert!(inventory.contains("key"));
        assert!(!inventory.contains("map"));
        assert_eq!(inventory.total(), 3);
    }

    #[test]
    fn iterates_in_name_order_and_clears() {
        let mut inventory = Inventory::new();
        inventory.add("key");
        inventory.add("coin");
        let names: Vec<&str> = inventory.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["coin", "key"]);

        inventory.clear();
        assert!(inventory.is_empty());
        assert_eq!(inventory.total(), 0);
    }
}
