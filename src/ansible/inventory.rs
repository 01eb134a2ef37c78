use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// Where groups, memberships and host variables end up. Every operation is
/// idempotent: repeating a call with the same arguments changes nothing.
pub trait InventorySink {
    fn ensure_group(&mut self, group: &str);
    fn add_host_to_group(&mut self, host: &str, group: &str);
    fn set_host_variable(&mut self, host: &str, key: &str, value: Value);
}

/// In-memory inventory. Ordered maps keep rendering deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Inventory {
    groups: BTreeMap<String, BTreeSet<String>>,
    hostvars: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.groups
    }

    pub fn hostvars(&self) -> &BTreeMap<String, BTreeMap<String, Value>> {
        &self.hostvars
    }

    pub fn hosts_in(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group)
    }

    pub fn host_variables(&self, host: &str) -> Option<&BTreeMap<String, Value>> {
        self.hostvars.get(host)
    }
}

impl InventorySink for Inventory {
    fn ensure_group(&mut self, group: &str) {
        self.groups.entry(group.to_owned()).or_default();
    }

    fn add_host_to_group(&mut self, host: &str, group: &str) {
        self.groups
            .entry(group.to_owned())
            .or_default()
            .insert(host.to_owned());
    }

    fn set_host_variable(&mut self, host: &str, key: &str, value: Value) {
        self.hostvars
            .entry(host.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_repeated_writes_are_idempotent() {
        // Given
        let mut inventory = Inventory::new();

        inventory.ensure_group("prod");
        inventory.add_host_to_group("node-1", "prod");
        inventory.set_host_variable("node-1", "ansible_host", json!("10.0.0.5"));

        let snapshot = inventory.clone();

        // When
        inventory.ensure_group("prod");
        inventory.add_host_to_group("node-1", "prod");
        inventory.set_host_variable("node-1", "ansible_host", json!("10.0.0.5"));

        // Then
        assert_eq!(inventory, snapshot);
        assert_eq!(inventory.hosts_in("prod").unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_group_creates_empty_group() {
        let mut inventory = Inventory::new();

        inventory.ensure_group("empty");

        assert!(inventory.hosts_in("empty").unwrap().is_empty());
    }
}
