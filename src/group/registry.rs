//! Group Registry
//!
//! Name -> group lookup shared by the application and the peer server.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{Getter, Group};

/// Registry of every group served by this node.
///
/// Owned by the application root and shared via `Arc`; independent
/// registries never see each other's groups.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a group. Names are unique per registry.
    pub fn new_group(
        &self,
        name: &str,
        cache_bytes: usize,
        getter: Arc<dyn Getter>,
    ) -> Result<Arc<Group>> {
        self.register(Group::new(name, cache_bytes, getter))
    }

    /// Registers an already constructed group.
    pub fn register(&self, group: Group) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(group.name()) {
            return Err(CacheError::Config(format!(
                "group {} already exists",
                group.name()
            )));
        }

        let group = Arc::new(group);
        groups.insert(group.name().to_string(), group.clone());
        info!("Registered group {}", group.name());
        Ok(group)
    }

    /// Looks up a group by name.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// All registered groups, sorted by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GetterFn;

    fn echo() -> Arc<dyn Getter> {
        Arc::new(GetterFn(|key: &str| Ok::<_, CacheError>(key.as_bytes().to_vec())))
    }

    #[test]
    fn test_new_group_and_lookup() {
        let registry = GroupRegistry::new();
        let group = registry.new_group("scores", 2048, echo()).unwrap();

        let found = registry.get_group("scores").unwrap();
        assert!(Arc::ptr_eq(&group, &found));
        assert!(registry.get_group("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = GroupRegistry::new();
        registry.new_group("scores", 2048, echo()).unwrap();

        assert!(matches!(
            registry.new_group("scores", 1024, echo()),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = GroupRegistry::new();
        let b = GroupRegistry::new();
        a.new_group("scores", 0, echo()).unwrap();

        assert!(b.get_group("scores").is_none());
        b.new_group("scores", 0, echo()).unwrap();
    }

    #[test]
    fn test_groups_sorted() {
        let registry = GroupRegistry::new();
        for name in ["users", "scores", "avatars"] {
            registry.new_group(name, 0, echo()).unwrap();
        }

        let names: Vec<String> = registry
            .groups()
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["avatars", "scores", "users"]);
    }
}
