use std::collections::HashMap;

use nova_hir::NodeId;
use nova_types::Type;
use parking_lot::Mutex;

/// Memoization key. Lambda and method reference types depend on the `solve_lambdas` flag, every
/// other node kind is keyed by identity alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub node: NodeId,
    pub solve_lambdas: Option<bool>,
}

/// Caller-side memo of resolved node types, shared across resolvers over the same tree.
///
/// Only successful resolutions are recorded. Once `capacity` entries exist, further inserts are
/// dropped.
#[derive(Debug)]
pub struct TypeCache {
    entries: Mutex<HashMap<CacheKey, Type>>,
    capacity: usize,
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::with_capacity(nova_config::CacheConfig::default().capacity)
    }
}

impl TypeCache {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// `None` when caching is disabled in `config`.
    #[must_use]
    pub fn from_config(config: &nova_config::CacheConfig) -> Option<Self> {
        config.enabled.then(|| Self::with_capacity(config.capacity))
    }

    #[must_use]
    pub fn get(&self, key: CacheKey) -> Option<Type> {
        self.entries.lock().get(&key).cloned()
    }

    pub fn insert(&self, key: CacheKey, ty: Type) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            return;
        }
        entries.insert(key, ty);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_hir::SyntaxTree;

    #[test]
    fn inserts_past_capacity_are_dropped() {
        let mut tree = SyntaxTree::new();
        let a = tree.int_lit(1);
        let b = tree.int_lit(2);

        let cache = TypeCache::with_capacity(1);
        let key = |node| CacheKey {
            node,
            solve_lambdas: None,
        };
        cache.insert(key(a), Type::int());
        cache.insert(key(b), Type::int());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(key(a)), Some(Type::int()));
        assert_eq!(cache.get(key(b)), None);
    }

    #[test]
    fn disabled_config_yields_no_cache() {
        let config = nova_config::CacheConfig {
            enabled: false,
            ..nova_config::CacheConfig::default()
        };
        assert!(TypeCache::from_config(&config).is_none());
    }
}
