//! Disjoint-set union over canonical keys

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Union-find with path compression and union by rank
///
/// Keys are added lazily on first `find`. There is no removal: classes only
/// grow.
#[derive(Debug, Clone)]
pub struct DisjointSets<K: Eq + Hash> {
    parent: FxHashMap<K, K>,
    rank: FxHashMap<K, u32>,
}

impl<K: Eq + Hash> Default for DisjointSets<K> {
    fn default() -> Self {
        Self {
            parent: FxHashMap::default(),
            rank: FxHashMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> DisjointSets<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative of the class of `key`, creating a singleton if unseen
    pub fn find(&mut self, key: &K) -> K {
        if !self.parent.contains_key(key) {
            self.parent.insert(key.clone(), key.clone());
            self.rank.insert(key.clone(), 0);
            return key.clone();
        }

        let mut root = key.clone();
        while let Some(parent) = self.parent.get(&root) {
            if *parent == root {
                break;
            }
            root = parent.clone();
        }

        // Path compression
        let mut current = key.clone();
        while current != root {
            let next = self.parent.insert(current, root.clone());
            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        root
    }

    /// Representative of `key` without registering or compressing
    pub fn peek(&self, key: &K) -> Option<K> {
        let mut current = self.parent.get(key)?;
        loop {
            let parent = self.parent.get(current)?;
            if parent == current {
                return Some(current.clone());
            }
            current = parent;
        }
    }

    /// Merge the classes of `a` and `b`, returning the new representative
    ///
    /// The higher-rank root survives; on equal rank the root of `a` wins.
    pub fn union(&mut self, a: &K, b: &K) -> K {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return ra;
        }

        let rank_a = self.rank_of(&ra);
        let rank_b = self.rank_of(&rb);
        if rank_a < rank_b {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent.insert(rb, ra.clone());
        if rank_a == rank_b {
            self.rank.insert(ra.clone(), rank_a + 1);
        }
        ra
    }

    /// Whether `a` and `b` are in the same class
    pub fn same(&mut self, a: &K, b: &K) -> bool {
        self.find(a) == self.find(b)
    }

    /// All keys seen so far
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.parent.keys()
    }

    /// Number of keys seen so far
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn rank_of(&self, key: &K) -> u32 {
        self.rank.get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_creates_singleton() {
        let mut dsu: DisjointSets<&str> = DisjointSets::new();
        assert_eq!(dsu.find(&"a"), "a");
        assert_eq!(dsu.len(), 1);
        assert_eq!(dsu.peek(&"b"), None);
    }

    #[test]
    fn test_union_is_transitive() {
        let mut dsu = DisjointSets::new();
        dsu.union(&"x", &"y");
        dsu.union(&"y", &"z");

        assert!(dsu.same(&"x", &"z"));
        assert!(!dsu.same(&"x", &"w"));
    }

    #[test]
    fn test_find_is_idempotent() {
        let mut dsu = DisjointSets::new();
        for (a, b) in [(1, 2), (3, 4), (2, 4), (5, 6), (6, 1)] {
            dsu.union(&a, &b);
        }

        for key in 1..=6 {
            let root = dsu.find(&key);
            assert_eq!(dsu.find(&root), root);
            assert_eq!(dsu.peek(&key), Some(root));
        }
        let root = dsu.find(&1);
        assert!((1..=6).all(|k| dsu.find(&k) == root));
    }

    #[test]
    fn test_union_by_rank_keeps_taller_root() {
        let mut dsu = DisjointSets::new();
        let tall = dsu.union(&1, &2);
        assert_eq!(tall, 1);

        // singleton 3 joins under the rank-1 root regardless of argument order
        assert_eq!(dsu.union(&3, &1), 1);
        assert_eq!(dsu.union(&1, &1), 1);
    }
}
