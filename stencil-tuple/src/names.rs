//! Dimension-name interning.
//!
//! Tuples are compared and combined by dimension name constantly, so names are
//! interned once and then compared by identity. The interner is an explicit
//! object owned by whatever context builds the tuples; clones share one table.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

struct NameEntry {
    seq: usize,
    text: Box<str>,
}

/// An interned dimension name.
///
/// Equality and hashing use the identity of the interned entry, not the text:
/// two names are equal iff they came from the same [`DimNames`] entry. Ordering
/// follows interning order, which is deterministic for a given build sequence.
#[derive(Clone)]
pub struct DimName(Arc<NameEntry>);

impl DimName {
    /// The name text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// Position of this name in its interner's insertion order.
    #[inline]
    pub fn seq(&self) -> usize {
        self.0.seq
    }

    #[inline]
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for DimName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DimName {}

impl Hash for DimName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl PartialOrd for DimName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DimName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Names from different interners may share a seq; fall back to identity.
        self.seq()
            .cmp(&other.seq())
            .then_with(|| self.addr().cmp(&other.addr()))
    }
}

impl fmt::Display for DimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DimName({:?}#{})", self.as_str(), self.seq())
    }
}

impl AsRef<str> for DimName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Default)]
struct Table {
    by_text: HashMap<Box<str>, DimName>,
    order: Vec<DimName>,
}

/// Thread-safe dimension-name interner.
///
/// Interning is idempotent and entries are never removed, so a [`DimName`]
/// stays valid (and keeps its identity) for as long as anything holds it.
/// Cloning a `DimNames` shares the underlying table.
#[derive(Clone, Default)]
pub struct DimNames {
    table: Arc<RwLock<Table>>,
}

impl DimNames {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing identity if it was seen before.
    pub fn intern(&self, name: &str) -> DimName {
        if let Some(found) = self.table.read().by_text.get(name) {
            return found.clone();
        }

        let mut table = self.table.write();
        // Another thread may have inserted between the two locks.
        if let Some(found) = table.by_text.get(name) {
            return found.clone();
        }
        let entry = DimName(Arc::new(NameEntry {
            seq: table.order.len(),
            text: name.into(),
        }));
        table.by_text.insert(name.into(), entry.clone());
        table.order.push(entry.clone());
        debug!(name, seq = entry.seq(), "interned dimension name");
        entry
    }

    /// Intern every name in order.
    pub fn intern_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<DimName> {
        names.into_iter().map(|n| self.intern(n)).collect()
    }

    /// Look up a name without interning it.
    pub fn get(&self, name: &str) -> Option<DimName> {
        self.table.read().by_text.get(name).cloned()
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.table.read().order.len()
    }

    /// True if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all names in interning order.
    pub fn names(&self) -> Vec<DimName> {
        self.table.read().order.clone()
    }
}

impl fmt::Debug for DimNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        f.debug_list()
            .entries(table.order.iter().map(|n| n.as_str()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_intern_idempotent() {
        let names = DimNames::new();
        let a = names.intern("x");
        let b = names.intern("x");
        let c = names.intern("y");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(names.len(), 2);
        assert_eq!(a.as_str(), "x");
        assert_eq!(c.seq(), 1);
    }

    #[test]
    fn test_identity_not_text() {
        // Same text from two separate interners is two different dimensions.
        let n1 = DimNames::new();
        let n2 = DimNames::new();
        let a = n1.intern("x");
        let b = n2.intern("x");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), b.as_str());
        assert_ne!(a.cmp(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_clone_shares_table() {
        let names = DimNames::new();
        let shared = names.clone();
        let a = names.intern("t");
        assert_eq!(shared.get("t"), Some(a));
        assert_eq!(shared.get("u"), None);
        assert!(!shared.is_empty());
    }

    #[test]
    fn test_order_and_hash() {
        let names = DimNames::new();
        let v = names.intern_all(["z", "y", "x", "y"]);
        assert!(v[0] < v[1]);
        assert!(v[1] < v[2]);
        assert_eq!(v[1], v[3]);
        let set: HashSet<DimName> = v.into_iter().collect();
        assert_eq!(set.len(), 3);
        let listed: Vec<String> = names.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(listed, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_concurrent_interning() {
        let names = DimNames::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let names = names.clone();
                std::thread::spawn(move || {
                    (0..64)
                        .map(|i| names.intern(&format!("d{}", (i + t) % 16)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<Vec<DimName>> = handles
            .into_iter()
            .map(|h| h.join().expect("interning thread panicked"))
            .collect();

        assert_eq!(names.len(), 16);
        for per_thread in &results {
            for name in per_thread {
                assert_eq!(names.get(name.as_str()).as_ref(), Some(name));
            }
        }
    }
}
