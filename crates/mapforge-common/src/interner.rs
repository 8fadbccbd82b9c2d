//! String interning for identifiers.
//!
//! Member names, type names and generated method names are compared far more
//! often than they are created, so every name is stored once and referred to
//! by an [`Atom`]. The interner takes `&self` so one instance can be shared by
//! the type store and every mapper resolved against it.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Interned string handle. Equality is O(1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string, always interned first.
    pub const EMPTY: Self = Self(0);
}

/// Thread-safe string interner.
#[derive(Debug)]
pub struct Interner {
    map: DashMap<Arc<str>, Atom>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let interner = Self {
            map: DashMap::new(),
            strings: RwLock::new(Vec::new()),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Atom::EMPTY);
        interner
    }

    /// Intern a string, returning the existing atom if it was seen before.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(atom) = self.map.get(text) {
            return *atom;
        }
        let mut strings = self
            .strings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another writer may have inserted it between the read and the lock.
        if let Some(atom) = self.map.get(text) {
            return *atom;
        }
        let atom = Atom(strings.len() as u32);
        let shared: Arc<str> = Arc::from(text);
        strings.push(Arc::clone(&shared));
        self.map.insert(shared, atom);
        atom
    }

    /// Resolve an atom back to its text. Unknown atoms resolve to `""`.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let strings = self
            .strings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Look up an atom without interning.
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.map.get(text).map(|atom| *atom)
    }

    pub fn len(&self) -> usize {
        self.strings
            .read()
            .map(|strings| strings.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
