//! Collision-free names for generated methods and locals.

use mapforge_common::limits::MAX_UNIQUE_NAME_SUFFIX;
use rustc_hash::FxHashSet;

/// Hands out names that do not collide with anything reserved or handed
/// out before. Collisions get a numeric suffix: `MapToCar`, `MapToCar1`, ...
#[derive(Clone, Debug, Default)]
pub struct UniqueNameBuilder {
    used: FxHashSet<String>,
}

impl UniqueNameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as taken, e.g. a user declared method.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn new_name(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        for suffix in 1..MAX_UNIQUE_NAME_SUFFIX {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
        // Exhausted; fall back to a name derived from the set size.
        let candidate = format!("{base}_{}", self.used.len());
        self.used.insert(candidate.clone());
        candidate
    }

    /// Builder for a nested scope (method locals) that sees every name of
    /// this scope but does not leak new names back.
    pub fn new_scope(&self) -> Self {
        self.clone()
    }
}
