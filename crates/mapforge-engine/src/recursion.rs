//! Recursion guard for the eager parts of the engine.
//!
//! Standard resolution never recurses deeply: shells are memoized before
//! their bodies are built through the queue. Expression-restricted builds
//! cannot use that trick (an expression cannot call itself), so they build
//! nested bodies eagerly and need explicit bounds:
//! - **Re-entry limiting** per key, a type pair may appear on the current
//!   path a bounded number of times (projection depth)
//! - **Cycle detection** when a key may not re-enter at all (inlining a user
//!   method that calls itself)
//! - **Iteration bounding** as a global work budget
//!
//! # Profiles
//!
//! ```ignore
//! let mut guard = RecursionGuard::with_profile(RecursionProfile::UserMethodInlining);
//! match guard.enter(mapping_id) {
//!     RecursionResult::Entered => { /* ... */ guard.leave(mapping_id); }
//!     RecursionResult::Cycle => abandon_inlining(),
//!     _ => give_up(),
//! }
//! ```

use rustc_hash::FxHashMap;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Eager body building in expression mode.
    ///
    /// `max_depth` is how often one type pair may be nested in itself,
    /// configured per mapper.
    ///
    /// re-entries = max_depth, depth = 256, iterations = 100,000
    ProjectionInlining { max_depth: u32 },

    /// Rewriting user implemented bodies into a projection. A method may
    /// not be inlined into itself.
    ///
    /// re-entries = 1, depth = 32, iterations = 10,000
    UserMethodInlining,

    /// Custom limits for one-off or test scenarios.
    Custom {
        max_reentries: u32,
        max_depth: u32,
        max_iterations: u32,
    },
}

impl RecursionProfile {
    /// How many times one key may be active at once.
    pub const fn max_reentries(self) -> u32 {
        match self {
            Self::ProjectionInlining { max_depth } => max_depth,
            Self::UserMethodInlining => 1,
            Self::Custom { max_reentries, .. } => max_reentries,
        }
    }

    /// Maximum total nesting depth.
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ProjectionInlining { .. } => 256,
            Self::UserMethodInlining => 32,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::ProjectionInlining { .. } => 100_000,
            Self::UserMethodInlining => 10_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already active and may not re-enter.
    Cycle,
    /// The key re-entered too often, or total nesting is too deep.
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks active keys with multiplicity.
///
/// In debug builds dropping a guard with active entries panics, catching a
/// forgotten `leave()`.
#[derive(Debug)]
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    active: FxHashMap<K, u32>,
    depth: u32,
    iterations: u32,
    max_reentries: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self {
            active: FxHashMap::default(),
            depth: 0,
            iterations: 0,
            max_reentries: profile.max_reentries().max(1),
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
            exceeded: false,
        }
    }

    /// Try to enter `key`. On `Entered` the caller must `leave(key)`.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        let count = self.active.get(&key).copied().unwrap_or(0);
        if count >= self.max_reentries {
            if self.max_reentries == 1 {
                return RecursionResult::Cycle;
            }
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        self.active.insert(key, count + 1);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let remaining = match self.active.get_mut(&key) {
            Some(count) => {
                *count -= 1;
                *count
            }
            None => {
                debug_assert!(false, "RecursionGuard::leave() without a matching enter()");
                return;
            }
        };
        if remaining == 0 {
            self.active.remove(&key);
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// How often `key` is active right now.
    #[inline]
    pub fn active_count(&self, key: &K) -> u32 {
        self.active.get(key).copied().unwrap_or(0)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_reentries(&self) -> u32 {
        self.max_reentries
    }

    /// Sticky: stays set once any limit was hit.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.active.is_empty(),
                "RecursionGuard dropped with {} active entries",
                self.active.len()
            );
        }
    }
}
