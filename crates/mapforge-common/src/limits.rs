//! Centralized limits and thresholds for the mapping engine.
//!
//! Resolution itself terminates through memoization of mapping shells, so
//! these limits only bound the places where the engine expands type graphs
//! without a memo table (projection inlining, member path search).

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Default maximum depth for inlining nested object mappings into a single
/// projection expression.
///
/// Projection expressions cannot call back into a generated method, so a
/// self-referential type (`Node.Children: List<Node>`) is unrolled until
/// this depth and the member is left unmapped beyond it.
pub const DEFAULT_PROJECTION_MAX_RECURSION_DEPTH: u32 = 8;

/// Maximum number of members a flattened source path may traverse.
///
/// `CustomerAddressStreetName` yields at most 4 segments; paths deeper than
/// this are not generated by the fuzzy candidate builder.
pub const MAX_MEMBER_PATH_SEGMENTS: usize = 16;

/// Maximum number of PascalCase chunks considered for fuzzy member matching.
///
/// The candidate count is `2^(chunks - 1)`, so names with more chunks than
/// this are only matched exactly.
pub const MAX_FUZZY_MATCH_CHUNKS: usize = 12;

/// Maximum depth of inheritance chains walked by type queries.
pub const MAX_INHERITANCE_DEPTH: u32 = 64;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial capacity of the mapping arena for one mapper.
pub const INITIAL_MAPPING_CAPACITY: usize = 64;

/// Maximum numeric suffix tried when deduplicating generated names.
pub const MAX_UNIQUE_NAME_SUFFIX: u32 = 10_000;
