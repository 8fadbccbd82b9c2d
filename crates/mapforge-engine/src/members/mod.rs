//! Member matching between source and target types.

pub mod candidates;
pub mod matcher;
pub mod path;

pub use candidates::{MemberPathCandidateBuilder, pascal_case_chunks};
pub use matcher::MemberMatcher;
pub use path::{MemberPath, PathSegment};
