//! Source member lookup for a target member name.

use super::candidates::MemberPathCandidateBuilder;
use super::path::MemberPath;
use mapforge_types::{TypeDatabase, TypeId};
use tracing::trace;

/// Finds the source path a target member is mapped from:
/// 1. a source member with exactly the same name
/// 2. the same name ignoring case, if the configuration allows it
/// 3. the first fuzzy candidate path that resolves
pub struct MemberMatcher<'a> {
    db: &'a dyn TypeDatabase,
    source: TypeId,
    ignore_case: bool,
}

impl<'a> MemberMatcher<'a> {
    pub fn new(db: &'a dyn TypeDatabase, source: TypeId, ignore_case: bool) -> Self {
        Self {
            db,
            source,
            ignore_case,
        }
    }

    pub fn find_source_path(&self, target_name: &str) -> Option<MemberPath> {
        if let Some(path) = MemberPath::resolve(self.db, self.source, &[target_name], false) {
            return Some(path);
        }
        if self.ignore_case {
            if let Some(path) = MemberPath::resolve(self.db, self.source, &[target_name], true) {
                return Some(path);
            }
        }
        let found = MemberPathCandidateBuilder::build(target_name)
            .find_map(|candidate| MemberPath::resolve(self.db, self.source, &candidate, self.ignore_case));
        if let Some(path) = &found {
            trace!(
                target = target_name,
                source = %path.full_name(self.db),
                "fuzzy member match"
            );
        }
        found
    }

    /// Explicitly configured source path, `[]` meaning the source itself.
    pub fn resolve_configured<S: AsRef<str>>(&self, names: &[S]) -> Option<MemberPath> {
        if names.is_empty() {
            return Some(MemberPath::root(self.source));
        }
        MemberPath::resolve(self.db, self.source, names, self.ignore_case)
    }
}
