//! Member paths: `source.Customer.Address.Id`.

use mapforge_common::Atom;
use mapforge_common::limits::MAX_MEMBER_PATH_SEGMENTS;
use mapforge_types::queries::{
    find_member, is_nullable, non_nullable, tuple_elements, upgrade_nullable_reference,
};
use mapforge_types::{TypeDatabase, TypeId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: Atom,
    /// Declared type of the member, nullable if declared nullable.
    pub type_id: TypeId,
    pub readable: bool,
}

/// Path from a root value through nested members. An empty path is the
/// root value itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberPath {
    pub root: TypeId,
    pub segments: Vec<PathSegment>,
}

impl MemberPath {
    pub fn root(root: TypeId) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    /// Resolve `names` one member at a time starting at `root`. Nullable
    /// intermediate members are walked through their non-nullable type.
    pub fn resolve<S: AsRef<str>>(
        db: &dyn TypeDatabase,
        root: TypeId,
        names: &[S],
        ignore_case: bool,
    ) -> Option<Self> {
        if names.is_empty() || names.len() > MAX_MEMBER_PATH_SEGMENTS {
            return None;
        }
        let mut segments = Vec::with_capacity(names.len());
        let mut current = root;
        for name in names {
            let segment = lookup(db, non_nullable(db, current), name.as_ref(), ignore_case)?;
            current = segment.type_id;
            segments.push(segment);
        }
        Some(Self { root, segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Type of the value the path points to.
    pub fn member_type(&self) -> TypeId {
        self.segments.last().map_or(self.root, |s| s.type_id)
    }

    pub fn is_readable(&self) -> bool {
        self.segments.iter().all(|s| s.readable)
    }

    /// Lengths of the prefixes that need a null check before the path can
    /// be read: every nullable segment except the last one. With
    /// `upgrade_references` only nullable value types count, as in
    /// expression mode.
    pub fn nullable_prefixes(&self, db: &dyn TypeDatabase, upgrade_references: bool) -> Vec<usize> {
        let Some((_, prefix)) = self.segments.split_last() else {
            return Vec::new();
        };
        prefix
            .iter()
            .enumerate()
            .filter(|(_, s)| is_nullable_in_mode(db, s.type_id, upgrade_references))
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn has_nullable_prefix(&self, db: &dyn TypeDatabase, upgrade_references: bool) -> bool {
        !self.nullable_prefixes(db, upgrade_references).is_empty()
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            root: self.root,
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    pub fn names(&self, db: &dyn TypeDatabase) -> Vec<String> {
        self.segments
            .iter()
            .map(|s| db.resolve_atom(s.name).to_string())
            .collect()
    }

    /// `Customer.Address.Id`.
    pub fn full_name(&self, db: &dyn TypeDatabase) -> String {
        self.names(db).join(".")
    }
}

fn lookup(db: &dyn TypeDatabase, owner: TypeId, name: &str, ignore_case: bool) -> Option<PathSegment> {
    if let Some(elements) = tuple_elements(db, owner) {
        return elements.iter().enumerate().find_map(|(i, element)| {
            let positional = format!("Item{}", i + 1);
            let named = element.name.is_some_and(|n| {
                let n = db.resolve_atom(n);
                if ignore_case {
                    n.eq_ignore_ascii_case(name)
                } else {
                    &*n == name
                }
            });
            (named || positional == name).then(|| PathSegment {
                name: element.name.unwrap_or_else(|| db.intern_string(&positional)),
                type_id: element.type_id,
                readable: true,
            })
        });
    }
    let member = find_member(db, owner, name, ignore_case)?;
    Some(PathSegment {
        name: member.name,
        type_id: member.type_id,
        readable: member.access.can_get(),
    })
}

/// Nullability as seen by generated code; expression mode treats nullable
/// reference types as non-nullable.
pub fn is_nullable_in_mode(db: &dyn TypeDatabase, id: TypeId, upgrade_references: bool) -> bool {
    if upgrade_references {
        is_nullable(db, upgrade_nullable_reference(db, id))
    } else {
        is_nullable(db, id)
    }
}
