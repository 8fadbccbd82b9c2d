//! Type queries used by the mapping strategies.
//!
//! All queries are free functions over `&dyn TypeDatabase` so hosts that
//! implement the trait get them for free.

use crate::db::TypeDatabase;
use crate::types::{
    ConstructorInfo, DefFlags, DefKind, EnumInfo, GenericKind, IntrinsicKind, MemberInfo,
    TupleElement, TypeData, TypeId,
};
use mapforge_common::Atom;
use mapforge_common::limits::MAX_INHERITANCE_DEPTH;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;

// =============================================================================
// Nullability
// =============================================================================

pub fn is_nullable(db: &dyn TypeDatabase, id: TypeId) -> bool {
    matches!(db.lookup(id), Some(TypeData::Nullable(_)))
}

/// `T?` → `T`, other types unchanged.
pub fn non_nullable(db: &dyn TypeDatabase, id: TypeId) -> TypeId {
    match db.lookup(id) {
        Some(TypeData::Nullable(inner)) => inner,
        _ => id,
    }
}

/// Whether `null` can be assigned to a value of this type.
pub fn accepts_null(db: &dyn TypeDatabase, id: TypeId) -> bool {
    is_nullable(db, id) || id == TypeId::OBJECT
}

/// Strip nullable *annotations* from reference types, recursively through
/// arrays, generics and tuples. `Nullable<T>` of a value type is a distinct
/// type and is kept.
pub fn strip_annotations(db: &dyn TypeDatabase, id: TypeId) -> TypeId {
    match db.lookup(id) {
        Some(TypeData::Nullable(inner)) => {
            let stripped = strip_annotations(db, inner);
            if is_value_type(db, inner) {
                db.nullable(stripped)
            } else {
                stripped
            }
        }
        Some(TypeData::Array(element)) => {
            let stripped = strip_annotations(db, element);
            if stripped == element {
                id
            } else {
                db.array(stripped)
            }
        }
        Some(TypeData::Generic { kind, args }) => {
            let stripped: SmallVec<[TypeId; 2]> =
                args.iter().map(|arg| strip_annotations(db, *arg)).collect();
            if stripped == args {
                id
            } else {
                db.generic(kind, &stripped)
            }
        }
        Some(TypeData::Tuple(elements)) => {
            let stripped: Vec<TupleElement> = elements
                .iter()
                .map(|e| TupleElement {
                    name: e.name,
                    type_id: strip_annotations(db, e.type_id),
                })
                .collect();
            if stripped.as_slice() == &*elements {
                id
            } else {
                db.tuple(stripped)
            }
        }
        _ => id,
    }
}

/// Type equality with or without nullable annotations.
pub fn types_equal(db: &dyn TypeDatabase, a: TypeId, b: TypeId, include_nullability: bool) -> bool {
    a == b || (!include_nullability && strip_annotations(db, a) == strip_annotations(db, b))
}

/// Nullable reference types become non-nullable, value types are unchanged.
pub fn upgrade_nullable_reference(db: &dyn TypeDatabase, id: TypeId) -> TypeId {
    match db.lookup(id) {
        Some(TypeData::Nullable(inner)) if !is_value_type(db, inner) => inner,
        _ => id,
    }
}

// =============================================================================
// Classification
// =============================================================================

pub fn intrinsic_kind(db: &dyn TypeDatabase, id: TypeId) -> Option<IntrinsicKind> {
    match db.lookup(id)? {
        TypeData::Intrinsic(kind) => Some(kind),
        _ => None,
    }
}

pub fn is_value_type(db: &dyn TypeDatabase, id: TypeId) -> bool {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(kind)) => kind.is_value_type(),
        Some(TypeData::Nullable(inner)) => is_value_type(db, inner),
        Some(TypeData::Array(_)) => false,
        Some(TypeData::Generic { kind, .. }) => kind.is_value_type(),
        Some(TypeData::Tuple(_)) => true,
        Some(TypeData::Named(_)) => db
            .definition(id)
            .is_some_and(|def| def.kind.is_value_type()),
        None => false,
    }
}

pub fn is_reference_type(db: &dyn TypeDatabase, id: TypeId) -> bool {
    db.lookup(id).is_some() && !is_value_type(db, id)
}

pub fn is_string(db: &dyn TypeDatabase, id: TypeId) -> bool {
    non_nullable(db, id) == TypeId::STRING
}

pub fn is_enum(db: &dyn TypeDatabase, id: TypeId) -> bool {
    enum_info(db, id).is_some()
}

pub fn enum_info(db: &dyn TypeDatabase, id: TypeId) -> Option<EnumInfo> {
    let def = db.definition(id)?;
    if def.kind != DefKind::Enum {
        return None;
    }
    def.enum_info.clone()
}

/// Underlying integral type of an enum.
pub fn enum_underlying_type(db: &dyn TypeDatabase, id: TypeId) -> Option<TypeId> {
    enum_info(db, id).map(|info| info.underlying.type_id())
}

pub fn is_array(db: &dyn TypeDatabase, id: TypeId) -> bool {
    matches!(db.lookup(id), Some(TypeData::Array(_)))
}

pub fn array_element(db: &dyn TypeDatabase, id: TypeId) -> Option<TypeId> {
    match db.lookup(id)? {
        TypeData::Array(element) => Some(element),
        _ => None,
    }
}

pub fn tuple_elements(db: &dyn TypeDatabase, id: TypeId) -> Option<Arc<[TupleElement]>> {
    match db.lookup(id)? {
        TypeData::Tuple(elements) => Some(elements),
        _ => None,
    }
}

pub fn generic_parts(db: &dyn TypeDatabase, id: TypeId) -> Option<(GenericKind, SmallVec<[TypeId; 2]>)> {
    match db.lookup(id)? {
        TypeData::Generic { kind, args } => Some((kind, args)),
        _ => None,
    }
}

/// Immutable types are safe to share even when deep cloning is requested.
pub fn is_immutable(db: &dyn TypeDatabase, id: TypeId) -> bool {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(kind)) => kind.is_immutable(),
        Some(TypeData::Nullable(inner)) => is_immutable(db, inner),
        Some(TypeData::Tuple(elements)) => elements.iter().all(|e| is_immutable(db, e.type_id)),
        Some(TypeData::Generic { kind, args }) => {
            kind == GenericKind::KeyValuePair && args.iter().all(|arg| is_immutable(db, *arg))
        }
        Some(TypeData::Named(_)) => db.definition(id).is_some_and(|def| {
            def.kind == DefKind::Enum || def.flags.contains(DefFlags::IMMUTABLE)
        }),
        Some(TypeData::Array(_)) | None => false,
    }
}

/// Nominal class, struct or record that is mapped member by member.
pub fn is_object_like(db: &dyn TypeDatabase, id: TypeId) -> bool {
    db.definition(id).is_some_and(|def| {
        def.kind != DefKind::Enum && def.collection.is_none()
    })
}

pub fn is_abstract(db: &dyn TypeDatabase, id: TypeId) -> bool {
    db.definition(id).is_some_and(|def| def.is_abstract())
}

pub fn has_parse_method(db: &dyn TypeDatabase, id: TypeId) -> bool {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(kind)) => kind.has_parse_method(),
        Some(TypeData::Named(_)) => db
            .definition(id)
            .is_some_and(|def| def.flags.contains(DefFlags::HAS_PARSE_METHOD)),
        _ => false,
    }
}

// =============================================================================
// Members and constructors
// =============================================================================

/// Accessible members including inherited ones. Own members come first and
/// shadow base members with the same name.
pub fn members_of(db: &dyn TypeDatabase, id: TypeId) -> Vec<MemberInfo> {
    let mut members: Vec<MemberInfo> = Vec::new();
    let mut seen: FxHashSet<Atom> = FxHashSet::default();
    let mut current = Some(non_nullable(db, id));
    let mut depth = 0;
    while let Some(type_id) = current {
        if depth > MAX_INHERITANCE_DEPTH {
            break;
        }
        let Some(def) = db.definition(type_id) else {
            break;
        };
        for member in &def.members {
            if seen.insert(member.name) {
                members.push(member.clone());
            }
        }
        current = def.base_type;
        depth += 1;
    }
    members
}

/// Find a member by name, optionally ignoring ASCII case.
pub fn find_member(
    db: &dyn TypeDatabase,
    id: TypeId,
    name: &str,
    ignore_case: bool,
) -> Option<MemberInfo> {
    let members = members_of(db, id);
    if let Some(exact) = members
        .iter()
        .find(|m| &*db.resolve_atom(m.name) == name)
    {
        return Some(exact.clone());
    }
    if !ignore_case {
        return None;
    }
    members
        .into_iter()
        .find(|m| db.resolve_atom(m.name).eq_ignore_ascii_case(name))
}

pub fn constructors_of(db: &dyn TypeDatabase, id: TypeId) -> Vec<ConstructorInfo> {
    db.definition(non_nullable(db, id))
        .map(|def| {
            def.constructors
                .iter()
                .filter(|c| c.is_accessible())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `new T()` compiles. Value types always have one.
pub fn has_parameterless_ctor(db: &dyn TypeDatabase, id: TypeId) -> bool {
    let id = non_nullable(db, id);
    if is_abstract(db, id) {
        return false;
    }
    if is_value_type(db, id) {
        return true;
    }
    match db.lookup(id) {
        Some(TypeData::Generic { kind, .. }) => !kind.is_interface() && !kind.is_value_type(),
        Some(TypeData::Named(_)) => {
            let ctors = constructors_of(db, id);
            ctors.iter().any(ConstructorInfo::is_parameterless)
        }
        _ => false,
    }
}

// =============================================================================
// Inheritance
// =============================================================================

pub fn base_type(db: &dyn TypeDatabase, id: TypeId) -> Option<TypeId> {
    db.definition(non_nullable(db, id))?.base_type
}

/// Whether `derived` is `base` or inherits from / implements it.
pub fn is_derived_from(db: &dyn TypeDatabase, derived: TypeId, base: TypeId) -> bool {
    let derived = non_nullable(db, derived);
    let base = non_nullable(db, base);
    if derived == base || base == TypeId::OBJECT {
        return true;
    }
    let mut stack = vec![derived];
    let mut visited: FxHashSet<TypeId> = FxHashSet::default();
    while let Some(current) = stack.pop() {
        if current == base {
            return true;
        }
        if !visited.insert(current) || visited.len() as u32 > MAX_INHERITANCE_DEPTH * 4 {
            continue;
        }
        if let Some(def) = db.definition(current) {
            stack.extend(def.base_type);
            stack.extend(def.interfaces.iter().copied());
        }
    }
    false
}

/// Number of base classes above this type; `object` and structural types
/// are at depth 0.
pub fn inheritance_depth(db: &dyn TypeDatabase, id: TypeId) -> u32 {
    let mut depth = 0;
    let mut current = base_type(db, id);
    while let Some(base) = current {
        depth += 1;
        if depth >= MAX_INHERITANCE_DEPTH {
            break;
        }
        current = base_type(db, base);
    }
    if db.definition(non_nullable(db, id)).is_some() {
        depth + 1
    } else {
        depth
    }
}

// =============================================================================
// Naming
// =============================================================================

/// Simple name of a type, used for generated method names (`MapToCarDto`).
pub fn simple_name(db: &dyn TypeDatabase, id: TypeId) -> String {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(kind)) => {
            let name = kind.display_name();
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
        Some(TypeData::Nullable(inner)) => simple_name(db, inner),
        Some(TypeData::Array(element)) => format!("{}Array", simple_name(db, element)),
        Some(TypeData::Generic { kind, args }) => {
            let display = kind.display_name();
            let mut name = if kind.is_interface() {
                display[1..].to_string()
            } else {
                display.to_string()
            };
            for arg in args {
                name = format!("{}Of{}", name, simple_name(db, arg));
            }
            name
        }
        Some(TypeData::Tuple(_)) => "ValueTuple".to_string(),
        Some(TypeData::Named(_)) => db
            .definition(id)
            .map(|def| db.resolve_atom(def.name).to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}
