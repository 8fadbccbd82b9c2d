//! Type interning and definition storage.
//!
//! `TypeInterner` is the reference implementation of [`TypeDatabase`]. Hosts
//! translate their compiler's symbols into it once per compilation; the
//! engine only ever talks to the trait. Interning takes `&self` so several
//! mappers can be resolved against one interner concurrently.

use crate::db::TypeDatabase;
use crate::types::{
    ConstructorFlags, ConstructorInfo, CustomCollection, DefFlags, DefId, DefKind,
    DefinitionInfo, EnumInfo, EnumMember, GenericKind, IntrinsicKind, MemberAccess, MemberInfo,
    ParamInfo, TupleElement, TypeArgs, TypeData, TypeId, UserConversion,
};
use dashmap::DashMap;
use mapforge_common::{Atom, Interner};
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Interns `TypeData` and stores nominal definitions.
#[derive(Debug)]
pub struct TypeInterner {
    atoms: Interner,
    map: DashMap<TypeData, TypeId>,
    types: RwLock<Vec<TypeData>>,
    definitions: RwLock<Vec<Arc<DefinitionInfo>>>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = Self {
            atoms: Interner::new(),
            map: DashMap::new(),
            types: RwLock::new(Vec::new()),
            definitions: RwLock::new(Vec::new()),
        };
        for kind in IntrinsicKind::ALL {
            let id = interner.intern(TypeData::Intrinsic(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        interner
    }

    fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.map.get(&data) {
            return *id;
        }
        let mut types = self
            .types
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(id) = self.map.get(&data) {
            return *id;
        }
        let id = TypeId(types.len() as u32);
        types.push(data.clone());
        self.map.insert(data, id);
        id
    }

    // =========================================================================
    // Nominal types
    // =========================================================================

    /// Declare a nominal type without members. Use [`TypeInterner::define`]
    /// (or a [`DefinitionBuilder`]) afterwards; declaring first allows
    /// self-referential members.
    pub fn declare(&self, name: &str, kind: DefKind) -> TypeId {
        let name = self.atoms.intern(name);
        let def_id = {
            let mut definitions = self
                .definitions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let def_id = DefId(definitions.len() as u32);
            definitions.push(Arc::new(DefinitionInfo::new(kind, name)));
            def_id
        };
        let id = self.intern(TypeData::Named(def_id));
        trace!(type_id = id.0, def_id = def_id.0, ?kind, "declared nominal type");
        id
    }

    /// Replace the definition of a declared nominal type.
    ///
    /// Returns `false` if `type_id` is not a nominal type.
    pub fn define(&self, type_id: TypeId, info: DefinitionInfo) -> bool {
        let Some(TypeData::Named(def_id)) = self.lookup(type_id) else {
            return false;
        };
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match definitions.get_mut(def_id.0 as usize) {
            Some(slot) => {
                *slot = Arc::new(info);
                true
            }
            None => false,
        }
    }

    /// Start building the definition of a declared nominal type.
    pub fn build(&self, type_id: TypeId) -> DefinitionBuilder<'_> {
        let info = self
            .definition(type_id)
            .map(|info| (*info).clone())
            .unwrap_or_else(|| DefinitionInfo::new(DefKind::Class, Atom::EMPTY));
        DefinitionBuilder {
            db: self,
            type_id,
            info,
        }
    }

    /// Declare and start building a class.
    pub fn class(&self, name: &str) -> DefinitionBuilder<'_> {
        let id = self.declare(name, DefKind::Class);
        self.build(id)
    }

    /// Declare and start building a record (immutable by default).
    pub fn record(&self, name: &str) -> DefinitionBuilder<'_> {
        let id = self.declare(name, DefKind::Record);
        self.build(id).flags(DefFlags::IMMUTABLE)
    }

    pub fn structure(&self, name: &str) -> DefinitionBuilder<'_> {
        let id = self.declare(name, DefKind::Struct);
        self.build(id)
    }

    pub fn interface(&self, name: &str) -> DefinitionBuilder<'_> {
        let id = self.declare(name, DefKind::Interface);
        self.build(id)
    }

    /// Declare an enum with `int` underlying type and the given members.
    pub fn enumeration(&self, name: &str, members: &[(&str, i64)]) -> TypeId {
        let id = self.declare(name, DefKind::Enum);
        self.build(id)
            .enum_members(IntrinsicKind::Int, members)
            .finish()
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let types = self
            .types
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        types.get(id.0 as usize).cloned()
    }

    fn definition(&self, id: TypeId) -> Option<Arc<DefinitionInfo>> {
        let TypeData::Named(def_id) = self.lookup(id)? else {
            return None;
        };
        let definitions = self
            .definitions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        definitions.get(def_id.0 as usize).cloned()
    }

    fn intern_string(&self, text: &str) -> Atom {
        self.atoms.intern(text)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.atoms.resolve(atom)
    }

    fn nullable(&self, inner: TypeId) -> TypeId {
        if matches!(self.lookup(inner), Some(TypeData::Nullable(_))) {
            return inner;
        }
        self.intern(TypeData::Nullable(inner))
    }

    fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    fn generic(&self, kind: GenericKind, args: &[TypeId]) -> TypeId {
        debug_assert_eq!(args.len(), kind.arity(), "{kind:?} arity mismatch");
        self.intern(TypeData::Generic {
            kind,
            args: TypeArgs::from_slice(args),
        })
    }

    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        self.intern(TypeData::Tuple(Arc::from(elements)))
    }
}

// =============================================================================
// DefinitionBuilder
// =============================================================================

/// Fluent builder for nominal type definitions.
///
/// ```ignore
/// let car = db.class("Car")
///     .property("Name", TypeId::STRING)
///     .parameterless_ctor()
///     .finish();
/// ```
#[must_use]
pub struct DefinitionBuilder<'a> {
    db: &'a TypeInterner,
    type_id: TypeId,
    info: DefinitionInfo,
}

impl DefinitionBuilder<'_> {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn flags(mut self, flags: DefFlags) -> Self {
        self.info.flags |= flags;
        self
    }

    pub fn base(mut self, base: TypeId) -> Self {
        self.info.base_type = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.info.interfaces.push(interface);
        self
    }

    pub fn member(mut self, name: &str, type_id: TypeId, access: MemberAccess) -> Self {
        let name = self.db.intern_string(name);
        self.info
            .members
            .push(MemberInfo::property(name, type_id, access));
        self
    }

    /// Readable and writable property.
    pub fn property(self, name: &str, type_id: TypeId) -> Self {
        self.member(name, type_id, MemberAccess::READ_WRITE)
    }

    pub fn readonly(self, name: &str, type_id: TypeId) -> Self {
        self.member(name, type_id, MemberAccess::READABLE)
    }

    pub fn init_only(self, name: &str, type_id: TypeId) -> Self {
        self.member(name, type_id, MemberAccess::READ_INIT)
    }

    pub fn required(self, name: &str, type_id: TypeId) -> Self {
        self.member(
            name,
            type_id,
            MemberAccess::READ_INIT | MemberAccess::REQUIRED,
        )
    }

    pub fn field(mut self, name: &str, type_id: TypeId) -> Self {
        let name = self.db.intern_string(name);
        self.info.members.push(MemberInfo {
            name,
            type_id,
            access: MemberAccess::READ_WRITE,
            is_field: true,
        });
        self
    }

    pub fn ctor_with_flags(mut self, params: &[(&str, TypeId)], flags: ConstructorFlags) -> Self {
        let params = params
            .iter()
            .map(|(name, type_id)| ParamInfo {
                name: self.db.intern_string(name),
                type_id: *type_id,
                has_default: false,
            })
            .collect();
        self.info.constructors.push(ConstructorInfo {
            params,
            flags: flags | ConstructorFlags::ACCESSIBLE,
        });
        self
    }

    pub fn ctor(self, params: &[(&str, TypeId)]) -> Self {
        self.ctor_with_flags(params, ConstructorFlags::ACCESSIBLE)
    }

    pub fn parameterless_ctor(self) -> Self {
        self.ctor(&[])
    }

    pub fn constructor(mut self, ctor: ConstructorInfo) -> Self {
        self.info.constructors.push(ctor);
        self
    }

    pub fn enum_members(mut self, underlying: IntrinsicKind, members: &[(&str, i64)]) -> Self {
        let members = members
            .iter()
            .map(|(name, value)| EnumMember {
                name: self.db.intern_string(name),
                value: *value,
            })
            .collect();
        self.info.enum_info = Some(EnumInfo {
            underlying,
            members,
        });
        self
    }

    pub fn conversion(mut self, from: TypeId, to: TypeId, implicit: bool) -> Self {
        self.info.conversions.push(UserConversion { from, to, implicit });
        self
    }

    pub fn collection(mut self, implements: GenericKind, args: &[TypeId]) -> Self {
        self.info.collection = Some(CustomCollection {
            implements,
            args: TypeArgs::from_slice(args),
            has_add_method: true,
        });
        self
    }

    /// Store the definition and return the nominal type id.
    pub fn finish(self) -> TypeId {
        let defined = self.db.define(self.type_id, self.info);
        debug_assert!(defined, "definition builder used on a non-nominal type");
        self.type_id
    }
}
