//! Capability-style type introspection surface.
//!
//! The engine consumes types only through this trait: identity via `TypeId`,
//! structure via `lookup`, nominal details via `definition`, and a few
//! constructors for the framework types it needs to name (the nullable form
//! of a type, `List<T>` for a collected sequence, ...). Everything else is a
//! free function in [`crate::queries`] built on top of it.

use crate::types::{DefinitionInfo, GenericKind, TupleElement, TypeData, TypeId};
use mapforge_common::Atom;
use std::sync::Arc;

pub trait TypeDatabase {
    fn lookup(&self, id: TypeId) -> Option<TypeData>;

    /// Definition of a nominal type, `None` for structural types.
    fn definition(&self, id: TypeId) -> Option<Arc<DefinitionInfo>>;

    fn intern_string(&self, text: &str) -> Atom;

    fn resolve_atom(&self, atom: Atom) -> Arc<str>;

    /// `T?`. Idempotent: the nullable form of `T?` is `T?`.
    fn nullable(&self, inner: TypeId) -> TypeId;

    fn array(&self, element: TypeId) -> TypeId;

    /// Well-known framework generic by logical name, e.g. `List<T>`.
    fn generic(&self, kind: GenericKind, args: &[TypeId]) -> TypeId;

    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId;
}
