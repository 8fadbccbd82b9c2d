//! Type introspection surface for the mapping engine.
//!
//! The engine needs a capability-style view of the host's type system:
//! identity, nullability, value/reference-ness, members, constructors,
//! conversions and collection shapes. This crate defines that view
//! (`TypeDatabase`) plus `TypeInterner`, an interning implementation hosts
//! fill from their compiler's symbols and tests fill by hand.
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Nullable annotations are ordinary types (`TypeData::Nullable`), so
//!   nullability-aware and nullability-agnostic equality are both cheap
//! - Definitions are declared before they are defined, so self-referential
//!   types (`Node.Children: List<Node>`) can be described
pub mod collections;
pub mod conversions;
mod db;
mod format;
mod intern;
pub mod queries;
pub mod types;

pub use collections::{CollectionInfo, CollectionType, ImplementedCollections, collection_info};
pub use conversions::{ConversionKind, classify_conversion};
pub use db::TypeDatabase;
pub use format::TypeFormatter;
pub use intern::{DefinitionBuilder, TypeInterner};
pub use types::{
    ConstructorFlags, ConstructorInfo, CustomCollection, DefFlags, DefId, DefKind,
    DefinitionInfo, EnumInfo, EnumMember, GenericKind, IntrinsicKind, MemberAccess, MemberInfo,
    ParamInfo, TupleElement, TypeArgs, TypeData, TypeId, UserConversion,
};

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
#[cfg(test)]
#[path = "../tests/queries_tests.rs"]
mod queries_tests;
#[cfg(test)]
#[path = "../tests/conversion_tests.rs"]
mod conversion_tests;
#[cfg(test)]
#[path = "../tests/collection_tests.rs"]
mod collection_tests;
