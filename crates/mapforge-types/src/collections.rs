//! Collection classification.
//!
//! Mapping strategies decide between a cast, a LINQ-style `Select` + collect
//! call, or an element-by-element loop based on the shape of both sides.
//! `collection_info` answers all of those questions with one lookup.

use crate::db::TypeDatabase;
use crate::queries::{has_parameterless_ctor, non_nullable};
use crate::types::{GenericKind, TypeData, TypeId};
use bitflags::bitflags;

/// Concrete shape of a collection type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionType {
    Array,
    Span,
    ReadOnlySpan,
    Memory,
    ReadOnlyMemory,
    Enumerable,
    Collection,
    ReadOnlyCollection,
    IList,
    ReadOnlyList,
    List,
    ISet,
    ReadOnlySet,
    HashSet,
    SortedSet,
    Stack,
    Queue,
    ImmutableArray,
    ImmutableList,
    ImmutableHashSet,
    ImmutableSortedSet,
    ImmutableQueue,
    ImmutableStack,
    IDictionary,
    ReadOnlyDictionary,
    Dictionary,
    SortedDictionary,
    ImmutableDictionary,
    ImmutableSortedDictionary,
    Queryable,
    /// User type implementing a collection interface.
    Custom,
}

bitflags! {
    /// Collection interfaces a type implements.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ImplementedCollections: u16 {
        const ENUMERABLE = 1 << 0;
        const COLLECTION = 1 << 1;
        const READ_ONLY_COLLECTION = 1 << 2;
        const LIST = 1 << 3;
        const READ_ONLY_LIST = 1 << 4;
        const SET = 1 << 5;
        const READ_ONLY_SET = 1 << 6;
        const DICTIONARY = 1 << 7;
        const READ_ONLY_DICTIONARY = 1 << 8;
        const QUERYABLE = 1 << 9;
    }
}

impl ImplementedCollections {
    const E: Self = Self::ENUMERABLE;
    const C: Self = Self::ENUMERABLE.union(Self::COLLECTION);
    const RC: Self = Self::ENUMERABLE.union(Self::READ_ONLY_COLLECTION);

    /// Interfaces implemented by a well-known generic type.
    pub const fn of_generic(kind: GenericKind) -> Self {
        match kind {
            GenericKind::KeyValuePair
            | GenericKind::Span
            | GenericKind::ReadOnlySpan
            | GenericKind::Memory
            | GenericKind::ReadOnlyMemory => Self::empty(),
            GenericKind::Enumerable | GenericKind::ImmutableQueue | GenericKind::ImmutableStack => {
                Self::E
            }
            GenericKind::Collection => Self::C,
            GenericKind::ReadOnlyCollection | GenericKind::Stack | GenericKind::Queue => Self::RC,
            GenericKind::IList => Self::C.union(Self::LIST),
            GenericKind::ReadOnlyList
            | GenericKind::ImmutableArray
            | GenericKind::ImmutableList => Self::RC.union(Self::READ_ONLY_LIST),
            GenericKind::List => Self::C
                .union(Self::RC)
                .union(Self::LIST)
                .union(Self::READ_ONLY_LIST),
            GenericKind::ISet => Self::C.union(Self::SET),
            GenericKind::ReadOnlySet
            | GenericKind::ImmutableHashSet
            | GenericKind::ImmutableSortedSet => Self::RC.union(Self::READ_ONLY_SET),
            GenericKind::HashSet | GenericKind::SortedSet => Self::C
                .union(Self::RC)
                .union(Self::SET)
                .union(Self::READ_ONLY_SET),
            GenericKind::IDictionary => Self::C.union(Self::DICTIONARY),
            GenericKind::ReadOnlyDictionary
            | GenericKind::ImmutableDictionary
            | GenericKind::ImmutableSortedDictionary => {
                Self::RC.union(Self::READ_ONLY_DICTIONARY)
            }
            GenericKind::Dictionary | GenericKind::SortedDictionary => Self::C
                .union(Self::RC)
                .union(Self::DICTIONARY)
                .union(Self::READ_ONLY_DICTIONARY),
            GenericKind::Queryable => Self::E.union(Self::QUERYABLE),
        }
    }

    /// Arrays implement the list interfaces.
    pub const ARRAY: Self = Self::C
        .union(Self::RC)
        .union(Self::LIST)
        .union(Self::READ_ONLY_LIST);

    /// The flag an interface kind corresponds to, if it is an interface.
    pub const fn of_interface(kind: GenericKind) -> Option<Self> {
        match kind {
            GenericKind::Enumerable => Some(Self::ENUMERABLE),
            GenericKind::Collection => Some(Self::COLLECTION),
            GenericKind::ReadOnlyCollection => Some(Self::READ_ONLY_COLLECTION),
            GenericKind::IList => Some(Self::LIST),
            GenericKind::ReadOnlyList => Some(Self::READ_ONLY_LIST),
            GenericKind::ISet => Some(Self::SET),
            GenericKind::ReadOnlySet => Some(Self::READ_ONLY_SET),
            GenericKind::IDictionary => Some(Self::DICTIONARY),
            GenericKind::ReadOnlyDictionary => Some(Self::READ_ONLY_DICTIONARY),
            GenericKind::Queryable => Some(Self::QUERYABLE),
            _ => None,
        }
    }
}

/// Everything the collection strategies need to know about one side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionInfo {
    pub type_id: TypeId,
    pub collection_type: CollectionType,
    pub implemented: ImplementedCollections,
    /// Element type; `KeyValuePair<K, V>` for dictionaries.
    pub element: TypeId,
    /// Key and value types when the elements are key value pairs.
    pub key_value: Option<(TypeId, TypeId)>,
    /// Immutable collections cannot be populated after construction.
    pub immutable: bool,
    /// `Count` / `Length` is available without enumerating.
    pub countable: bool,
    /// An `Add` method (or indexer setter) is available.
    pub has_add_method: bool,
}

impl CollectionInfo {
    pub fn is_dictionary(&self) -> bool {
        self.implemented.intersects(
            ImplementedCollections::DICTIONARY | ImplementedCollections::READ_ONLY_DICTIONARY,
        )
    }

    pub fn is_array(&self) -> bool {
        self.collection_type == CollectionType::Array
    }

    pub fn is_span(&self) -> bool {
        matches!(
            self.collection_type,
            CollectionType::Span | CollectionType::ReadOnlySpan
        )
    }

    pub fn is_memory(&self) -> bool {
        matches!(
            self.collection_type,
            CollectionType::Memory | CollectionType::ReadOnlyMemory
        )
    }

    pub fn is_queryable(&self) -> bool {
        self.collection_type == CollectionType::Queryable
    }

    /// Sequences that can be iterated with `foreach` / LINQ.
    pub fn is_enumerable(&self) -> bool {
        self.implemented.contains(ImplementedCollections::ENUMERABLE) || self.is_array()
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.collection_type,
            CollectionType::Enumerable
                | CollectionType::Collection
                | CollectionType::ReadOnlyCollection
                | CollectionType::IList
                | CollectionType::ReadOnlyList
                | CollectionType::ISet
                | CollectionType::ReadOnlySet
                | CollectionType::IDictionary
                | CollectionType::ReadOnlyDictionary
                | CollectionType::Queryable
        )
    }

    /// Name of the count member, `Length` for arrays and spans.
    pub fn count_member(&self) -> Option<&'static str> {
        if !self.countable {
            return None;
        }
        if self.is_array() || self.is_span() || self.is_memory() {
            Some("Length")
        } else {
            Some("Count")
        }
    }
}

pub fn is_collection(db: &dyn TypeDatabase, id: TypeId) -> bool {
    collection_info(db, id).is_some()
}

/// Classify a type as a collection. Strings are not collections here even
/// though they enumerate chars.
pub fn collection_info(db: &dyn TypeDatabase, id: TypeId) -> Option<CollectionInfo> {
    let id = non_nullable(db, id);
    match db.lookup(id)? {
        TypeData::Array(element) => Some(CollectionInfo {
            type_id: id,
            collection_type: CollectionType::Array,
            implemented: ImplementedCollections::ARRAY,
            element,
            key_value: key_value_of(db, element),
            immutable: false,
            countable: true,
            has_add_method: false,
        }),
        TypeData::Generic { kind, args } => {
            let collection_type = collection_type_of(kind)?;
            let implemented = ImplementedCollections::of_generic(kind);
            let (element, key_value) = if kind.arity() == 2 {
                let element = db.generic(GenericKind::KeyValuePair, &[args[0], args[1]]);
                (element, Some((args[0], args[1])))
            } else {
                (args[0], key_value_of(db, args[0]))
            };
            let immutable = matches!(
                kind,
                GenericKind::ImmutableArray
                    | GenericKind::ImmutableList
                    | GenericKind::ImmutableHashSet
                    | GenericKind::ImmutableSortedSet
                    | GenericKind::ImmutableQueue
                    | GenericKind::ImmutableStack
                    | GenericKind::ImmutableDictionary
                    | GenericKind::ImmutableSortedDictionary
            );
            let countable = matches!(
                kind,
                GenericKind::Span
                    | GenericKind::ReadOnlySpan
                    | GenericKind::Memory
                    | GenericKind::ReadOnlyMemory
            ) || implemented.intersects(
                ImplementedCollections::COLLECTION | ImplementedCollections::READ_ONLY_COLLECTION,
            );
            let has_add_method = !immutable
                && implemented.intersects(
                    ImplementedCollections::COLLECTION | ImplementedCollections::DICTIONARY,
                )
                || matches!(kind, GenericKind::Stack | GenericKind::Queue);
            Some(CollectionInfo {
                type_id: id,
                collection_type,
                implemented,
                element,
                key_value,
                immutable,
                countable,
                has_add_method,
            })
        }
        TypeData::Named(_) => {
            let def = db.definition(id)?;
            let custom = def.collection.as_ref()?;
            let implemented = ImplementedCollections::of_generic(custom.implements);
            let (element, key_value) = if custom.implements.arity() == 2 {
                let (key, value) = (custom.args[0], custom.args[1]);
                (
                    db.generic(GenericKind::KeyValuePair, &[key, value]),
                    Some((key, value)),
                )
            } else {
                (custom.args[0], key_value_of(db, custom.args[0]))
            };
            Some(CollectionInfo {
                type_id: id,
                collection_type: CollectionType::Custom,
                implemented,
                element,
                key_value,
                immutable: false,
                countable: implemented.intersects(
                    ImplementedCollections::COLLECTION
                        | ImplementedCollections::READ_ONLY_COLLECTION,
                ),
                has_add_method: custom.has_add_method,
            })
        }
        _ => None,
    }
}

/// `(K, V)` if the type is `KeyValuePair<K, V>`.
pub fn key_value_of(db: &dyn TypeDatabase, element: TypeId) -> Option<(TypeId, TypeId)> {
    match db.lookup(element)? {
        TypeData::Generic {
            kind: GenericKind::KeyValuePair,
            args,
        } => Some((args[0], args[1])),
        _ => None,
    }
}

const fn collection_type_of(kind: GenericKind) -> Option<CollectionType> {
    Some(match kind {
        GenericKind::KeyValuePair => return None,
        GenericKind::Enumerable => CollectionType::Enumerable,
        GenericKind::Collection => CollectionType::Collection,
        GenericKind::ReadOnlyCollection => CollectionType::ReadOnlyCollection,
        GenericKind::IList => CollectionType::IList,
        GenericKind::ReadOnlyList => CollectionType::ReadOnlyList,
        GenericKind::List => CollectionType::List,
        GenericKind::ISet => CollectionType::ISet,
        GenericKind::ReadOnlySet => CollectionType::ReadOnlySet,
        GenericKind::HashSet => CollectionType::HashSet,
        GenericKind::SortedSet => CollectionType::SortedSet,
        GenericKind::Stack => CollectionType::Stack,
        GenericKind::Queue => CollectionType::Queue,
        GenericKind::ImmutableArray => CollectionType::ImmutableArray,
        GenericKind::ImmutableList => CollectionType::ImmutableList,
        GenericKind::ImmutableHashSet => CollectionType::ImmutableHashSet,
        GenericKind::ImmutableSortedSet => CollectionType::ImmutableSortedSet,
        GenericKind::ImmutableQueue => CollectionType::ImmutableQueue,
        GenericKind::ImmutableStack => CollectionType::ImmutableStack,
        GenericKind::IDictionary => CollectionType::IDictionary,
        GenericKind::ReadOnlyDictionary => CollectionType::ReadOnlyDictionary,
        GenericKind::Dictionary => CollectionType::Dictionary,
        GenericKind::SortedDictionary => CollectionType::SortedDictionary,
        GenericKind::ImmutableDictionary => CollectionType::ImmutableDictionary,
        GenericKind::ImmutableSortedDictionary => CollectionType::ImmutableSortedDictionary,
        GenericKind::Span => CollectionType::Span,
        GenericKind::ReadOnlySpan => CollectionType::ReadOnlySpan,
        GenericKind::Memory => CollectionType::Memory,
        GenericKind::ReadOnlyMemory => CollectionType::ReadOnlyMemory,
        GenericKind::Queryable => CollectionType::Queryable,
    })
}

/// Whether `source` implements the collection interface `target` with the
/// same type arguments, i.e. `List<T>` → `IEnumerable<T>`.
pub fn implements_collection_interface(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    let Some(TypeData::Generic { kind, args }) = db.lookup(non_nullable(db, target)) else {
        return false;
    };
    let Some(flag) = ImplementedCollections::of_interface(kind) else {
        return false;
    };
    let Some(info) = collection_info(db, source) else {
        return false;
    };
    if !info.implemented.contains(flag) {
        return false;
    }
    if kind.arity() == 2 {
        info.key_value == Some((args[0], args[1]))
    } else {
        info.element == args[0]
    }
}

/// Whether an empty instance can be created with `new T()`.
pub fn can_create_empty(db: &dyn TypeDatabase, info: &CollectionInfo) -> bool {
    !info.is_interface() && !info.immutable && has_parameterless_ctor(db, info.type_id)
}
