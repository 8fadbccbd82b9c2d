//! Core type representation.
//!
//! Types are interned: structurally equal `TypeData` always receives the same
//! `TypeId`, so identity checks are a `u32` comparison. Nominal types
//! (classes, structs, records, enums) point at a `DefinitionInfo` through
//! their `TypeId`; their members are stored once in the definition store.

use bitflags::bitflags;
use mapforge_common::Atom;
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;

// =============================================================================
// TypeId
// =============================================================================

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ERROR: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const CHAR: Self = Self(2);
    pub const SBYTE: Self = Self(3);
    pub const BYTE: Self = Self(4);
    pub const SHORT: Self = Self(5);
    pub const USHORT: Self = Self(6);
    pub const INT: Self = Self(7);
    pub const UINT: Self = Self(8);
    pub const LONG: Self = Self(9);
    pub const ULONG: Self = Self(10);
    pub const FLOAT: Self = Self(11);
    pub const DOUBLE: Self = Self(12);
    pub const DECIMAL: Self = Self(13);
    pub const STRING: Self = Self(14);
    pub const OBJECT: Self = Self(15);
    pub const DATE_TIME: Self = Self(16);
    pub const DATE_ONLY: Self = Self(17);
    pub const TIME_ONLY: Self = Self(18);
    pub const GUID: Self = Self(19);
    pub const TYPE: Self = Self(20);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 21;

    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

// =============================================================================
// Intrinsics
// =============================================================================

/// Built-in types known to the engine without a definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Error,
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    Object,
    DateTime,
    DateOnly,
    TimeOnly,
    Guid,
    Type,
}

impl IntrinsicKind {
    /// All intrinsics in `TypeId` order.
    pub const ALL: [Self; 21] = [
        Self::Error,
        Self::Bool,
        Self::Char,
        Self::SByte,
        Self::Byte,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::String,
        Self::Object,
        Self::DateTime,
        Self::DateOnly,
        Self::TimeOnly,
        Self::Guid,
        Self::Type,
    ];

    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Short
                | Self::UShort
                | Self::Int
                | Self::UInt
                | Self::Long
                | Self::ULong
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Short
                | Self::UShort
                | Self::Int
                | Self::UInt
                | Self::Long
                | Self::ULong
        )
    }

    pub const fn is_value_type(self) -> bool {
        !matches!(self, Self::String | Self::Object | Self::Type | Self::Error)
    }

    /// Immutable types can be shared between source and target even when
    /// deep cloning is requested.
    pub const fn is_immutable(self) -> bool {
        !matches!(self, Self::Object | Self::Error)
    }

    /// Whether the type exposes a static `Parse(string)` method.
    pub const fn has_parse_method(self) -> bool {
        self.is_numeric()
            || matches!(
                self,
                Self::Bool
                    | Self::Char
                    | Self::DateTime
                    | Self::DateOnly
                    | Self::TimeOnly
                    | Self::Guid
            )
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Error => "<error>",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Object => "object",
            Self::DateTime => "DateTime",
            Self::DateOnly => "DateOnly",
            Self::TimeOnly => "TimeOnly",
            Self::Guid => "Guid",
            Self::Type => "Type",
        }
    }
}

// =============================================================================
// Well-known generic types
// =============================================================================

/// Framework generic types the engine understands by logical name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GenericKind {
    KeyValuePair,
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
    Span,
    ReadOnlySpan,
    Memory,
    ReadOnlyMemory,
    Queryable,
}

impl GenericKind {
    pub const fn arity(self) -> usize {
        match self {
            Self::KeyValuePair
            | Self::IDictionary
            | Self::ReadOnlyDictionary
            | Self::Dictionary
            | Self::SortedDictionary
            | Self::ImmutableDictionary
            | Self::ImmutableSortedDictionary => 2,
            _ => 1,
        }
    }

    pub const fn is_value_type(self) -> bool {
        matches!(
            self,
            Self::KeyValuePair
                | Self::ImmutableArray
                | Self::Span
                | Self::ReadOnlySpan
                | Self::Memory
                | Self::ReadOnlyMemory
        )
    }

    pub const fn is_interface(self) -> bool {
        matches!(
            self,
            Self::Enumerable
                | Self::Collection
                | Self::ReadOnlyCollection
                | Self::IList
                | Self::ReadOnlyList
                | Self::ISet
                | Self::ReadOnlySet
                | Self::IDictionary
                | Self::ReadOnlyDictionary
                | Self::Queryable
        )
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::KeyValuePair => "KeyValuePair",
            Self::Enumerable => "IEnumerable",
            Self::Collection => "ICollection",
            Self::ReadOnlyCollection => "IReadOnlyCollection",
            Self::IList => "IList",
            Self::ReadOnlyList => "IReadOnlyList",
            Self::List => "List",
            Self::ISet => "ISet",
            Self::ReadOnlySet => "IReadOnlySet",
            Self::HashSet => "HashSet",
            Self::SortedSet => "SortedSet",
            Self::Stack => "Stack",
            Self::Queue => "Queue",
            Self::ImmutableArray => "ImmutableArray",
            Self::ImmutableList => "ImmutableList",
            Self::ImmutableHashSet => "ImmutableHashSet",
            Self::ImmutableSortedSet => "ImmutableSortedSet",
            Self::ImmutableQueue => "ImmutableQueue",
            Self::ImmutableStack => "ImmutableStack",
            Self::IDictionary => "IDictionary",
            Self::ReadOnlyDictionary => "IReadOnlyDictionary",
            Self::Dictionary => "Dictionary",
            Self::SortedDictionary => "SortedDictionary",
            Self::ImmutableDictionary => "ImmutableDictionary",
            Self::ImmutableSortedDictionary => "ImmutableSortedDictionary",
            Self::Span => "Span",
            Self::ReadOnlySpan => "ReadOnlySpan",
            Self::Memory => "Memory",
            Self::ReadOnlyMemory => "ReadOnlyMemory",
            Self::Queryable => "IQueryable",
        }
    }
}

pub type TypeArgs = SmallVec<[TypeId; 2]>;

/// Element of a value tuple, `(int Id, string)` has one named and one
/// positional element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TupleElement {
    pub name: Option<Atom>,
    pub type_id: TypeId,
}

/// Structural type data. Constructed only through the interner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    /// `T?`. An annotation for reference types, `Nullable<T>` for value types.
    Nullable(TypeId),
    Array(TypeId),
    Generic { kind: GenericKind, args: TypeArgs },
    Tuple(Arc<[TupleElement]>),
    /// Nominal type; the definition is stored under the same `TypeId`.
    Named(DefId),
}

// =============================================================================
// Definitions
// =============================================================================

/// Definition identifier of a nominal type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DefKind {
    Class,
    Struct,
    Record,
    RecordStruct,
    Interface,
    Enum,
}

impl DefKind {
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct | Self::Enum)
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DefFlags: u8 {
        const ABSTRACT = 1 << 0;
        const IMMUTABLE = 1 << 1;
        /// Exposes a static `Parse(string)` method.
        const HAS_PARSE_METHOD = 1 << 2;
        const SEALED = 1 << 3;
        /// `[Flags]` enum.
        const FLAGS_ENUM = 1 << 4;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MemberAccess: u8 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        /// Settable only in an object initializer.
        const INIT_ONLY = 1 << 2;
        /// `required` member, must be set in the object initializer.
        const REQUIRED = 1 << 3;
    }
}

impl MemberAccess {
    pub const READ_WRITE: Self = Self::READABLE.union(Self::WRITABLE);
    pub const READ_INIT: Self = Self::READABLE.union(Self::INIT_ONLY);

    pub const fn can_get(self) -> bool {
        self.contains(Self::READABLE)
    }

    pub const fn can_set(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    pub const fn can_set_in_initializer(self) -> bool {
        self.intersects(Self::WRITABLE.union(Self::INIT_ONLY))
    }

    pub const fn is_init_only(self) -> bool {
        self.contains(Self::INIT_ONLY) && !self.contains(Self::WRITABLE)
    }

    pub const fn is_required(self) -> bool {
        self.contains(Self::REQUIRED)
    }
}

/// Field or property of a nominal type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub access: MemberAccess,
    pub is_field: bool,
}

impl MemberInfo {
    pub fn property(name: Atom, type_id: TypeId, access: MemberAccess) -> Self {
        Self {
            name,
            type_id,
            access,
            is_field: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub has_default: bool,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConstructorFlags: u8 {
        const ACCESSIBLE = 1 << 0;
        const OBSOLETE = 1 << 1;
        /// Explicitly marked as the constructor to use for mappings.
        const MAPPER_CONSTRUCTOR = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstructorInfo {
    pub params: Vec<ParamInfo>,
    pub flags: ConstructorFlags,
}

impl ConstructorInfo {
    pub fn is_accessible(&self) -> bool {
        self.flags.contains(ConstructorFlags::ACCESSIBLE)
    }

    pub fn is_parameterless(&self) -> bool {
        self.params.iter().all(|p| p.has_default)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub name: Atom,
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    pub underlying: IntrinsicKind,
    pub members: Vec<EnumMember>,
}

/// User-defined conversion operator declared on either side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserConversion {
    pub from: TypeId,
    pub to: TypeId,
    pub implicit: bool,
}

/// Framework collection interface a user type implements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomCollection {
    pub implements: GenericKind,
    pub args: TypeArgs,
    /// Public `Add(T)` (or indexer setter for dictionaries).
    pub has_add_method: bool,
}

/// Complete information about a nominal type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    pub name: Atom,
    pub flags: DefFlags,
    pub base_type: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberInfo>,
    pub constructors: Vec<ConstructorInfo>,
    pub enum_info: Option<EnumInfo>,
    pub conversions: Vec<UserConversion>,
    pub collection: Option<CustomCollection>,
}

impl DefinitionInfo {
    pub fn new(kind: DefKind, name: Atom) -> Self {
        Self {
            kind,
            name,
            flags: DefFlags::empty(),
            base_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            constructors: Vec::new(),
            enum_info: None,
            conversions: Vec::new(),
            collection: None,
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == DefKind::Interface || self.flags.contains(DefFlags::ABSTRACT)
    }
}
