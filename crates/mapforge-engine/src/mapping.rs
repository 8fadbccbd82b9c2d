//! Mapping arena entries.
//!
//! A `Mapping` is one concrete way to turn a value of `source` into a value
//! of `target`. Mappings are created as *shells* by the strategy chain and
//! get their body (constructor arguments, member assignments, loop details)
//! in a second pass, so every body slot is an `Option` that starts empty.
//!
//! Mappings reference each other by `MappingId`, never by pointer, which is
//! what lets a recursive type graph refer back to a shell whose body is not
//! built yet.

use crate::config::MappingConfiguration;
use crate::emit::ir::Expr;
use crate::factories::FactoryId;
use crate::members::path::MemberPath;
use bitflags::bitflags;
use mapforge_common::Atom;
use mapforge_types::TypeId;
use smallvec::SmallVec;
use std::sync::Arc;

/// Index of a mapping in the arena of its `MappingCollection`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId(pub u32);

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MappingFlags: u16 {
        /// No generated code is needed, the source value is the result.
        const SYNTHETIC = 1 << 0;
        /// May be reused as a step of other mappings.
        const CALLABLE_BY_OTHERS = 1 << 1;
        /// Declared by the user.
        const USER = 1 << 2;
        /// Rendered as its own method.
        const METHOD = 1 << 3;
        /// Built inside an expression-restricted context.
        const INLINE = 1 << 4;
        /// Maps into an existing target instance.
        const EXISTING_TARGET = 1 << 5;
        const BODY_BUILT = 1 << 6;
    }
}

// =============================================================================
// Mapping kinds
// =============================================================================

/// Replacement for a `null` source when the target cannot hold `null`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NullFallbackValue {
    /// `default` (or `null` for targets that accept it).
    Default,
    EmptyString,
    /// `new T()`.
    CreateInstance,
    ThrowArgumentNull,
}

/// Terminal LINQ-style call that materializes a mapped sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectMethod {
    ToArray,
    ToList,
    ToHashSet,
    ToImmutableArray,
    ToImmutableList,
    ToImmutableHashSet,
    ToImmutableSortedSet,
    ImmutableQueueCreateRange,
    ImmutableStackCreateRange,
    ToImmutableDictionary,
    ToImmutableSortedDictionary,
    ToDictionary,
}

impl CollectMethod {
    /// Extension methods are called on the sequence, the others are static
    /// factory calls taking the sequence.
    pub const fn is_extension(self) -> bool {
        !matches!(
            self,
            Self::ImmutableQueueCreateRange | Self::ImmutableStackCreateRange
        )
    }

    pub const fn method_name(self) -> &'static str {
        match self {
            Self::ToArray => "ToArray",
            Self::ToList => "ToList",
            Self::ToHashSet => "ToHashSet",
            Self::ToImmutableArray => "ToImmutableArray",
            Self::ToImmutableList => "ToImmutableList",
            Self::ToImmutableHashSet => "ToImmutableHashSet",
            Self::ToImmutableSortedSet => "ToImmutableSortedSet",
            Self::ImmutableQueueCreateRange => "ImmutableQueue.CreateRange",
            Self::ImmutableStackCreateRange => "ImmutableStack.CreateRange",
            Self::ToImmutableDictionary => "ToImmutableDictionary",
            Self::ToImmutableSortedDictionary => "ToImmutableSortedDictionary",
            Self::ToDictionary => "ToDictionary",
        }
    }
}

/// Member access used to move between spans, memories and arrays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpanAccess {
    /// `source.ToArray()`
    ToArray,
    /// `source.Span`
    Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DateTimeTarget {
    DateOnly,
    TimeOnly,
}

/// One arm of a type switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedArm {
    pub source: TypeId,
    pub target: TypeId,
    pub mapping: MappingId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingKind {
    /// `source` as is.
    Direct,
    /// Null-aware decorator around a mapping of the non-nullable types.
    NullDelegate {
        inner: MappingId,
        source_nullable: bool,
        fallback: NullFallbackValue,
    },
    /// `if (source != null) { inner }` for existing target mappings.
    ExistingTargetNullGuard { inner: MappingId },
    /// `(T)source`, implicit or explicit.
    Cast { explicit: bool },
    /// `T.Parse(source)`.
    Parse,
    /// `new T(source)`.
    Constructor,
    ToStringCall {
        format: Option<String>,
        provider: Option<String>,
    },
    DateTimeConversion { target: DateTimeTarget },
    EnumByValue {
        check_defined: bool,
        fallback: Option<Atom>,
    },
    EnumByName {
        arms: Vec<(Atom, Atom)>,
        fallback: Option<Atom>,
    },
    /// Empty `arms` renders as `source.ToString()`.
    EnumToString { arms: Vec<(Atom, String)> },
    StringToEnum {
        arms: Vec<(String, Atom)>,
        ignore_case: bool,
        fallback: Option<Atom>,
        use_parse: bool,
    },
    Tuple { body: Option<TupleBody> },
    NewInstanceObject { body: Option<ObjectBody> },
    ExistingTargetObject { body: Option<ObjectBody> },
    /// Type switch over configured derived type pairs.
    Derived {
        arms: Vec<DerivedArm>,
        fallback: Option<MappingId>,
    },
    /// `object Map(object source, Type targetType)`.
    RuntimeTargetType { arms: Option<Vec<DerivedArm>> },
    /// `Queryable.Select(source, x => ...)` with an inline element mapping.
    Queryable { element: MappingId },
    ArrayClone,
    /// `source.Select(x => element(x))` followed by an optional collect call.
    LinqSelect {
        element: MappingId,
        collect: Option<CollectMethod>,
    },
    /// `new Stack<T>(source.Select(...))`.
    EnumerableConstructor { element: MappingId },
    ForEachAdd {
        element: MappingId,
        body: Option<LoopBody>,
    },
    ArrayForLoop { element: MappingId },
    DictionaryForEachSet {
        key: MappingId,
        value: MappingId,
        body: Option<LoopBody>,
    },
    /// `source.ToDictionary(x => key(x.Key), x => value(x.Value))` and the
    /// immutable variants.
    ToDictionary {
        key: MappingId,
        value: MappingId,
        collect: CollectMethod,
    },
    SpanAccess { access: SpanAccess },
    /// Apply `steps` left to right.
    Chain { steps: Vec<MappingId> },
    /// User implemented method, called by name.
    UserImplemented {
        method: String,
        inline_body: Option<InlineBody>,
    },
    /// User declared partial method whose body is built by the engine.
    UserNewInstance {
        delegate: Option<MappingId>,
        config: Arc<MappingConfiguration>,
    },
    UserExistingTarget {
        delegate: Option<MappingId>,
        config: Arc<MappingConfiguration>,
    },
    /// `Expression<Func<S, T>>` returning user method.
    UserProjection {
        element: Option<MappingId>,
        config: Arc<MappingConfiguration>,
    },
    /// User implemented body rewritten into the calling expression.
    Inlined { body: InlineBody },
}

/// Expression body of a user implemented method with a single parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineBody {
    pub parameter: String,
    pub expr: Expr,
}

impl MappingKind {
    /// Tag used in traces and by the body builder dispatch.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::NullDelegate { .. } => "null-delegate",
            Self::ExistingTargetNullGuard { .. } => "existing-target-null-guard",
            Self::Cast { .. } => "cast",
            Self::Parse => "parse",
            Self::Constructor => "constructor",
            Self::ToStringCall { .. } => "to-string",
            Self::DateTimeConversion { .. } => "date-time",
            Self::EnumByValue { .. } => "enum-by-value",
            Self::EnumByName { .. } => "enum-by-name",
            Self::EnumToString { .. } => "enum-to-string",
            Self::StringToEnum { .. } => "string-to-enum",
            Self::Tuple { .. } => "tuple",
            Self::NewInstanceObject { .. } => "new-instance-object",
            Self::ExistingTargetObject { .. } => "existing-target-object",
            Self::Derived { .. } => "derived",
            Self::RuntimeTargetType { .. } => "runtime-target-type",
            Self::Queryable { .. } => "queryable",
            Self::ArrayClone => "array-clone",
            Self::LinqSelect { .. } => "linq-select",
            Self::EnumerableConstructor { .. } => "enumerable-constructor",
            Self::ForEachAdd { .. } => "for-each-add",
            Self::ArrayForLoop { .. } => "array-for-loop",
            Self::DictionaryForEachSet { .. } => "dictionary-for-each-set",
            Self::ToDictionary { .. } => "to-dictionary",
            Self::SpanAccess { .. } => "span-access",
            Self::Chain { .. } => "chain",
            Self::UserImplemented { .. } => "user-implemented",
            Self::UserNewInstance { .. } => "user-new-instance",
            Self::UserExistingTarget { .. } => "user-existing-target",
            Self::UserProjection { .. } => "user-projection",
            Self::Inlined { .. } => "inlined",
        }
    }

    /// Whether a body is built in the second pass.
    pub const fn has_deferred_body(&self) -> bool {
        matches!(
            self,
            Self::Tuple { .. }
                | Self::NewInstanceObject { .. }
                | Self::ExistingTargetObject { .. }
                | Self::RuntimeTargetType { .. }
                | Self::ForEachAdd { .. }
                | Self::DictionaryForEachSet { .. }
                | Self::UserNewInstance { .. }
                | Self::UserExistingTarget { .. }
                | Self::UserProjection { .. }
        )
    }

    /// Whether outside of expression mode this mapping needs statements, a
    /// switch or a throw, and therefore its own method.
    pub fn needs_method(&self) -> bool {
        match self {
            Self::NewInstanceObject { .. }
            | Self::ExistingTargetObject { .. }
            | Self::Derived { .. }
            | Self::RuntimeTargetType { .. }
            | Self::Queryable { .. }
            | Self::ForEachAdd { .. }
            | Self::ArrayForLoop { .. }
            | Self::DictionaryForEachSet { .. }
            | Self::EnumByName { .. }
            | Self::UserImplemented { .. }
            | Self::UserNewInstance { .. }
            | Self::UserExistingTarget { .. }
            | Self::UserProjection { .. } => true,
            Self::EnumToString { arms } => !arms.is_empty(),
            Self::StringToEnum { use_parse, .. } => !use_parse,
            _ => false,
        }
    }
}

// =============================================================================
// Bodies
// =============================================================================

/// How a new target instance is obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectCreation {
    Constructor { args: Vec<ConstructorArgument> },
    Factory { factory: FactoryId },
    /// No usable constructor; the method throws.
    Unavailable,
    /// The instance is passed in.
    Existing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorArgument {
    pub parameter: Atom,
    pub value: MemberValue,
}

/// What happens when a nullable source value meets a non-nullable target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberNullHandling {
    /// The value cannot be null on the way.
    None,
    /// `condition ? value : fallback`.
    Coalesce(NullFallbackValue),
    /// `if (condition) target.X = value;`
    SkipIfNull,
    /// `condition ? value : throw ...`.
    Throw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceValue {
    Path(MemberPath),
    /// Literal as it appears in generated code.
    Constant(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberValue {
    pub source: SourceValue,
    /// `None` for constants.
    pub mapping: Option<MappingId>,
    pub null_handling: MemberNullHandling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberAssignment {
    /// Target member path, more than one segment for nested targets.
    pub target: Vec<Atom>,
    pub value: MemberValue,
    /// Map into the existing member value instead of assigning it.
    pub existing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectBody {
    pub creation: ObjectCreation,
    /// Set in the object initializer: init-only and required members, and
    /// every member in expression mode.
    pub initializers: Vec<MemberAssignment>,
    /// Set after construction.
    pub assignments: Vec<MemberAssignment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleElementValue {
    pub name: Option<Atom>,
    pub value: MemberValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleBody {
    pub elements: Vec<TupleElementValue>,
}

/// Method used to insert an element in a population loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsertMethod {
    Add,
    Push,
    Enqueue,
    /// `target[key] = value`.
    Indexer,
}

impl InsertMethod {
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Push => "Push",
            Self::Enqueue => "Enqueue",
            Self::Indexer => "this[]",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionCreation {
    /// `new T()`, `type_id` may be a concrete type for an interface target.
    New { type_id: TypeId },
    Factory { factory: FactoryId },
    Existing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopBody {
    pub creation: CollectionCreation,
    /// Count member of the source passed to `EnsureCapacity`.
    pub ensure_capacity: Option<&'static str>,
    pub insert: InsertMethod,
}

/// Body produced by the second pass.
#[derive(Clone, Debug)]
pub enum MappingBody {
    Object(ObjectBody),
    Tuple(TupleBody),
    Loop(LoopBody),
    RuntimeArms(Vec<DerivedArm>),
    /// Delegate of a user declared method, `None` when nothing applies.
    Delegate(Option<MappingId>),
}

// =============================================================================
// Mapping
// =============================================================================

#[derive(Clone, Debug)]
pub struct Mapping {
    pub id: MappingId,
    pub source: TypeId,
    pub target: TypeId,
    pub kind: MappingKind,
    pub flags: MappingFlags,
    pub method_name: Option<String>,
}

impl Mapping {
    pub fn is_synthetic(&self) -> bool {
        self.flags.contains(MappingFlags::SYNTHETIC)
    }

    pub fn callable_by_other_mappings(&self) -> bool {
        self.flags.contains(MappingFlags::CALLABLE_BY_OTHERS)
    }

    pub fn is_user(&self) -> bool {
        self.flags.contains(MappingFlags::USER)
    }

    pub fn is_method(&self) -> bool {
        self.flags.contains(MappingFlags::METHOD)
    }

    pub fn is_inline(&self) -> bool {
        self.flags.contains(MappingFlags::INLINE)
    }

    pub fn is_existing_target(&self) -> bool {
        self.flags.contains(MappingFlags::EXISTING_TARGET)
    }

    /// Whether the second pass still has to run for this mapping.
    pub fn needs_body(&self) -> bool {
        self.kind.has_deferred_body() && !self.flags.contains(MappingFlags::BODY_BUILT)
    }

    /// Mappings referenced from this one's body, in render order.
    pub fn dependencies(&self) -> SmallVec<[MappingId; 4]> {
        fn value_deps(value: &MemberValue, out: &mut SmallVec<[MappingId; 4]>) {
            out.extend(value.mapping);
        }
        let mut out = SmallVec::new();
        match &self.kind {
            MappingKind::NullDelegate { inner, .. }
            | MappingKind::ExistingTargetNullGuard { inner } => out.push(*inner),
            MappingKind::Derived { arms, fallback } => {
                out.extend(arms.iter().map(|arm| arm.mapping));
                out.extend(*fallback);
            }
            MappingKind::RuntimeTargetType { arms: Some(arms) } => {
                out.extend(arms.iter().map(|arm| arm.mapping));
            }
            MappingKind::Queryable { element }
            | MappingKind::LinqSelect { element, .. }
            | MappingKind::EnumerableConstructor { element }
            | MappingKind::ForEachAdd { element, .. }
            | MappingKind::ArrayForLoop { element } => out.push(*element),
            MappingKind::DictionaryForEachSet { key, value, .. }
            | MappingKind::ToDictionary { key, value, .. } => {
                out.push(*key);
                out.push(*value);
            }
            MappingKind::Chain { steps } => out.extend(steps.iter().copied()),
            MappingKind::UserNewInstance { delegate, .. }
            | MappingKind::UserExistingTarget { delegate, .. } => out.extend(*delegate),
            MappingKind::UserProjection { element, .. } => out.extend(*element),
            MappingKind::NewInstanceObject { body: Some(body) }
            | MappingKind::ExistingTargetObject { body: Some(body) } => {
                if let ObjectCreation::Constructor { args } = &body.creation {
                    for arg in args {
                        value_deps(&arg.value, &mut out);
                    }
                }
                for assignment in body.initializers.iter().chain(&body.assignments) {
                    value_deps(&assignment.value, &mut out);
                }
            }
            MappingKind::Tuple { body: Some(body) } => {
                for element in &body.elements {
                    value_deps(&element.value, &mut out);
                }
            }
            _ => {}
        }
        out
    }
}
