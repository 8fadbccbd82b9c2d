//! Conversion classification between two types.
//!
//! Mirrors the host language's conversion rules closely enough for strategy
//! selection: which casts compile implicitly, which need an explicit cast,
//! and which go through a user-defined operator.

use crate::collections::implements_collection_interface;
use crate::db::TypeDatabase;
use crate::queries::{enum_info, intrinsic_kind, is_derived_from, is_value_type, non_nullable, strip_annotations};
use crate::types::{IntrinsicKind, TypeData, TypeId};

/// Kind of conversion from a source type to a target type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    Identity,
    ImplicitNumeric,
    /// `T` → `T?` for value types, including lifted numeric conversions.
    ImplicitNullable,
    /// Derived → base, class → implemented interface, anything → `object`.
    ImplicitReference,
    Boxing,
    UserDefinedImplicit,
    ExplicitNumeric,
    /// `T?` → `T` for value types.
    ExplicitNullable,
    /// Base → derived.
    ExplicitReference,
    Unboxing,
    /// Enum ↔ enum and enum ↔ integral.
    ExplicitEnumeration,
    UserDefinedExplicit,
    None,
}

impl ConversionKind {
    pub const fn exists(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn is_implicit(self) -> bool {
        matches!(
            self,
            Self::Identity
                | Self::ImplicitNumeric
                | Self::ImplicitNullable
                | Self::ImplicitReference
                | Self::Boxing
                | Self::UserDefinedImplicit
        )
    }

    pub const fn is_explicit(self) -> bool {
        self.exists() && !self.is_implicit()
    }

    pub const fn is_user_defined(self) -> bool {
        matches!(self, Self::UserDefinedImplicit | Self::UserDefinedExplicit)
    }

    /// Reference conversions keep object identity.
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::ImplicitReference | Self::ExplicitReference)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::ImplicitNumeric | Self::ExplicitNumeric)
    }
}

/// Classify the conversion from `source` to `target`.
pub fn classify_conversion(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> ConversionKind {
    if source == target {
        return ConversionKind::Identity;
    }
    let stripped_source = strip_annotations(db, source);
    let stripped_target = strip_annotations(db, target);
    if stripped_source == stripped_target {
        return ConversionKind::Identity;
    }
    if stripped_source != source || stripped_target != target {
        return classify_conversion(db, stripped_source, stripped_target);
    }

    // Value type nullables.
    if let Some(TypeData::Nullable(target_inner)) = db.lookup(target) {
        let source_inner = non_nullable(db, source);
        let inner = classify_conversion(db, source_inner, target_inner);
        return match inner {
            ConversionKind::Identity | ConversionKind::ImplicitNumeric
                if source_inner == source || inner == ConversionKind::ImplicitNumeric =>
            {
                ConversionKind::ImplicitNullable
            }
            ConversionKind::UserDefinedImplicit => ConversionKind::UserDefinedImplicit,
            ConversionKind::UserDefinedExplicit => ConversionKind::UserDefinedExplicit,
            ConversionKind::None => ConversionKind::None,
            _ => ConversionKind::ExplicitNullable,
        };
    }
    if let Some(TypeData::Nullable(source_inner)) = db.lookup(source) {
        return match classify_conversion(db, source_inner, target) {
            ConversionKind::None => ConversionKind::None,
            ConversionKind::UserDefinedImplicit | ConversionKind::UserDefinedExplicit => {
                ConversionKind::UserDefinedExplicit
            }
            _ if target == TypeId::OBJECT => ConversionKind::Boxing,
            _ => ConversionKind::ExplicitNullable,
        };
    }

    if target == TypeId::OBJECT {
        return if is_value_type(db, source) {
            ConversionKind::Boxing
        } else {
            ConversionKind::ImplicitReference
        };
    }
    if source == TypeId::OBJECT {
        return if is_value_type(db, target) {
            ConversionKind::Unboxing
        } else {
            ConversionKind::ExplicitReference
        };
    }

    if let (Some(from), Some(to)) = (intrinsic_kind(db, source), intrinsic_kind(db, target)) {
        return classify_intrinsic(from, to);
    }

    let source_is_enum = enum_info(db, source).is_some();
    let target_is_enum = enum_info(db, target).is_some();
    if source_is_enum || target_is_enum {
        let other_ok = |id: TypeId| {
            enum_info(db, id).is_some()
                || intrinsic_kind(db, id).is_some_and(|k| k.is_numeric() || k == IntrinsicKind::Char)
        };
        if other_ok(source) && other_ok(target) {
            return ConversionKind::ExplicitEnumeration;
        }
    }

    if let Some(user) = user_defined_conversion(db, source, target) {
        return user;
    }

    if is_derived_from(db, source, target) || implements_collection_interface(db, source, target) {
        return if is_value_type(db, source) {
            ConversionKind::Boxing
        } else {
            ConversionKind::ImplicitReference
        };
    }
    if !is_value_type(db, target) && is_derived_from(db, target, source) {
        return ConversionKind::ExplicitReference;
    }
    ConversionKind::None
}

fn user_defined_conversion(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> Option<ConversionKind> {
    let mut candidates = Vec::new();
    if let Some(def) = db.definition(source) {
        candidates.extend(def.conversions.iter().cloned());
    }
    if let Some(def) = db.definition(target) {
        candidates.extend(def.conversions.iter().cloned());
    }
    candidates
        .iter()
        .find(|c| c.from == source && c.to == target)
        .map(|c| {
            if c.implicit {
                ConversionKind::UserDefinedImplicit
            } else {
                ConversionKind::UserDefinedExplicit
            }
        })
}

fn classify_intrinsic(from: IntrinsicKind, to: IntrinsicKind) -> ConversionKind {
    if from == to {
        return ConversionKind::Identity;
    }
    let numeric_like = |k: IntrinsicKind| k.is_numeric() || k == IntrinsicKind::Char;
    if !numeric_like(from) || !numeric_like(to) {
        return ConversionKind::None;
    }
    if is_implicit_numeric(from, to) {
        ConversionKind::ImplicitNumeric
    } else {
        ConversionKind::ExplicitNumeric
    }
}

/// Implicit numeric conversion table.
pub fn is_implicit_numeric(from: IntrinsicKind, to: IntrinsicKind) -> bool {
    use IntrinsicKind::*;
    match from {
        SByte => matches!(to, Short | Int | Long | Float | Double | Decimal),
        Byte => matches!(
            to,
            Short | UShort | Int | UInt | Long | ULong | Float | Double | Decimal
        ),
        Short => matches!(to, Int | Long | Float | Double | Decimal),
        UShort | Char => matches!(
            to,
            UShort | Int | UInt | Long | ULong | Float | Double | Decimal
        ) && to != from,
        Int => matches!(to, Long | Float | Double | Decimal),
        UInt => matches!(to, Long | ULong | Float | Double | Decimal),
        Long | ULong => matches!(to, Float | Double | Decimal),
        Float => to == Double,
        _ => false,
    }
}
