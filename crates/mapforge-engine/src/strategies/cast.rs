use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::{intrinsic_kind, is_enum, is_immutable, non_nullable};
use mapforge_types::{TypeId, classify_conversion};

/// Anything to `object`.
pub(super) fn build_to_object(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.target != TypeId::OBJECT {
        return None;
    }
    if ctx.config.use_deep_cloning && !is_immutable(ctx.db(), ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::Cast { explicit: false },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}

pub(super) fn build_implicit(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::IMPLICIT_CAST) {
        return None;
    }
    let db = ctx.db();
    if !classify_conversion(db, ctx.source, ctx.target).is_implicit() {
        return None;
    }
    if ctx.config.use_deep_cloning && !is_immutable(db, ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::Cast { explicit: false },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}

/// Explicit casts, except enum to enum which has its own strategy. Casts
/// between an enum and an integral type need `ENUM_UNDERLYING_TYPE`.
pub(super) fn build_explicit(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::EXPLICIT_CAST) {
        return None;
    }
    let db = ctx.db();
    if !classify_conversion(db, ctx.source, ctx.target).is_explicit() {
        return None;
    }
    let source_enum = is_enum(db, non_nullable(db, ctx.source));
    let target_enum = is_enum(db, non_nullable(db, ctx.target));
    if source_enum && target_enum {
        return None;
    }
    if source_enum || target_enum {
        let other = if source_enum { ctx.target } else { ctx.source };
        let integral = intrinsic_kind(db, non_nullable(db, other)).is_some_and(|k| k.is_integral());
        if integral && !ctx.is_conversion_enabled(MappingConversionType::ENUM_UNDERLYING_TYPE) {
            return None;
        }
    }
    if ctx.config.use_deep_cloning && !is_immutable(db, ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::Cast { explicit: true },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
