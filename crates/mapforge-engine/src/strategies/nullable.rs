use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind, NullFallbackValue};
use mapforge_common::diagnostic_codes::NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE;
use mapforge_types::TypeId;
use mapforge_types::queries::{
    accepts_null, has_parameterless_ctor, is_nullable, is_string, is_value_type, non_nullable,
};
use std::sync::Arc;

/// `T? → U?`, `T? → U` and `T → U?`: map the non-nullable types and wrap
/// the result in a null-aware decorator.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    let source_nullable = is_nullable(db, ctx.source);
    if !source_nullable && !is_nullable(db, ctx.target) {
        return None;
    }
    let source = non_nullable(db, ctx.source);
    let target = non_nullable(db, ctx.target);
    let config = Arc::clone(&ctx.config);
    let inner = ctx.find_or_build_mapping_with_config(source, target, config)?;
    let inner_synthetic = ctx.is_synthetic(inner);

    if !source_nullable {
        let flags = synthetic_if(inner_synthetic);
        return Some(ctx.push_mapping(
            MappingKind::NullDelegate {
                inner,
                source_nullable: false,
                fallback: NullFallbackValue::Default,
            },
            flags,
        ));
    }

    if accepts_null(db, ctx.target) {
        let flags = synthetic_if(inner_synthetic);
        return Some(ctx.push_mapping(
            MappingKind::NullDelegate {
                inner,
                source_nullable: true,
                fallback: NullFallbackValue::Default,
            },
            flags,
        ));
    }

    let args = vec![ctx.type_name(ctx.source), ctx.type_name(ctx.target)];
    ctx.report(NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE, args);
    let throw = ctx.config.null_handling.throw_on_mapping_null_mismatch;
    let fallback = null_fallback_value(ctx, ctx.target, throw);
    Some(ctx.push_mapping(
        MappingKind::NullDelegate {
            inner,
            source_nullable: true,
            fallback,
        },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}

fn synthetic_if(synthetic: bool) -> MappingFlags {
    if synthetic {
        MappingFlags::CALLABLE_BY_OTHERS | MappingFlags::SYNTHETIC
    } else {
        MappingFlags::CALLABLE_BY_OTHERS
    }
}

/// Value substituted for `null` when `target` cannot hold it. Expression
/// mode never throws.
pub(crate) fn null_fallback_value(ctx: &MappingContext<'_, '_>, target: TypeId, throw: bool) -> NullFallbackValue {
    let db = ctx.db();
    let inline = ctx.is_inline();
    if throw && !inline {
        return NullFallbackValue::ThrowArgumentNull;
    }
    if is_value_type(db, target) {
        return NullFallbackValue::Default;
    }
    if is_string(db, target) {
        return NullFallbackValue::EmptyString;
    }
    if has_parameterless_ctor(db, target) {
        return NullFallbackValue::CreateInstance;
    }
    if inline {
        NullFallbackValue::Default
    } else {
        NullFallbackValue::ThrowArgumentNull
    }
}
