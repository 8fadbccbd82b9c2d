//! Spans and memories. Neither can be enumerated with LINQ, so every
//! conversion goes through an array: `span.ToArray()` on the way out and
//! the implicit array conversion on the way in.

use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind, SpanAccess};
use mapforge_types::{CollectionInfo, GenericKind, collection_info};

pub(super) fn build_span(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::SPAN) {
        return None;
    }
    let db = ctx.db();
    let source = collection_info(db, ctx.source);
    let target = collection_info(db, ctx.target);
    match (source, target) {
        (Some(source), Some(target)) if source.is_span() && target.is_span() => {
            (source.element == target.element).then(|| implicit_cast(ctx))
        }
        (Some(source), _) if source.is_span() => from_array_of(ctx, &source),
        (Some(source), Some(target)) if target.is_span() && source.is_enumerable() => {
            into_array_of(ctx, &target)
        }
        _ => None,
    }
}

pub(super) fn build_memory(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::MEMORY) {
        return None;
    }
    let db = ctx.db();
    let source = collection_info(db, ctx.source);
    let target = collection_info(db, ctx.target);
    match (source, target) {
        (Some(source), Some(target)) if source.is_memory() && target.is_memory() => {
            (source.element == target.element).then(|| implicit_cast(ctx))
        }
        // `memory.Span` when only the wrapper changes.
        (Some(source), Some(target))
            if source.is_memory() && target.is_span() && source.element == target.element =>
        {
            let span = db.generic(GenericKind::Span, &[source.element]);
            let access = ctx.push_mapping_for(
                ctx.source,
                span,
                MappingKind::SpanAccess {
                    access: SpanAccess::Span,
                },
                MappingFlags::CALLABLE_BY_OTHERS,
            );
            if span == ctx.target {
                return Some(access);
            }
            let rest = ctx.find_or_build_mapping(span, ctx.target)?;
            Some(chain(ctx, vec![access, rest]))
        }
        (Some(source), _) if source.is_memory() => from_array_of(ctx, &source),
        (Some(source), Some(target)) if target.is_memory() && source.is_enumerable() => {
            into_array_of(ctx, &target)
        }
        _ => None,
    }
}

fn implicit_cast(ctx: &mut MappingContext<'_, '_>) -> MappingId {
    ctx.push_mapping(
        MappingKind::Cast { explicit: false },
        MappingFlags::CALLABLE_BY_OTHERS,
    )
}

fn chain(ctx: &mut MappingContext<'_, '_>, steps: Vec<MappingId>) -> MappingId {
    ctx.push_mapping(MappingKind::Chain { steps }, MappingFlags::CALLABLE_BY_OTHERS)
}

/// `source.ToArray()` followed by a mapping of the array.
fn from_array_of(ctx: &mut MappingContext<'_, '_>, source: &CollectionInfo) -> Option<MappingId> {
    let array = ctx.db().array(source.element);
    if array == ctx.target {
        return Some(ctx.push_mapping(
            MappingKind::SpanAccess {
                access: SpanAccess::ToArray,
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }
    let rest = ctx.find_or_build_mapping(array, ctx.target)?;
    let to_array = ctx.push_mapping_for(
        ctx.source,
        array,
        MappingKind::SpanAccess {
            access: SpanAccess::ToArray,
        },
        MappingFlags::CALLABLE_BY_OTHERS,
    );
    Some(chain(ctx, vec![to_array, rest]))
}

/// A mapping into `T[]` followed by the implicit array conversion.
fn into_array_of(ctx: &mut MappingContext<'_, '_>, target: &CollectionInfo) -> Option<MappingId> {
    let array = ctx.db().array(target.element);
    if array == ctx.source {
        return Some(implicit_cast(ctx));
    }
    let first = ctx.find_or_build_mapping(ctx.source, array)?;
    let cast = ctx.push_mapping_for(
        array,
        ctx.target,
        MappingKind::Cast { explicit: false },
        MappingFlags::CALLABLE_BY_OTHERS,
    );
    Some(chain(ctx, vec![first, cast]))
}
