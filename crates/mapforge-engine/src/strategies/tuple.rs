use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::{is_object_like, tuple_elements};

/// Value tuple targets, filled element by element from another tuple or
/// from the members of an object.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.is_inline() || !ctx.is_conversion_enabled(MappingConversionType::TUPLE) {
        return None;
    }
    let db = ctx.db();
    tuple_elements(db, ctx.target)?;
    if tuple_elements(db, ctx.source).is_none() && !is_object_like(db, ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::Tuple { body: None },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
