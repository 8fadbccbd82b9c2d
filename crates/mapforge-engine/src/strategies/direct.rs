use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::is_immutable;

/// Identical types need no code. With deep cloning only immutable values
/// may be shared.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.source != ctx.target {
        return None;
    }
    if ctx.config.use_deep_cloning && !is_immutable(ctx.db(), ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::Direct,
        MappingFlags::SYNTHETIC | MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
