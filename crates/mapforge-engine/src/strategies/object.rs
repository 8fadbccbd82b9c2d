use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::{is_abstract, is_enum, is_object_like};

/// Member by member mapping into a new instance. The constructor and the
/// members are matched when the body is built.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    if !is_object_like(db, ctx.target) || ctx.source.is_intrinsic() || is_enum(db, ctx.source) {
        return None;
    }
    if is_abstract(db, ctx.target) && ctx.factories().find(db, ctx.source, ctx.target).is_none() {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::NewInstanceObject { body: None },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
