use crate::config::MappingConversionType;
use crate::context::{MappingContext, Unresolved};
use crate::inline::InlineScopeKind;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_common::diagnostic_codes::PROJECTION_MAX_RECURSION_DEPTH_REACHED;
use mapforge_types::collection_info;

/// `IQueryable<S> → IQueryable<T>`: the element mapping is built in an
/// expression-restricted scope so the query provider can translate it.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::QUERYABLE) {
        return None;
    }
    let db = ctx.db();
    let source = collection_info(db, ctx.source).filter(|info| info.is_queryable())?;
    let target = collection_info(db, ctx.target).filter(|info| info.is_queryable())?;

    let config = ctx.nested_config();
    let element = match ctx.build_inline_mapping(InlineScopeKind::Queryable, source.element, target.element, config) {
        Ok(element) => element,
        Err(Unresolved::RecursionLimit { depth }) => {
            let pair = format!(
                "{} -> {}",
                ctx.type_name(source.element),
                ctx.type_name(target.element)
            );
            ctx.report(
                PROJECTION_MAX_RECURSION_DEPTH_REACHED,
                vec![depth.to_string(), pair, String::new()],
            );
            return None;
        }
        Err(Unresolved::NoStrategy) => return None,
    };
    Some(ctx.push_mapping(
        MappingKind::Queryable { element },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
