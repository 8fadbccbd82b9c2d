use crate::context::MappingContext;
use crate::mapping::{DerivedArm, MappingId, MappingKind};
use mapforge_common::diagnostic_codes::RUNTIME_TARGET_TYPE_WITHOUT_MAPPINGS;
use mapforge_types::queries::{inheritance_depth, is_derived_from, is_nullable};
use std::cmp::Reverse;

/// One arm per user mapping the runtime source and target type can select,
/// most derived pairs first.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>, id: MappingId) -> Vec<DerivedArm> {
    let db = ctx.db();
    let (source, target) = (ctx.source, ctx.target);
    let mut arms: Vec<DerivedArm> = ctx
        .mappings()
        .iter()
        .filter(|m| m.id != id && m.is_user() && m.callable_by_other_mappings())
        .filter(|m| !m.is_existing_target())
        .filter(|m| !matches!(m.kind, MappingKind::RuntimeTargetType { .. }))
        .filter(|m| is_derived_from(db, m.source, source) && is_derived_from(db, m.target, target))
        .map(|m| DerivedArm {
            source: m.source,
            target: m.target,
            mapping: m.id,
        })
        .collect();
    arms.sort_by_key(|arm| {
        (
            Reverse(inheritance_depth(db, arm.source)),
            Reverse(inheritance_depth(db, arm.target)),
            is_nullable(db, arm.target),
        )
    });

    if arms.is_empty() {
        let method = ctx
            .mapping(id)
            .and_then(|m| m.method_name.clone())
            .unwrap_or_default();
        ctx.report(RUNTIME_TARGET_TYPE_WITHOUT_MAPPINGS, vec![method]);
    }
    arms
}
