use crate::context::MappingContext;
use crate::mapping::{DerivedArm, MappingFlags, MappingId, MappingKind};
use mapforge_common::diagnostic_codes::{
    COULD_NOT_CREATE_MAPPING, DERIVED_SOURCE_TYPE_DUPLICATED, DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE,
    DERIVED_TARGET_TYPE_NOT_ASSIGNABLE,
};
use mapforge_types::queries::{inheritance_depth, is_abstract, is_derived_from, is_nullable};
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::sync::Arc;

/// Type switch over the configured derived type pairs. Arms are ordered
/// most derived first so a base type arm never shadows a subtype arm.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.config.derived_types.is_empty() {
        return None;
    }
    let pairs = ctx.config.derived_types.clone();
    let db = ctx.db();
    let (source, target) = (ctx.source, ctx.target);

    let mut seen = FxHashSet::default();
    let mut arms = Vec::with_capacity(pairs.len());
    for (derived_source, derived_target) in pairs {
        if !is_derived_from(db, derived_source, source) {
            let args = vec![ctx.type_name(derived_source), ctx.type_name(source)];
            ctx.report(DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE, args);
            continue;
        }
        if !is_derived_from(db, derived_target, target) {
            let args = vec![ctx.type_name(derived_target), ctx.type_name(target)];
            ctx.report(DERIVED_TARGET_TYPE_NOT_ASSIGNABLE, args);
            continue;
        }
        if !seen.insert(derived_source) {
            let args = vec![ctx.type_name(derived_source)];
            ctx.report(DERIVED_SOURCE_TYPE_DUPLICATED, args);
            continue;
        }
        match ctx.find_or_build_mapping(derived_source, derived_target) {
            Some(mapping) => arms.push(DerivedArm {
                source: derived_source,
                target: derived_target,
                mapping,
            }),
            None => {
                let args = vec![ctx.type_name(derived_source), ctx.type_name(derived_target)];
                ctx.report(COULD_NOT_CREATE_MAPPING, args);
            }
        }
    }

    arms.sort_by_key(|arm| {
        (
            Reverse(inheritance_depth(db, arm.source)),
            Reverse(inheritance_depth(db, arm.target)),
            is_nullable(db, arm.target),
        )
    });

    let fallback = if is_abstract(db, target) {
        None
    } else {
        let config = Arc::new(ctx.config.without_derived_types());
        let own_key = ctx
            .user_mapping()
            .and_then(|owner| ctx.mapping(owner))
            .is_some_and(|m| m.source == source && m.target == target);
        if own_key {
            ctx.build_unregistered_mapping(source, target, config)
        } else {
            ctx.find_or_build_mapping_with_config(source, target, config)
        }
    };

    Some(ctx.push_mapping(
        MappingKind::Derived { arms, fallback },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
