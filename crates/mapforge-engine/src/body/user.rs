//! Delegates of user declared partial methods. The delegate is built
//! without consulting the default table so the method never resolves to
//! itself.

use super::value::report_unresolved;
use crate::config::MappingConfiguration;
use crate::context::MappingContext;
use crate::inline::InlineScopeKind;
use crate::mapping::MappingId;
use mapforge_common::diagnostic_codes::{COULD_NOT_CREATE_MAPPING, EXISTING_TARGET_MAPPING_NOT_SUPPORTED};
use std::sync::Arc;

pub(super) fn build_new_instance(
    ctx: &mut MappingContext<'_, '_>,
    id: MappingId,
    config: Arc<MappingConfiguration>,
) -> Option<MappingId> {
    let (source, target) = (ctx.source, ctx.target);
    let delegate = ctx.build_delegate_mapping(source, target, config, id);
    if delegate.is_none() {
        let args = vec![ctx.type_name(source), ctx.type_name(target)];
        ctx.report(COULD_NOT_CREATE_MAPPING, args);
    }
    delegate
}

pub(super) fn build_existing_target(
    ctx: &mut MappingContext<'_, '_>,
    id: MappingId,
    config: Arc<MappingConfiguration>,
) -> Option<MappingId> {
    let (source, target) = (ctx.source, ctx.target);
    let delegate = ctx.build_existing_target_delegate(source, target, config, id);
    if delegate.is_none() {
        let args = vec![ctx.type_name(source), ctx.type_name(target)];
        ctx.report(EXISTING_TARGET_MAPPING_NOT_SUPPORTED, args);
    }
    delegate
}

/// `Expression<Func<S, T>>`: the mapping `S → T` built in an
/// expression-restricted scope.
pub(super) fn build_projection(
    ctx: &mut MappingContext<'_, '_>,
    id: MappingId,
    config: Arc<MappingConfiguration>,
) -> Option<MappingId> {
    let (source, target) = (ctx.source, ctx.target);
    match ctx.build_inline_mapping(InlineScopeKind::Expression, source, target, config) {
        Ok(element) => Some(element),
        Err(reason) => {
            let method = ctx
                .mapping(id)
                .and_then(|m| m.method_name.clone())
                .unwrap_or_default();
            report_unresolved(ctx, reason, source, target, &method);
            None
        }
    }
}
