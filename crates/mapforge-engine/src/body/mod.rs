//! Second pass: build the bodies of queued mapping shells.
//!
//! A body may resolve further mappings; in standard mode those are queued
//! again and the descriptor builder keeps draining the queue until it is
//! empty. In expression mode bodies are built immediately.

mod collection;
mod object;
mod runtime_target;
mod tuple;
mod user;
mod value;

use crate::context::MappingContext;
use crate::error::EngineError;
use crate::mapping::{MappingBody, MappingId, MappingKind};
use std::sync::Arc;
use tracing::{debug, trace};

/// Build and store the body of mapping `id`.
pub fn build_body(ctx: &mut MappingContext<'_, '_>, id: MappingId) -> Result<(), EngineError> {
    let mapping = ctx.mappings().try_get(id)?.clone();
    if !mapping.needs_body() {
        trace!(mapping_id = id.0, "body already built");
        return Ok(());
    }
    debug!(
        mapping_id = id.0,
        kind = mapping.kind.name(),
        source = %ctx.type_name(mapping.source),
        target = %ctx.type_name(mapping.target),
        "build body"
    );

    let config = Arc::clone(&ctx.config);
    let mut ctx = ctx.with_types(mapping.source, mapping.target, config);
    let body = match &mapping.kind {
        MappingKind::NewInstanceObject { .. } => MappingBody::Object(object::build_new_instance(&mut ctx, id)),
        MappingKind::ExistingTargetObject { .. } => {
            MappingBody::Object(object::build_existing_target(&mut ctx, id))
        }
        MappingKind::Tuple { .. } => MappingBody::Tuple(tuple::build(&mut ctx, id)),
        MappingKind::ForEachAdd { .. } | MappingKind::DictionaryForEachSet { .. } => {
            MappingBody::Loop(collection::build(&mut ctx, &mapping))
        }
        MappingKind::RuntimeTargetType { .. } => MappingBody::RuntimeArms(runtime_target::build(&mut ctx, id)),
        MappingKind::UserNewInstance { config, .. } => {
            MappingBody::Delegate(user::build_new_instance(&mut ctx, id, Arc::clone(config)))
        }
        MappingKind::UserExistingTarget { config, .. } => {
            MappingBody::Delegate(user::build_existing_target(&mut ctx, id, Arc::clone(config)))
        }
        MappingKind::UserProjection { config, .. } => {
            MappingBody::Delegate(user::build_projection(&mut ctx, id, Arc::clone(config)))
        }
        _ => return Ok(()),
    };
    ctx.state.mappings.complete_body(id, body)
}
