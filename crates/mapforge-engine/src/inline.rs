//! Expression-restricted resolution.
//!
//! Queryable projections and expression returning user methods are
//! translated by a query provider, so everything they contain must be a
//! single expression: no statements, no method calls into generated code,
//! no throws. Inside such a scope:
//! - nullable reference types are treated as non-nullable
//! - every mapping is built with its body immediately and cached per scope
//!   only once that body exists, nothing is queued
//! - nesting of one type pair is bounded by the configured projection depth
//! - user implemented mappings are inlined when their body allows it
//!
//! The strategies read `ctx.is_inline()` to skip or adjust what cannot be
//! expressed.

use crate::body;
use crate::context::{MappingContext, Unresolved};
use crate::config::MappingConfiguration;
use crate::inline_rewrite;
use crate::key::TypeMappingKey;
use crate::mapping::{InlineBody, MappingFlags, MappingId, MappingKind};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::strategies;
use mapforge_common::diagnostic_codes::PROJECTION_USER_MAPPING_CANNOT_INLINE;
use mapforge_types::TypeId;
use mapforge_types::queries::upgrade_nullable_reference;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Index of an inline scope in the mapper state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InlineScopeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InlineScopeKind {
    /// `IQueryable<T>` projection; failed user method inlining is reported.
    Queryable,
    /// `Expression<Func<S, T>>` user method; failed inlining is silent.
    Expression,
}

#[derive(Debug)]
pub struct InlineScope {
    pub kind: InlineScopeKind,
    cache: FxHashMap<TypeMappingKey, MappingId>,
    depth_guard: RecursionGuard<(TypeId, TypeId)>,
    pub(crate) inline_guard: RecursionGuard<MappingId>,
}

impl InlineScope {
    pub fn new(kind: InlineScopeKind, max_depth: u32) -> Self {
        Self {
            kind,
            cache: FxHashMap::default(),
            depth_guard: RecursionGuard::with_profile(RecursionProfile::ProjectionInlining {
                max_depth,
            }),
            inline_guard: RecursionGuard::with_profile(RecursionProfile::UserMethodInlining),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn scope_kind(ctx: &MappingContext<'_, '_>, scope: InlineScopeId) -> InlineScopeKind {
    ctx.state
        .inline_scopes
        .get(scope.0 as usize)
        .map_or(InlineScopeKind::Expression, |s| s.kind)
}

fn cached(ctx: &MappingContext<'_, '_>, scope: InlineScopeId, key: &TypeMappingKey) -> Option<MappingId> {
    ctx.state
        .inline_scopes
        .get(scope.0 as usize)
        .and_then(|s| s.cache.get(key).copied())
}

fn cache(ctx: &mut MappingContext<'_, '_>, scope: InlineScopeId, key: TypeMappingKey, id: MappingId) {
    if let Some(s) = ctx.state.inline_scopes.get_mut(scope.0 as usize) {
        s.cache.insert(key, id);
    }
}

/// Memo-only lookup: the scope cache, then user mappings.
pub(crate) fn find(ctx: &mut MappingContext<'_, '_>, scope: InlineScopeId, key: &TypeMappingKey) -> Option<MappingId> {
    let db = ctx.db();
    let key = TypeMappingKey::new(
        db,
        upgrade_nullable_reference(db, key.source()),
        upgrade_nullable_reference(db, key.target()),
        Arc::clone(key.config()),
        true,
    );
    if let Some(id) = cached(ctx, scope, &key) {
        return Some(id);
    }
    let user = ctx.state.mappings.find(&key)?;
    use_user_mapping(ctx, scope, user, key).ok().flatten()
}

pub(crate) fn find_or_build(
    ctx: &mut MappingContext<'_, '_>,
    scope: InlineScopeId,
    source: TypeId,
    target: TypeId,
    config: Arc<MappingConfiguration>,
) -> Result<MappingId, Unresolved> {
    let db = ctx.db();
    let source = upgrade_nullable_reference(db, source);
    let target = upgrade_nullable_reference(db, target);
    let key = TypeMappingKey::new(db, source, target, Arc::clone(&config), true);
    if let Some(id) = cached(ctx, scope, &key) {
        return Ok(id);
    }
    if let Some(user) = ctx.state.mappings.find(&key) {
        if let Some(id) = use_user_mapping(ctx, scope, user, key.clone())? {
            return Ok(id);
        }
    }
    build(ctx, scope, source, target, config, key)
}

/// Resolve a user mapping found for `key` into something usable inside an
/// expression. `None` means the user mapping does not apply here and the
/// pair is built from scratch.
fn use_user_mapping(
    ctx: &mut MappingContext<'_, '_>,
    scope: InlineScopeId,
    user: MappingId,
    key: TypeMappingKey,
) -> Result<Option<MappingId>, Unresolved> {
    let Some(mapping) = ctx.mapping(user) else {
        return Ok(None);
    };
    if !mapping.is_user() {
        return Ok(None);
    }
    let (source, target) = (mapping.source, mapping.target);
    match mapping.kind.clone() {
        MappingKind::UserImplemented { method, inline_body } => {
            let Some(body) = inline_body else {
                report_not_inlinable(ctx, scope, &method);
                return Ok(Some(user));
            };
            match inline_rewrite::inline_user_body(ctx, scope, user, &body) {
                Ok(expr) => {
                    let inlined = ctx.push_mapping_for(
                        source,
                        target,
                        MappingKind::Inlined {
                            body: InlineBody {
                                parameter: body.parameter.clone(),
                                expr,
                            },
                        },
                        MappingFlags::CALLABLE_BY_OTHERS,
                    );
                    trace!(user = user.0, inlined = inlined.0, method = %method, "inlined user mapping");
                    cache(ctx, scope, key, inlined);
                    Ok(Some(inlined))
                }
                Err(reason) => {
                    debug!(method = %method, ?reason, "user mapping stays a call");
                    report_not_inlinable(ctx, scope, &method);
                    Ok(Some(user))
                }
            }
        }
        MappingKind::UserNewInstance { config, .. } => {
            let key = TypeMappingKey::new(ctx.db(), source, target, Arc::clone(&config), true);
            if let Some(id) = cached(ctx, scope, &key) {
                return Ok(Some(id));
            }
            build(ctx, scope, source, target, config, key).map(Some)
        }
        _ => Ok(None),
    }
}

fn report_not_inlinable(ctx: &mut MappingContext<'_, '_>, scope: InlineScopeId, method: &str) {
    if scope_kind(ctx, scope) == InlineScopeKind::Queryable {
        ctx.report(PROJECTION_USER_MAPPING_CANNOT_INLINE, vec![method.to_string()]);
    }
}

/// Build eagerly, body included, under the depth guard.
fn build(
    ctx: &mut MappingContext<'_, '_>,
    scope: InlineScopeId,
    source: TypeId,
    target: TypeId,
    config: Arc<MappingConfiguration>,
    key: TypeMappingKey,
) -> Result<MappingId, Unresolved> {
    let pair = (source, target);
    let (entered, max_depth) = match ctx.state.inline_scopes.get_mut(scope.0 as usize) {
        Some(s) => (s.depth_guard.enter(pair), s.depth_guard.max_reentries()),
        None => return Err(Unresolved::NoStrategy),
    };
    match entered {
        RecursionResult::Entered => {}
        result => {
            debug!(
                source = %ctx.type_name(source),
                target = %ctx.type_name(target),
                ?result,
                max_depth,
                "projection depth reached"
            );
            return Err(Unresolved::RecursionLimit { depth: max_depth });
        }
    }

    let built = build_with_body(ctx, source, target, config);

    if let Some(s) = ctx.state.inline_scopes.get_mut(scope.0 as usize) {
        s.depth_guard.leave(pair);
    }
    let id = built?;
    cache(ctx, scope, key, id);
    Ok(id)
}

fn build_with_body(
    ctx: &mut MappingContext<'_, '_>,
    source: TypeId,
    target: TypeId,
    config: Arc<MappingConfiguration>,
) -> Result<MappingId, Unresolved> {
    let mut nested = ctx.with_types(source, target, config);
    let id = strategies::build_new_instance(&mut nested).ok_or(Unresolved::NoStrategy)?;
    let pending = nested.mapping(id).is_some_and(|m| m.needs_body());
    if pending {
        if let Err(err) = body::build_body(&mut nested, id) {
            warn!(mapping_id = id.0, error = %err, "inline body failed");
            return Err(Unresolved::NoStrategy);
        }
    }
    Ok(id)
}
