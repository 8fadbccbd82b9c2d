//! Inlining of user implemented method bodies into projections.
//!
//! A body qualifies when it is a single expression over its one parameter
//! that an expression tree can represent. Calls to other user methods
//! inside it are inlined recursively; a method reached again while it is
//! being inlined aborts the rewrite.

use crate::context::MappingContext;
use crate::emit::ir::{Expr, ForbiddenConstruct};
use crate::inline::InlineScopeId;
use crate::mapping::{InlineBody, MappingId, MappingKind};
use crate::recursion::RecursionResult;
use tracing::trace;

/// Why a body stays a method call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InlineFailure {
    Forbidden(ForbiddenConstruct),
    /// The method (transitively) calls itself.
    Cycle,
    TooDeep,
}

/// Rewrite the body of user mapping `user`. The result still refers to the
/// body's own parameter.
pub(crate) fn inline_user_body(
    ctx: &mut MappingContext<'_, '_>,
    scope: InlineScopeId,
    user: MappingId,
    body: &InlineBody,
) -> Result<Expr, InlineFailure> {
    if let Some(construct) = body.expr.forbidden_construct() {
        return Err(InlineFailure::Forbidden(construct));
    }
    let entered = match ctx.state.inline_scopes.get_mut(scope.0 as usize) {
        Some(s) => s.inline_guard.enter(user),
        None => return Err(InlineFailure::TooDeep),
    };
    match entered {
        RecursionResult::Entered => {}
        RecursionResult::Cycle => return Err(InlineFailure::Cycle),
        RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
            return Err(InlineFailure::TooDeep);
        }
    }
    let result = rewrite_calls(ctx, scope, &body.expr);
    if let Some(s) = ctx.state.inline_scopes.get_mut(scope.0 as usize) {
        s.inline_guard.leave(user);
    }
    result
}

fn rewrite_calls(
    ctx: &mut MappingContext<'_, '_>,
    scope: InlineScopeId,
    expr: &Expr,
) -> Result<Expr, InlineFailure> {
    if let Expr::Call {
        receiver: None,
        method,
        args,
    } = expr
    {
        if let [arg] = args.as_slice() {
            let arg = rewrite_calls(ctx, scope, arg)?;
            if let Some((callee, body)) = inlinable_callee(ctx, method) {
                trace!(method = %method, callee = callee.0, "inline nested user call");
                let inner = inline_user_body(ctx, scope, callee, &body)?;
                return Ok(inner.substitute(&body.parameter, &arg));
            }
            return Ok(Expr::static_call(method.clone(), vec![arg]));
        }
    }
    expr.try_map_children(&mut |child| rewrite_calls(ctx, scope, child))
}

fn inlinable_callee(ctx: &MappingContext<'_, '_>, method: &str) -> Option<(MappingId, InlineBody)> {
    let (id, ambiguous) = ctx.mappings().find_named(method);
    let id = id.filter(|_| !ambiguous)?;
    match &ctx.mapping(id)?.kind {
        MappingKind::UserImplemented {
            inline_body: Some(body),
            ..
        } => Some((id, body.clone())),
        _ => None,
    }
}
