//! Values read from a source member path and converted for one target slot
//! (constructor parameter, initializer or assignment).

use crate::context::{MappingContext, Unresolved};
use crate::mapping::{MappingId, MemberNullHandling, MemberValue, NullFallbackValue, SourceValue};
use crate::members::path::{MemberPath, is_nullable_in_mode};
use crate::strategies::null_fallback_value;
use mapforge_common::diagnostic_codes::{
    COULD_NOT_CREATE_MAPPING, NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE,
    PROJECTION_MAX_RECURSION_DEPTH_REACHED,
};
use mapforge_types::TypeId;
use mapforge_types::queries::{accepts_null, non_nullable};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Placement {
    Constructor,
    Initializer,
    Assignment,
}

/// Where a value goes.
pub(super) struct TargetSlot<'n> {
    pub name: &'n str,
    pub type_id: TypeId,
    pub placement: Placement,
}

/// Per-member overrides from an explicit member configuration.
#[derive(Default)]
pub(super) struct ValueOverrides<'c> {
    /// Named user mapping to convert with.
    pub using: Option<MappingId>,
    pub string_format: Option<&'c str>,
}

/// Resolve the conversion of `path` into `slot` and decide how a `null` on
/// the way is handled.
pub(super) fn member_value(
    ctx: &mut MappingContext<'_, '_>,
    path: MemberPath,
    slot: &TargetSlot<'_>,
    overrides: &ValueOverrides<'_>,
) -> Result<MemberValue, Unresolved> {
    let db = ctx.db();
    let inline = ctx.is_inline();
    let source_type = path.member_type();
    let target_accepts_null = accepts_null(db, slot.type_id);
    let mapped_source = if target_accepts_null {
        source_type
    } else {
        non_nullable(db, source_type)
    };

    let mapping = match overrides.using {
        Some(id) => id,
        None => {
            let config = match overrides.string_format {
                Some(format) => Arc::new(ctx.nested_config().with_string_format(Some(format.to_string()))),
                None => ctx.nested_config(),
            };
            ctx.try_find_or_build(mapped_source, slot.type_id, config)?
        }
    };

    let prefix_nullable = path.has_nullable_prefix(db, inline);
    let leaf_nullable = is_nullable_in_mode(db, source_type, inline);
    let null_handling = if !target_accepts_null && (leaf_nullable || prefix_nullable) {
        let args = vec![source_display(ctx, &path), slot.name.to_string()];
        ctx.report(NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE, args);
        let null_handling = ctx.config.null_handling;
        if null_handling.throw_on_member_null_mismatch && !inline {
            MemberNullHandling::Throw
        } else if slot.placement == Placement::Assignment && !inline {
            MemberNullHandling::SkipIfNull
        } else {
            MemberNullHandling::Coalesce(null_fallback_value(ctx, slot.type_id, false))
        }
    } else if target_accepts_null && prefix_nullable {
        let allow_null = ctx.config.null_handling.allow_null_member_assignment;
        if allow_null || inline || slot.placement != Placement::Assignment {
            MemberNullHandling::Coalesce(NullFallbackValue::Default)
        } else {
            MemberNullHandling::SkipIfNull
        }
    } else {
        MemberNullHandling::None
    };

    Ok(MemberValue {
        source: SourceValue::Path(path),
        mapping: Some(mapping),
        null_handling,
    })
}

pub(super) fn constant_value(value: &str) -> MemberValue {
    MemberValue {
        source: SourceValue::Constant(value.to_string()),
        mapping: None,
        null_handling: MemberNullHandling::None,
    }
}

/// `source` or `source.A.B` as shown in diagnostics.
pub(super) fn source_display(ctx: &MappingContext<'_, '_>, path: &MemberPath) -> String {
    if path.is_root() {
        "source".to_string()
    } else {
        format!("source.{}", path.full_name(ctx.db()))
    }
}

/// Report why the value for `member` could not be converted.
pub(super) fn report_unresolved(
    ctx: &mut MappingContext<'_, '_>,
    reason: Unresolved,
    source: TypeId,
    target: TypeId,
    member: &str,
) {
    match reason {
        Unresolved::RecursionLimit { depth } => {
            let pair = format!("{} -> {}", ctx.type_name(source), ctx.type_name(target));
            let args = vec![depth.to_string(), pair, member.to_string()];
            ctx.report(PROJECTION_MAX_RECURSION_DEPTH_REACHED, args);
        }
        Unresolved::NoStrategy => {
            let args = vec![ctx.type_name(source), ctx.type_name(target)];
            ctx.report(COULD_NOT_CREATE_MAPPING, args);
        }
    }
}
