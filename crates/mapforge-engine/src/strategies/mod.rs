//! The mapping strategy chain.
//!
//! Each strategy inspects the source and target of the context and either
//! allocates a mapping shell or returns `None` so the next one is tried.
//! The order is significant: the first applicable strategy wins.
//!
//! - nullable unwrapping runs first so no other strategy sees `T?`
//! - direct assignment precedes every cast
//! - dictionaries precede enumerables (a dictionary is enumerable too)
//! - the member-by-member object mapping is the last resort
//!
//! Strategies that produce statements, switches or throws either check
//! `ctx.is_inline()` themselves or are marked not inline safe and skipped
//! in expression mode.

mod cast;
mod date_time;
mod derived;
mod dictionary;
mod direct;
mod enumerable;
mod enums;
mod existing_target;
mod nullable;
mod object;
mod parse;
mod queryable;
mod span;
mod to_string;
mod tuple;

pub(crate) use nullable::null_fallback_value;

use crate::context::MappingContext;
use crate::mapping::MappingId;
use tracing::{debug, trace};

pub type BuildFn = fn(&mut MappingContext<'_, '_>) -> Option<MappingId>;

pub struct StrategyEntry {
    pub name: &'static str,
    pub build: BuildFn,
    /// Whether the strategy runs in expression mode.
    pub inline_safe: bool,
}

const fn entry(name: &'static str, build: BuildFn, inline_safe: bool) -> StrategyEntry {
    StrategyEntry {
        name,
        build,
        inline_safe,
    }
}

/// New instance chain, in priority order.
pub static NEW_INSTANCE_STRATEGIES: &[StrategyEntry] = &[
    entry("nullable", nullable::build, true),
    entry("derived", derived::build, true),
    entry("to-object", cast::build_to_object, true),
    entry("direct", direct::build, true),
    entry("queryable", queryable::build, false),
    entry("dictionary", dictionary::build, true),
    entry("span", span::build_span, false),
    entry("memory", span::build_memory, false),
    entry("enumerable", enumerable::build, true),
    entry("implicit-cast", cast::build_implicit, true),
    entry("parse", parse::build_parse, true),
    entry("constructor", parse::build_constructor, true),
    entry("string-to-enum", enums::build_string_to_enum, true),
    entry("enum-to-string", enums::build_enum_to_string, true),
    entry("enum-to-enum", enums::build_enum_to_enum, true),
    entry("date-time", date_time::build, true),
    entry("explicit-cast", cast::build_explicit, true),
    entry("to-string", to_string::build, true),
    entry("value-tuple", tuple::build, false),
    entry("new-instance-object", object::build, true),
];

/// Chain for mappings into an existing target instance.
pub static EXISTING_TARGET_STRATEGIES: &[StrategyEntry] = &[
    entry("existing-nullable", existing_target::build_nullable, false),
    entry("existing-dictionary", existing_target::build_dictionary, false),
    entry("existing-enumerable", existing_target::build_enumerable, false),
    entry("existing-object", existing_target::build_object, false),
];

pub fn build_new_instance(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    run(ctx, NEW_INSTANCE_STRATEGIES)
}

pub fn build_existing_target(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    run(ctx, EXISTING_TARGET_STRATEGIES)
}

fn run(ctx: &mut MappingContext<'_, '_>, chain: &[StrategyEntry]) -> Option<MappingId> {
    let inline = ctx.is_inline();
    for strategy in chain {
        if inline && !strategy.inline_safe {
            continue;
        }
        if let Some(id) = (strategy.build)(ctx) {
            debug!(
                strategy = strategy.name,
                mapping_id = id.0,
                source = %ctx.type_name(ctx.source),
                target = %ctx.type_name(ctx.target),
                inline,
                "strategy applied"
            );
            return Some(id);
        }
    }
    trace!(
        source = %ctx.type_name(ctx.source),
        target = %ctx.type_name(ctx.target),
        "no strategy applies"
    );
    None
}
