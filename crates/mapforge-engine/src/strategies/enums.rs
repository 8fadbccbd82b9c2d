//! Enum conversions: string ⇄ enum and enum → enum.

use crate::config::{EnumMappingStrategy, EnumNamingStrategy, MappingConversionType};
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_common::Atom;
use mapforge_common::diagnostic_codes::{
    ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION, ENUM_FALLBACK_VALUE_INVALID,
    ENUM_SOURCE_VALUE_NOT_MAPPED, ENUM_TARGET_VALUE_NOT_MAPPED,
};
use mapforge_types::queries::{enum_info, is_string};
use mapforge_types::{EnumInfo, TypeId};
use rustc_hash::FxHashSet;

/// The configured fallback member of `target`, reporting a name the enum
/// does not declare.
pub(crate) fn enum_fallback(ctx: &mut MappingContext<'_, '_>, target: TypeId) -> Option<Atom> {
    let fallback = ctx.config.enums.fallback.clone()?;
    let db = ctx.db();
    let info = enum_info(db, target)?;
    let found = info
        .members
        .iter()
        .find(|m| *db.resolve_atom(m.name) == *fallback)
        .map(|m| m.name);
    if found.is_none() {
        let args = vec![fallback, ctx.type_name(target)];
        ctx.report(ENUM_FALLBACK_VALUE_INVALID, args);
    }
    found
}

fn member_names(ctx: &MappingContext<'_, '_>, info: &EnumInfo) -> Vec<(Atom, String)> {
    let db = ctx.db();
    info.members
        .iter()
        .map(|m| (m.name, db.resolve_atom(m.name).to_string()))
        .collect()
}

// =============================================================================
// string → enum
// =============================================================================

pub(super) fn build_string_to_enum(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::STRING_TO_ENUM) {
        return None;
    }
    let db = ctx.db();
    if !is_string(db, ctx.source) {
        return None;
    }
    let info = enum_info(db, ctx.target)?;
    let ignore_case = ctx.config.enums.ignore_case;

    if ctx.is_inline() {
        return Some(ctx.push_mapping(
            MappingKind::StringToEnum {
                arms: Vec::new(),
                ignore_case,
                fallback: None,
                use_parse: true,
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    let target = ctx.target;
    let fallback = enum_fallback(ctx, target);
    let enums = &ctx.config.enums;
    let needs_switch = enums.strategy == EnumMappingStrategy::ByName
        || enums.naming != EnumNamingStrategy::MemberName
        || !enums.explicit_values.is_empty()
        || fallback.is_some();
    if !needs_switch {
        return Some(ctx.push_mapping(
            MappingKind::StringToEnum {
                arms: Vec::new(),
                ignore_case,
                fallback: None,
                use_parse: true,
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    let mut arms: Vec<(String, Atom)> = Vec::new();
    let members = member_names(ctx, &info);
    for (source_text, target_name) in &enums.explicit_values {
        if let Some((atom, _)) = members.iter().find(|(_, name)| name == target_name) {
            arms.push((source_text.clone(), *atom));
        }
    }
    for (atom, name) in &members {
        if enums.ignored_target.contains(name) {
            continue;
        }
        arms.push((enums.naming.apply(name), *atom));
    }
    Some(ctx.push_mapping(
        MappingKind::StringToEnum {
            arms,
            ignore_case,
            fallback,
            use_parse: false,
        },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}

// =============================================================================
// enum → string
// =============================================================================

pub(super) fn build_enum_to_string(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::ENUM_TO_STRING) {
        return None;
    }
    let db = ctx.db();
    if !is_string(db, ctx.target) {
        return None;
    }
    let info = enum_info(db, ctx.source)?;
    let enums = &ctx.config.enums;
    let plain = enums.naming == EnumNamingStrategy::MemberName && enums.explicit_values.is_empty();
    if ctx.is_inline() || plain {
        return Some(ctx.push_mapping(
            MappingKind::EnumToString { arms: Vec::new() },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    let arms = member_names(ctx, &info)
        .into_iter()
        .filter(|(_, name)| !enums.ignored_source.contains(name))
        .map(|(atom, name)| {
            let text = enums
                .explicit_values
                .iter()
                .find(|(source, _)| *source == name)
                .map_or_else(|| enums.naming.apply(&name), |(_, target)| target.clone());
            (atom, text)
        })
        .collect();
    Some(ctx.push_mapping(
        MappingKind::EnumToString { arms },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}

// =============================================================================
// enum → enum
// =============================================================================

pub(super) fn build_enum_to_enum(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::ENUM_TO_ENUM) {
        return None;
    }
    let db = ctx.db();
    let source_info = enum_info(db, ctx.source)?;
    let target_info = enum_info(db, ctx.target)?;

    let mut strategy = ctx.config.enums.strategy;
    if strategy == EnumMappingStrategy::ByName && ctx.is_inline() {
        let args = vec![ctx.type_name(ctx.source), ctx.type_name(ctx.target)];
        ctx.report(ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION, args);
        strategy = EnumMappingStrategy::ByValue;
    }

    match strategy {
        EnumMappingStrategy::ByValue => Some(ctx.push_mapping(
            MappingKind::EnumByValue {
                check_defined: false,
                fallback: None,
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        )),
        EnumMappingStrategy::ByValueCheckDefined => {
            let target = ctx.target;
            let fallback = enum_fallback(ctx, target);
            Some(ctx.push_mapping(
                MappingKind::EnumByValue {
                    check_defined: true,
                    fallback,
                },
                MappingFlags::CALLABLE_BY_OTHERS,
            ))
        }
        EnumMappingStrategy::ByName => {
            let arms = by_name_arms(ctx, &source_info, &target_info);
            let target = ctx.target;
            let fallback = enum_fallback(ctx, target);
            Some(ctx.push_mapping(
                MappingKind::EnumByName { arms, fallback },
                MappingFlags::CALLABLE_BY_OTHERS,
            ))
        }
    }
}

/// Source member → target member pairs: explicit values first, then equal
/// names. Unmatched members on either side are reported as configured by
/// the required mapping strategy.
fn by_name_arms(ctx: &mut MappingContext<'_, '_>, source: &EnumInfo, target: &EnumInfo) -> Vec<(Atom, Atom)> {
    let source_members = member_names(ctx, source);
    let target_members = member_names(ctx, target);
    let enums = ctx.config.enums.clone();
    let required = ctx.config.required_mapping_strategy;

    let mut arms = Vec::new();
    let mut unmatched_source = Vec::new();
    for (source_atom, source_name) in &source_members {
        if enums.ignored_source.contains(source_name) {
            continue;
        }
        let explicit = enums
            .explicit_values
            .iter()
            .find(|(from, _)| from == source_name)
            .map(|(_, to)| to.as_str());
        let matched = target_members.iter().find(|(_, target_name)| match explicit {
            Some(to) => target_name == to,
            None if enums.ignore_case => target_name.eq_ignore_ascii_case(source_name),
            None => target_name == source_name,
        });
        match matched {
            Some((target_atom, _)) => arms.push((*source_atom, *target_atom)),
            None => unmatched_source.push(source_name.clone()),
        }
    }

    let source_type = ctx.type_name(ctx.source);
    let target_type = ctx.type_name(ctx.target);
    if required.reports_source() {
        for name in unmatched_source {
            let args = vec![name, source_type.clone(), target_type.clone()];
            ctx.report(ENUM_SOURCE_VALUE_NOT_MAPPED, args);
        }
    }
    if required.reports_target() {
        let mapped: FxHashSet<Atom> = arms.iter().map(|(_, t)| *t).collect();
        for (atom, name) in &target_members {
            if mapped.contains(atom) || enums.ignored_target.contains(name) {
                continue;
            }
            let args = vec![name.clone(), target_type.clone(), source_type.clone()];
            ctx.report(ENUM_TARGET_VALUE_NOT_MAPPED, args);
        }
    }
    arms
}
