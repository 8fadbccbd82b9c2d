//! Member by member object bodies.
//!
//! Order of work for a new instance:
//! 1. validate the member configuration against both types
//! 2. pick how the instance is created: factory, then the best constructor
//!    whose parameters can all be matched
//! 3. map configured members, then every remaining target member by name
//! 4. report source members nothing read
//!
//! Existing target bodies skip step 2 and assign everything after the fact.

use super::value::{
    Placement, TargetSlot, ValueOverrides, constant_value, member_value, report_unresolved,
};
use crate::config::MemberMappingConfig;
use crate::context::MappingContext;
use crate::mapping::{
    ConstructorArgument, MappingId, MemberAssignment, MemberNullHandling, MemberValue, ObjectBody,
    ObjectCreation, SourceValue,
};
use crate::members::matcher::MemberMatcher;
use crate::members::path::MemberPath;
use mapforge_common::Atom;
use mapforge_common::diagnostic_codes::{
    CANNOT_MAP_FROM_WRITE_ONLY_MEMBER, CANNOT_MAP_TO_READ_ONLY_MEMBER,
    CONFIGURED_SOURCE_MEMBER_NOT_FOUND, CONFIGURED_TARGET_MEMBER_NOT_FOUND,
    CONSTANT_VALUE_TYPE_MISMATCH, IGNORED_MEMBER_NOT_FOUND, NO_CONSTRUCTOR_FOUND,
    REFERENCE_LOOP_IN_CTOR_MAPPING, REFERENCE_LOOP_IN_INIT_ONLY_MAPPING,
    REFERENCED_MAPPING_AMBIGUOUS, REFERENCED_MAPPING_NOT_FOUND, REQUIRED_MEMBER_NOT_MAPPED,
    SOURCE_MEMBER_NOT_FOUND, SOURCE_MEMBER_NOT_MAPPED,
};
use mapforge_types::queries::{
    constructors_of, find_member, is_value_type, members_of, non_nullable,
};
use mapforge_types::{ConstructorFlags, ConstructorInfo, MemberInfo, TypeId, classify_conversion};
use rustc_hash::FxHashSet;
use tracing::trace;

pub(super) fn build_new_instance(ctx: &mut MappingContext<'_, '_>, id: MappingId) -> ObjectBody {
    let mut builder = ObjectBodyBuilder::new(ctx, id, false);
    builder.validate_configuration();
    let creation = builder.build_creation();
    builder.build_members();
    builder.report_unmapped_sources();
    builder.finish(creation)
}

pub(super) fn build_existing_target(ctx: &mut MappingContext<'_, '_>, id: MappingId) -> ObjectBody {
    let mut builder = ObjectBodyBuilder::new(ctx, id, true);
    builder.validate_configuration();
    builder.build_members();
    builder.report_unmapped_sources();
    builder.finish(ObjectCreation::Existing)
}

struct ObjectBodyBuilder<'c, 's, 'a> {
    ctx: &'c mut MappingContext<'s, 'a>,
    id: MappingId,
    source: TypeId,
    target: TypeId,
    existing: bool,
    matcher: MemberMatcher<'a>,
    /// Top level source members read by some value.
    used_sources: FxHashSet<Atom>,
    /// Lowercased names of target members (and constructor parameters)
    /// already taken care of.
    mapped_targets: FxHashSet<String>,
    initializers: Vec<MemberAssignment>,
    assignments: Vec<MemberAssignment>,
}

impl<'c, 's, 'a> ObjectBodyBuilder<'c, 's, 'a> {
    fn new(ctx: &'c mut MappingContext<'s, 'a>, id: MappingId, existing: bool) -> Self {
        let db = ctx.db();
        let source = non_nullable(db, ctx.source);
        let target = non_nullable(db, ctx.target);
        let matcher = MemberMatcher::new(db, source, ctx.config.ignore_member_case());
        Self {
            ctx,
            id,
            source,
            target,
            existing,
            matcher,
            used_sources: FxHashSet::default(),
            mapped_targets: FxHashSet::default(),
            initializers: Vec::new(),
            assignments: Vec::new(),
        }
    }

    fn finish(self, creation: ObjectCreation) -> ObjectBody {
        ObjectBody {
            creation,
            initializers: self.initializers,
            assignments: self.assignments,
        }
    }

    fn is_self_reference(&self, mapping: MappingId) -> bool {
        mapping == self.id || Some(mapping) == self.ctx.user_mapping()
    }

    fn mark_used(&mut self, path: &MemberPath) {
        if let Some(first) = path.segments.first() {
            self.used_sources.insert(first.name);
        }
    }

    // =========================================================================
    // Configuration checks
    // =========================================================================

    fn validate_configuration(&mut self) {
        let db = self.ctx.db();
        let members = self.ctx.config.members.clone();
        let source_name = self.ctx.type_name(self.source);
        let target_name = self.ctx.type_name(self.target);

        for name in &members.ignored_target {
            if find_member(db, self.target, name, false).is_none() {
                let args = vec![name.clone(), target_name.clone()];
                self.ctx.report(IGNORED_MEMBER_NOT_FOUND, args);
            }
        }
        for name in &members.ignored_source {
            if find_member(db, self.source, name, false).is_none() {
                let args = vec![name.clone(), source_name.clone()];
                self.ctx.report(IGNORED_MEMBER_NOT_FOUND, args);
            }
        }
        for explicit in &members.explicit {
            if self.matcher.resolve_configured(&explicit.source).is_none() {
                let args = vec![explicit.source.join("."), source_name.clone()];
                self.ctx.report(CONFIGURED_SOURCE_MEMBER_NOT_FOUND, args);
            }
            if MemberPath::resolve(db, self.target, &explicit.target, false).is_none() {
                let args = vec![explicit.target.join("."), target_name.clone()];
                self.ctx.report(CONFIGURED_TARGET_MEMBER_NOT_FOUND, args);
            }
        }
        for constant in &members.constants {
            let Some(path) = MemberPath::resolve(db, self.target, &constant.target, false) else {
                let args = vec![constant.target.join("."), target_name.clone()];
                self.ctx.report(CONFIGURED_TARGET_MEMBER_NOT_FOUND, args);
                continue;
            };
            let member_type = path.member_type();
            let assignable = constant.value_type == member_type
                || classify_conversion(db, constant.value_type, member_type).is_implicit();
            if !assignable {
                let args = vec![
                    constant.value.clone(),
                    path.full_name(db),
                    self.ctx.type_name(member_type),
                ];
                self.ctx.report(CONSTANT_VALUE_TYPE_MISMATCH, args);
            }
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn build_creation(&mut self) -> ObjectCreation {
        let db = self.ctx.db();
        if let Some(factory) = self.ctx.factories().find(db, self.source, self.target) {
            trace!(mapping_id = self.id.0, factory = factory.0, "object factory");
            return ObjectCreation::Factory { factory };
        }

        let mut constructors = constructors_of(db, self.target);
        if constructors.is_empty() && is_value_type(db, self.target) {
            return ObjectCreation::Constructor { args: Vec::new() };
        }
        let prefer_parameterless = self.ctx.config.prefer_parameterless_constructors;
        constructors.sort_by_key(|ctor| {
            let marked = ctor.flags.contains(ConstructorFlags::MAPPER_CONSTRUCTOR);
            let obsolete = ctor.flags.contains(ConstructorFlags::OBSOLETE);
            let parameterless = prefer_parameterless && ctor.is_parameterless();
            (
                !marked,
                obsolete,
                !parameterless,
                std::cmp::Reverse(ctor.params.len()),
            )
        });

        for ctor in &constructors {
            if let Some(args) = self.try_constructor(ctor) {
                return ObjectCreation::Constructor { args };
            }
        }
        let args = vec![self.ctx.type_name(self.target)];
        self.ctx.report(NO_CONSTRUCTOR_FOUND, args);
        ObjectCreation::Unavailable
    }

    /// Match every parameter of `ctor`; nothing is recorded unless all match.
    fn try_constructor(&mut self, ctor: &ConstructorInfo) -> Option<Vec<ConstructorArgument>> {
        let db = self.ctx.db();
        let mut args = Vec::with_capacity(ctor.params.len());
        let mut used = Vec::new();
        for param in &ctor.params {
            let name = db.resolve_atom(param.name).to_string();
            let slot = TargetSlot {
                name: &name,
                type_id: param.type_id,
                placement: Placement::Constructor,
            };
            match self.param_value(&slot) {
                Some((value, path)) => {
                    if let Some(path) = path {
                        used.push(path);
                    }
                    args.push(ConstructorArgument {
                        parameter: param.name,
                        value,
                    });
                }
                None if param.has_default => {}
                None => return None,
            }
        }
        for arg in &args {
            self.mapped_targets
                .insert(db.resolve_atom(arg.parameter).to_lowercase());
        }
        for path in &used {
            self.mark_used(path);
        }
        Some(args)
    }

    fn param_value(&mut self, slot: &TargetSlot<'_>) -> Option<(MemberValue, Option<MemberPath>)> {
        let members = self.ctx.config.members.clone();
        let matches_param = |target: &[String]| {
            target.len() == 1 && target[0].eq_ignore_ascii_case(slot.name)
        };
        if let Some(constant) = members.constants.iter().find(|c| matches_param(&c.target)) {
            return Some((constant_value(&constant.value), None));
        }
        let explicit = members.explicit.iter().find(|e| matches_param(&e.target));
        let (path, overrides) = match explicit {
            Some(explicit) => {
                let path = self.matcher.resolve_configured(&explicit.source)?;
                (path, self.overrides_for(explicit)?)
            }
            None => {
                let ignore_case_matcher = MemberMatcher::new(self.ctx.db(), self.source, true);
                let path = ignore_case_matcher.find_source_path(slot.name)?;
                (path, ValueOverrides::default())
            }
        };
        if !path.is_readable() {
            return None;
        }
        let value = member_value(self.ctx, path.clone(), slot, &overrides).ok()?;
        if value.mapping.is_some_and(|m| self.is_self_reference(m)) {
            let args = vec![self.ctx.type_name(self.target), slot.name.to_string()];
            self.ctx.report(REFERENCE_LOOP_IN_CTOR_MAPPING, args);
            return None;
        }
        Some((value, Some(path)))
    }

    /// Overrides of an explicit member configuration; `None` when the named
    /// mapping it references cannot be used.
    fn overrides_for<'e>(&mut self, explicit: &'e MemberMappingConfig) -> Option<ValueOverrides<'e>> {
        let using = match &explicit.use_mapping {
            Some(name) => match self.ctx.mappings().find_named(name) {
                (Some(id), false) => Some(id),
                (Some(_), true) => {
                    self.ctx.report(REFERENCED_MAPPING_AMBIGUOUS, vec![name.clone()]);
                    return None;
                }
                (None, _) => {
                    self.ctx.report(REFERENCED_MAPPING_NOT_FOUND, vec![name.clone()]);
                    return None;
                }
            },
            None => None,
        };
        Some(ValueOverrides {
            using,
            string_format: explicit.string_format.as_deref(),
        })
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn build_members(&mut self) {
        let members = self.ctx.config.members.clone();

        for constant in &members.constants {
            let db = self.ctx.db();
            let Some(path) = MemberPath::resolve(db, self.target, &constant.target, false) else {
                continue;
            };
            let top = path.names(db).remove(0).to_lowercase();
            if self.mapped_targets.contains(&top) {
                continue;
            }
            let access = self.target_access(&path);
            self.push_assignment(&path, constant_value(&constant.value), access, false);
            if path.segments.len() == 1 {
                self.mapped_targets.insert(top);
            }
        }

        for explicit in &members.explicit {
            let db = self.ctx.db();
            let Some(target_path) = MemberPath::resolve(db, self.target, &explicit.target, false) else {
                continue;
            };
            let top = target_path.names(db).remove(0).to_lowercase();
            if self.mapped_targets.contains(&top) {
                continue;
            }
            let Some(source_path) = self.matcher.resolve_configured(&explicit.source) else {
                continue;
            };
            if let Some(overrides) = self.overrides_for(explicit) {
                self.map_member(&target_path, source_path, &overrides);
            }
            if target_path.segments.len() == 1 {
                self.mapped_targets.insert(top);
            }
        }

        for member in members_of(self.ctx.db(), self.target) {
            let name = self.ctx.db().resolve_atom(member.name).to_string();
            if self.mapped_targets.contains(&name.to_lowercase()) {
                continue;
            }
            if members.ignored_target.iter().any(|ignored| *ignored == name) {
                continue;
            }
            self.map_by_name(&member, &name);
        }
    }

    fn map_by_name(&mut self, member: &MemberInfo, name: &str) {
        let Some(source_path) = self.matcher.find_source_path(name) else {
            let target_name = self.ctx.type_name(self.target);
            let source_name = self.ctx.type_name(self.source);
            if member.access.is_required() {
                let args = vec![name.to_string(), target_name, source_name];
                self.ctx.report(REQUIRED_MEMBER_NOT_MAPPED, args);
            } else if self.ctx.config.required_mapping_strategy.reports_target()
                && self.target_writable(member)
            {
                let args = vec![name.to_string(), target_name, source_name];
                self.ctx.report(SOURCE_MEMBER_NOT_FOUND, args);
            }
            return;
        };
        let ignored_source = source_path.segments.first().is_some_and(|first| {
            let first = self.ctx.db().resolve_atom(first.name);
            self.ctx
                .config
                .members
                .ignored_source
                .iter()
                .any(|ignored| **ignored == *first)
        });
        if ignored_source {
            return;
        }
        let db = self.ctx.db();
        let Some(target_path) = MemberPath::resolve(db, self.target, &[name], false) else {
            return;
        };
        self.map_member(&target_path, source_path, &ValueOverrides::default());
        self.mapped_targets.insert(name.to_lowercase());
    }

    fn target_writable(&self, member: &MemberInfo) -> bool {
        if self.existing {
            member.access.can_set()
        } else {
            member.access.can_set_in_initializer()
        }
    }

    fn target_access(&self, path: &MemberPath) -> Option<MemberInfo> {
        let db = self.ctx.db();
        let last = path.segments.last()?;
        let owner = path.segments.len().checked_sub(2).map_or(self.target, |i| {
            non_nullable(db, path.segments[i].type_id)
        });
        find_member(db, owner, &db.resolve_atom(last.name), false)
    }

    fn map_member(&mut self, target_path: &MemberPath, source_path: MemberPath, overrides: &ValueOverrides<'_>) {
        let db = self.ctx.db();
        let target_name = target_path.full_name(db);
        if !source_path.is_readable() {
            let args = vec![source_path.full_name(db), self.ctx.type_name(self.source)];
            self.ctx.report(CANNOT_MAP_FROM_WRITE_ONLY_MEMBER, args);
            return;
        }
        let Some(member) = self.target_access(target_path) else {
            return;
        };
        self.mark_used(&source_path);

        if !self.target_writable(&member) {
            self.map_into_existing_member(target_path, source_path, &member, &target_name);
            return;
        }

        let placement = self.placement(&member, target_path);
        let slot = TargetSlot {
            name: &target_name,
            type_id: member.type_id,
            placement,
        };
        let source_type = source_path.member_type();
        let value = match member_value(self.ctx, source_path, &slot, overrides) {
            Ok(value) => value,
            Err(reason) => {
                report_unresolved(self.ctx, reason, source_type, member.type_id, &target_name);
                return;
            }
        };
        let init_only = member.access.is_init_only();
        if init_only && !self.ctx.is_inline() && value.mapping.is_some_and(|m| self.is_self_reference(m)) {
            let args = vec![self.ctx.type_name(self.target), target_name];
            self.ctx.report(REFERENCE_LOOP_IN_INIT_ONLY_MAPPING, args);
            return;
        }
        self.push_assignment(target_path, value, Some(member), false);
    }

    /// Read-only target member: map into its current value if an existing
    /// target mapping applies, otherwise report it.
    fn map_into_existing_member(
        &mut self,
        target_path: &MemberPath,
        source_path: MemberPath,
        member: &MemberInfo,
        target_name: &str,
    ) {
        let existing = if member.access.can_get() && !self.ctx.is_inline() {
            self.ctx
                .find_or_build_existing_target_mapping(source_path.member_type(), member.type_id)
        } else {
            None
        };
        let Some(mapping) = existing else {
            let args = vec![target_name.to_string(), self.ctx.type_name(self.target)];
            self.ctx.report(CANNOT_MAP_TO_READ_ONLY_MEMBER, args);
            return;
        };
        let value = MemberValue {
            source: SourceValue::Path(source_path),
            mapping: Some(mapping),
            null_handling: MemberNullHandling::None,
        };
        self.push_assignment(target_path, value, Some(member.clone()), true);
    }

    fn placement(&self, member: &MemberInfo, target_path: &MemberPath) -> Placement {
        if self.existing || target_path.segments.len() > 1 {
            return Placement::Assignment;
        }
        if self.ctx.is_inline() || member.access.is_init_only() || member.access.is_required() {
            Placement::Initializer
        } else {
            Placement::Assignment
        }
    }

    fn push_assignment(
        &mut self,
        target_path: &MemberPath,
        value: MemberValue,
        member: Option<MemberInfo>,
        existing: bool,
    ) {
        let placement = match &member {
            Some(member) if !existing => self.placement(member, target_path),
            _ => Placement::Assignment,
        };
        let assignment = MemberAssignment {
            target: target_path.segments.iter().map(|s| s.name).collect(),
            value,
            existing,
        };
        if placement == Placement::Initializer {
            self.initializers.push(assignment);
        } else {
            self.assignments.push(assignment);
        }
    }

    // =========================================================================
    // Unmapped sources
    // =========================================================================

    fn report_unmapped_sources(&mut self) {
        if !self.ctx.config.required_mapping_strategy.reports_source() {
            return;
        }
        let db = self.ctx.db();
        let ignored = self.ctx.config.members.ignored_source.clone();
        let source_name = self.ctx.type_name(self.source);
        let target_name = self.ctx.type_name(self.target);
        for member in members_of(db, self.source) {
            if !member.access.can_get() || self.used_sources.contains(&member.name) {
                continue;
            }
            let name = db.resolve_atom(member.name).to_string();
            if ignored.contains(&name) {
                continue;
            }
            let args = vec![name, source_name.clone(), target_name.clone()];
            self.ctx.report(SOURCE_MEMBER_NOT_MAPPED, args);
        }
    }
}
