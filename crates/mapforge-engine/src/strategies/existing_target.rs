//! Mappings into an instance the caller already has. These only ever
//! produce statements.

use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::{is_enum, is_nullable, is_object_like, non_nullable};
use mapforge_types::{CollectionInfo, collection_info};
use std::sync::Arc;

const FLAGS: MappingFlags = MappingFlags::EXISTING_TARGET.union(MappingFlags::CALLABLE_BY_OTHERS);

pub(super) fn build_nullable(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    if !is_nullable(db, ctx.source) && !is_nullable(db, ctx.target) {
        return None;
    }
    let source = non_nullable(db, ctx.source);
    let target = non_nullable(db, ctx.target);
    let config = Arc::clone(&ctx.config);
    let inner = ctx.find_or_build_existing_target_mapping_with_config(source, target, config)?;
    Some(ctx.push_mapping(MappingKind::ExistingTargetNullGuard { inner }, FLAGS))
}

pub(super) fn build_dictionary(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    let target = collection_info(db, ctx.target).filter(CollectionInfo::is_dictionary)?;
    if target.immutable || !target.has_add_method {
        return None;
    }
    let source = collection_info(db, ctx.source).filter(CollectionInfo::is_enumerable)?;
    let (source_key, source_value) = source.key_value?;
    let (target_key, target_value) = target.key_value?;
    let key = ctx.find_or_build_mapping(source_key, target_key)?;
    let value = ctx.find_or_build_mapping(source_value, target_value)?;
    Some(ctx.push_mapping(
        MappingKind::DictionaryForEachSet {
            key,
            value,
            body: None,
        },
        FLAGS,
    ))
}

pub(super) fn build_enumerable(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    let target = collection_info(db, ctx.target)?;
    if target.immutable || !target.has_add_method || target.is_dictionary() {
        return None;
    }
    let source = collection_info(db, ctx.source).filter(CollectionInfo::is_enumerable)?;
    let element = ctx.find_or_build_mapping(source.element, target.element)?;
    Some(ctx.push_mapping(
        MappingKind::ForEachAdd {
            element,
            body: None,
        },
        FLAGS,
    ))
}

pub(super) fn build_object(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    let db = ctx.db();
    if !is_object_like(db, ctx.target) || ctx.source.is_intrinsic() || is_enum(db, ctx.source) {
        return None;
    }
    Some(ctx.push_mapping(MappingKind::ExistingTargetObject { body: None }, FLAGS))
}
