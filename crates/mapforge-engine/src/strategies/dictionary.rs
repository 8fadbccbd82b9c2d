use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{CollectMethod, MappingFlags, MappingId, MappingKind};
use mapforge_types::collections::{can_create_empty, implements_collection_interface};
use mapforge_types::{CollectionInfo, CollectionType, collection_info};

/// Dictionary targets from any sequence of key value pairs.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::DICTIONARY) {
        return None;
    }
    let db = ctx.db();
    let target = collection_info(db, ctx.target).filter(CollectionInfo::is_dictionary)?;
    let source = collection_info(db, ctx.source).filter(CollectionInfo::is_enumerable)?;
    let (source_key, source_value) = source.key_value?;
    let (target_key, target_value) = target.key_value?;

    let key = ctx.find_or_build_mapping(source_key, target_key)?;
    let value = ctx.find_or_build_mapping(source_value, target_value)?;

    if ctx.is_synthetic(key)
        && ctx.is_synthetic(value)
        && !ctx.config.use_deep_cloning
        && implements_collection_interface(db, ctx.source, ctx.target)
    {
        return Some(ctx.push_mapping(
            MappingKind::Cast { explicit: false },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    let immutable_collect = match target.collection_type {
        CollectionType::ImmutableDictionary => Some(CollectMethod::ToImmutableDictionary),
        CollectionType::ImmutableSortedDictionary => Some(CollectMethod::ToImmutableSortedDictionary),
        _ => None,
    };
    if let Some(collect) = immutable_collect {
        return Some(ctx.push_mapping(
            MappingKind::ToDictionary { key, value, collect },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    let concrete_or_interface = matches!(
        target.collection_type,
        CollectionType::Dictionary | CollectionType::IDictionary | CollectionType::ReadOnlyDictionary
    );
    if ctx.is_inline() {
        return concrete_or_interface.then(|| {
            ctx.push_mapping(
                MappingKind::ToDictionary {
                    key,
                    value,
                    collect: CollectMethod::ToDictionary,
                },
                MappingFlags::CALLABLE_BY_OTHERS,
            )
        });
    }

    let creatable = target.is_interface()
        || ctx.factories().find(db, ctx.source, ctx.target).is_some()
        || can_create_empty(db, &target);
    if !creatable || (!target.has_add_method && !target.is_interface()) {
        return None;
    }
    Some(ctx.push_mapping(
        MappingKind::DictionaryForEachSet {
            key,
            value,
            body: None,
        },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
