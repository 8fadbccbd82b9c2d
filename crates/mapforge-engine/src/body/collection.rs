use crate::context::MappingContext;
use crate::mapping::{CollectionCreation, InsertMethod, LoopBody, Mapping};
use mapforge_types::{CollectionInfo, CollectionType, GenericKind, collection_info};

/// Creation, capacity hint and insert call of a population loop.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>, mapping: &Mapping) -> LoopBody {
    let db = ctx.db();
    let target = collection_info(db, mapping.target);
    let source = collection_info(db, mapping.source);

    let creation = if mapping.is_existing_target() {
        CollectionCreation::Existing
    } else if let Some(factory) = ctx.factories().find(db, mapping.source, mapping.target) {
        CollectionCreation::Factory { factory }
    } else {
        // Interface dictionaries are populated through a `Dictionary<K, V>`.
        let type_id = target
            .as_ref()
            .filter(|info| info.is_dictionary() && info.is_interface())
            .and_then(|info| info.key_value)
            .map_or(mapping.target, |(key, value)| {
                db.generic(GenericKind::Dictionary, &[key, value])
            });
        CollectionCreation::New { type_id }
    };

    let ensure_capacity = match (&source, &target) {
        (Some(source), Some(target)) if supports_ensure_capacity(target) => source.count_member(),
        _ => None,
    };

    let insert = match &target {
        Some(info) if info.is_dictionary() => InsertMethod::Indexer,
        Some(info) if info.collection_type == CollectionType::Stack => InsertMethod::Push,
        Some(info) if info.collection_type == CollectionType::Queue => InsertMethod::Enqueue,
        _ => InsertMethod::Add,
    };

    LoopBody {
        creation,
        ensure_capacity,
        insert,
    }
}

fn supports_ensure_capacity(target: &CollectionInfo) -> bool {
    matches!(
        target.collection_type,
        CollectionType::List
            | CollectionType::HashSet
            | CollectionType::Dictionary
            | CollectionType::Stack
            | CollectionType::Queue
    )
}
