use super::*;
use crate::mapping::MappingBody;
use mapforge_common::SymbolLocation;
use mapforge_types::{TypeId, TypeInterner};
use std::sync::Arc;

fn user_mapping(collection: &mut MappingCollection, name: &str) -> MappingId {
    let id = collection.push(
        TypeId::INT,
        TypeId::STRING,
        MappingKind::UserImplemented {
            method: name.to_string(),
            inline_body: None,
        },
        MappingFlags::USER | MappingFlags::METHOD | MappingFlags::CALLABLE_BY_OTHERS,
    );
    collection
        .set_method_name(id, name.to_string())
        .expect("mapping exists");
    id
}

fn int_to_string(db: &TypeInterner) -> TypeMappingKey {
    TypeMappingKey::new(db, TypeId::INT, TypeId::STRING, Arc::new(MappingConfiguration::default()), true)
}

#[test]
fn test_first_unmarked_user_mapping_becomes_default() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let first = user_mapping(&mut collection, "First");
    let second = user_mapping(&mut collection, "Second");

    let result = collection.add_user_mapping(first, int_to_string(&db), false, None, Some("First"));
    assert_eq!(result, MappingCollectionAddResult::Added);
    let result = collection.add_user_mapping(second, int_to_string(&db), false, None, Some("Second"));
    assert_eq!(result, MappingCollectionAddResult::NotAddedDuplicated);

    assert_eq!(collection.find(&int_to_string(&db)), Some(first));
}

#[test]
fn test_explicit_default_wins_over_earlier_unmarked() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let unmarked = user_mapping(&mut collection, "Unmarked");
    let marked = user_mapping(&mut collection, "Marked");

    collection.add_user_mapping(unmarked, int_to_string(&db), false, None, None);
    let result = collection.add_user_mapping(marked, int_to_string(&db), false, Some(true), None);
    assert_eq!(result, MappingCollectionAddResult::Added);
    assert_eq!(collection.find(&int_to_string(&db)), Some(marked));
}

#[test]
fn test_second_explicit_default_is_rejected() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let a = user_mapping(&mut collection, "A");
    let b = user_mapping(&mut collection, "B");

    assert_eq!(
        collection.add_user_mapping(a, int_to_string(&db), false, Some(true), None),
        MappingCollectionAddResult::Added
    );
    assert_eq!(
        collection.add_user_mapping(b, int_to_string(&db), false, Some(true), None),
        MappingCollectionAddResult::NotAddedDuplicatedDefault
    );
    assert_eq!(collection.find(&int_to_string(&db)), Some(a));
}

#[test]
fn test_non_default_user_mapping_is_reachable_by_name_only() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let id = user_mapping(&mut collection, "Special");

    let result = collection.add_user_mapping(id, int_to_string(&db), false, Some(false), Some("Special"));
    assert_eq!(result, MappingCollectionAddResult::NotAddedIgnored);
    assert_eq!(collection.find(&int_to_string(&db)), None);
    assert_eq!(collection.find_named("Special"), (Some(id), false));
}

#[test]
fn test_external_duplicates_are_ignored() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let local = user_mapping(&mut collection, "Local");
    let external = user_mapping(&mut collection, "External");

    collection.add_user_mapping(local, int_to_string(&db), false, None, None);
    let result = collection.add_user_mapping(external, int_to_string(&db), true, None, None);
    assert_eq!(result, MappingCollectionAddResult::NotAddedIgnored);

    collection.find(&int_to_string(&db));
    assert!(collection.used_duplicated_non_default_mappings().is_empty());
}

#[test]
fn test_duplicates_reported_only_when_used() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let first = user_mapping(&mut collection, "First");
    let second = user_mapping(&mut collection, "Second");
    collection.add_user_mapping(first, int_to_string(&db), false, None, None);
    collection.add_user_mapping(second, int_to_string(&db), false, None, None);

    assert!(collection.used_duplicated_non_default_mappings().is_empty());

    collection.find(&int_to_string(&db));
    assert_eq!(
        collection.used_duplicated_non_default_mappings(),
        vec![(first, vec![second])]
    );
}

#[test]
fn test_duplicates_not_reported_when_default_is_explicit() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let marked = user_mapping(&mut collection, "Marked");
    let other = user_mapping(&mut collection, "Other");
    collection.add_user_mapping(marked, int_to_string(&db), false, Some(true), None);
    collection.add_user_mapping(other, int_to_string(&db), false, None, None);

    collection.find(&int_to_string(&db));
    assert!(collection.used_duplicated_non_default_mappings().is_empty());
}

#[test]
fn test_same_name_on_two_methods_is_ambiguous() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let a = user_mapping(&mut collection, "MapA");
    let b = user_mapping(&mut collection, "MapB");

    collection.add_user_mapping(a, int_to_string(&db), false, Some(false), Some("Shared"));
    collection.add_user_mapping(b, int_to_string(&db), false, Some(false), Some("Shared"));

    assert_eq!(collection.find_named("Shared"), (Some(a), true));
    assert_eq!(collection.find_named("Missing"), (None, false));
}

#[test]
fn test_overloads_sharing_a_method_name_are_ambiguous() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let from_int = user_mapping(&mut collection, "Map");
    let from_long = collection.push(
        TypeId::LONG,
        TypeId::STRING,
        MappingKind::UserImplemented {
            method: "Map".to_string(),
            inline_body: None,
        },
        MappingFlags::USER | MappingFlags::METHOD | MappingFlags::CALLABLE_BY_OTHERS,
    );
    collection
        .set_method_name(from_long, "Map".to_string())
        .expect("mapping exists");
    let long_to_string = TypeMappingKey::new(
        &db,
        TypeId::LONG,
        TypeId::STRING,
        Arc::new(MappingConfiguration::default()),
        true,
    );

    collection.add_user_mapping(from_int, int_to_string(&db), false, None, Some("Map"));
    collection.add_user_mapping(from_long, long_to_string, false, None, Some("Map"));

    assert_eq!(collection.find_named("Map"), (Some(from_int), true));
}

#[test]
fn test_registering_the_same_mapping_twice_keeps_name_unambiguous() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let id = user_mapping(&mut collection, "Map");

    collection.add_user_mapping(id, int_to_string(&db), false, None, Some("Map"));
    collection.add_user_mapping(id, int_to_string(&db), true, None, Some("Map"));

    assert_eq!(collection.find_named("Map"), (Some(id), false));
}

#[test]
fn test_existing_target_mappings_use_their_own_table() {
    let db = TypeInterner::new();
    let mut collection = MappingCollection::new();
    let id = collection.push(
        TypeId::INT,
        TypeId::STRING,
        MappingKind::ExistingTargetObject { body: None },
        MappingFlags::EXISTING_TARGET,
    );

    assert_eq!(
        collection.try_add_as_default(id, int_to_string(&db)),
        MappingCollectionAddResult::Added
    );
    assert_eq!(collection.find(&int_to_string(&db)), None);
    assert_eq!(collection.find_existing_target(&int_to_string(&db)), Some(id));
    assert_eq!(
        collection.try_add_as_default(id, int_to_string(&db)),
        MappingCollectionAddResult::NotAddedDuplicated
    );
}

#[test]
fn test_complete_body_rejects_wrong_slot() {
    let mut collection = MappingCollection::new();
    let id = collection.push(TypeId::INT, TypeId::INT, MappingKind::Direct, MappingFlags::SYNTHETIC);

    let err = collection
        .complete_body(id, MappingBody::Delegate(None))
        .expect_err("direct mappings have no body");
    assert!(matches!(err, EngineError::BodyKindMismatch { expected: "delegate", .. }));
    assert!(!collection.get(id).expect("exists").flags.contains(MappingFlags::BODY_BUILT));
}

#[test]
fn test_complete_body_marks_built() {
    let mut collection = MappingCollection::new();
    let config = Arc::new(MappingConfiguration::default());
    let id = collection.push(
        TypeId::INT,
        TypeId::INT,
        MappingKind::UserNewInstance {
            delegate: None,
            config,
        },
        MappingFlags::USER | MappingFlags::METHOD,
    );
    let delegate = collection.push(TypeId::INT, TypeId::INT, MappingKind::Direct, MappingFlags::SYNTHETIC);

    collection
        .complete_body(id, MappingBody::Delegate(Some(delegate)))
        .expect("slot matches");
    let mapping = collection.get(id).expect("exists");
    assert!(mapping.flags.contains(MappingFlags::BODY_BUILT));
    assert!(matches!(mapping.kind, MappingKind::UserNewInstance { delegate: Some(d), .. } if d == delegate));
}

#[test]
fn test_body_queue_is_fifo() {
    let mut collection = MappingCollection::new();
    let config = Arc::new(MappingConfiguration::default());
    let a = collection.push(TypeId::INT, TypeId::INT, MappingKind::Tuple { body: None }, MappingFlags::empty());
    let b = collection.push(TypeId::INT, TypeId::INT, MappingKind::Tuple { body: None }, MappingFlags::empty());
    for id in [a, b] {
        collection.enqueue_to_build_body(
            id,
            BodyRequest {
                config: Arc::clone(&config),
                location: SymbolLocation::new("Mapper"),
                owner: None,
            },
        );
    }

    assert!(collection.has_pending_bodies());
    let drained: Vec<_> = collection
        .dequeue_mappings_to_build_body()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(drained, [a, b]);
    assert!(!collection.has_pending_bodies());
}

#[test]
fn test_unknown_mapping_is_an_error() {
    let mut collection = MappingCollection::new();
    assert!(matches!(
        collection.set_method_name(MappingId(3), "Map".to_string()),
        Err(EngineError::UnknownMapping(MappingId(3)))
    ));
}
