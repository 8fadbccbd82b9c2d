use super::*;
use mapforge_types::{TypeDatabase, TypeId, TypeInterner};
use rustc_hash::FxHashSet;
use std::sync::Arc;

fn defaults() -> Arc<MappingConfiguration> {
    Arc::new(MappingConfiguration::default())
}

#[test]
fn test_key_equal_for_value_equal_configs() {
    let db = TypeInterner::new();
    let a = TypeMappingKey::new(&db, TypeId::INT, TypeId::LONG, defaults(), true);
    let b = TypeMappingKey::new(&db, TypeId::INT, TypeId::LONG, defaults(), true);

    assert_eq!(a, b);
    let set: FxHashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_key_differs_by_config() {
    let db = TypeInterner::new();
    let overrides = MethodConfiguration::new().enum_strategy(EnumMappingStrategy::ByName);
    let by_name = Arc::new(MappingConfiguration::default().with_overrides(&overrides));

    let a = TypeMappingKey::new(&db, TypeId::INT, TypeId::LONG, defaults(), true);
    let b = TypeMappingKey::new(&db, TypeId::INT, TypeId::LONG, by_name, true);
    assert_ne!(a, b);
}

#[test]
fn test_key_differs_by_direction() {
    let db = TypeInterner::new();
    let config = defaults();
    let a = TypeMappingKey::new(&db, TypeId::INT, TypeId::LONG, Arc::clone(&config), true);
    let b = TypeMappingKey::new(&db, TypeId::LONG, TypeId::INT, config, true);
    assert_ne!(a, b);
}

#[test]
fn test_key_without_nullability_strips_reference_annotations() {
    let db = TypeInterner::new();
    let config = defaults();
    let nullable_string = db.nullable(TypeId::STRING);

    let annotated = TypeMappingKey::new(&db, nullable_string, TypeId::STRING, Arc::clone(&config), false);
    let plain = TypeMappingKey::new(&db, TypeId::STRING, TypeId::STRING, Arc::clone(&config), false);
    assert_eq!(annotated, plain);
    assert_eq!(annotated.source(), TypeId::STRING);
    assert!(!annotated.include_nullability());

    let strict = TypeMappingKey::new(&db, nullable_string, TypeId::STRING, config, true);
    assert_ne!(strict, plain);
}

#[test]
fn test_key_keeps_value_type_nullables() {
    let db = TypeInterner::new();
    let config = defaults();
    let nullable_int = db.nullable(TypeId::INT);

    let a = TypeMappingKey::new(&db, nullable_int, TypeId::INT, Arc::clone(&config), false);
    let b = TypeMappingKey::new(&db, TypeId::INT, TypeId::INT, config, false);
    assert_ne!(a, b);
    assert_eq!(a.source(), nullable_int);
}
