use super::*;
use crate::mapping::{CollectMethod, NullFallbackValue};
use crate::test_support::{diagnostic_count, drain, kind, render_expression, render_method, resolve, state, state_with};
use mapforge_common::SymbolLocation;
use mapforge_common::diagnostic_codes::{
    ENUM_SOURCE_VALUE_NOT_MAPPED, ENUM_TARGET_VALUE_NOT_MAPPED, NO_CONSTRUCTOR_FOUND,
    NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE, REFERENCE_LOOP_IN_CTOR_MAPPING,
    REFERENCE_LOOP_IN_INIT_ONLY_MAPPING,
};
use mapforge_types::{ConstructorFlags, DefKind, GenericKind, TypeDatabase, TypeId, TypeInterner};
use std::sync::Arc;

fn colors(db: &TypeInterner) -> (TypeId, TypeId) {
    let color = db.enumeration("Color", &[("Red", 0), ("Green", 1)]);
    let colour = db.enumeration("Colour", &[("Red", 0), ("Green", 1)]);
    (color, colour)
}

// =============================================================================
// Direct and nullable
// =============================================================================

#[test]
fn test_identical_types_are_direct_and_memoized() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let first = resolve(&mut state, TypeId::INT, TypeId::INT).expect("resolved");
    let second = resolve(&mut state, TypeId::INT, TypeId::INT).expect("resolved");

    assert_eq!(first, second);
    assert_eq!(kind(&state, first), MappingKind::Direct);
    assert!(state.mappings().get(first).is_some_and(Mapping::is_synthetic));
    assert_eq!(render_expression(&state, first), "source");
}

#[test]
fn test_find_mapping_never_builds() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let config = Arc::clone(state.defaults());
    let before = state.mappings().len();
    {
        let mut ctx = state.context(TypeId::INT, TypeId::LONG, config, SymbolLocation::new("TestMapper.Map"));
        assert_eq!(ctx.find_mapping(TypeId::INT, TypeId::LONG), None);
    }
    assert_eq!(state.mappings().len(), before);

    let id = resolve(&mut state, TypeId::INT, TypeId::LONG).expect("resolved");
    let config = Arc::clone(state.defaults());
    let mut ctx = state.context(TypeId::INT, TypeId::LONG, config, SymbolLocation::new("TestMapper.Map"));
    assert_eq!(ctx.find_mapping(TypeId::INT, TypeId::LONG), Some(id));
}

#[test]
fn test_nullable_to_nullable_passes_through() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let nullable_int = db.nullable(TypeId::INT);
    let id = resolve(&mut state, nullable_int, nullable_int).expect("resolved");

    assert!(matches!(
        kind(&state, id),
        MappingKind::NullDelegate {
            source_nullable: true,
            ..
        }
    ));
    assert_eq!(render_expression(&state, id), "source");
    assert_eq!(diagnostic_count(&state, NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE), 0);
}

#[test]
fn test_nullable_to_non_nullable_throws_by_default() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let id = resolve(&mut state, db.nullable(TypeId::INT), TypeId::INT).expect("resolved");

    assert_eq!(diagnostic_count(&state, NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE), 1);
    assert!(matches!(
        kind(&state, id),
        MappingKind::NullDelegate {
            fallback: NullFallbackValue::ThrowArgumentNull,
            ..
        }
    ));
    assert_eq!(
        render_expression(&state, id),
        "source ?? throw new System.ArgumentNullException(nameof(source))"
    );
}

#[test]
fn test_nullable_to_non_nullable_default_fallback() {
    let db = TypeInterner::new();
    let config = MapperConfiguration {
        throw_on_mapping_null_mismatch: false,
        ..MapperConfiguration::default()
    };
    let mut state = state_with(&db, &config);
    let id = resolve(&mut state, db.nullable(TypeId::INT), TypeId::INT).expect("resolved");

    assert!(matches!(
        kind(&state, id),
        MappingKind::NullDelegate {
            fallback: NullFallbackValue::Default,
            ..
        }
    ));
    assert_eq!(render_expression(&state, id), "source ?? default");
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_scalar_conversions() {
    let db = TypeInterner::new();
    let mut state = state(&db);

    let widen = resolve(&mut state, TypeId::INT, TypeId::LONG).expect("resolved");
    assert_eq!(kind(&state, widen), MappingKind::Cast { explicit: false });
    assert_eq!(render_expression(&state, widen), "(long)source");

    let parse = resolve(&mut state, TypeId::STRING, TypeId::INT).expect("resolved");
    assert_eq!(kind(&state, parse), MappingKind::Parse);
    assert_eq!(render_expression(&state, parse), "int.Parse(source)");

    let boxed = resolve(&mut state, TypeId::INT, TypeId::OBJECT).expect("resolved");
    assert_eq!(render_expression(&state, boxed), "(object)source");

    let text = resolve(&mut state, TypeId::INT, TypeId::STRING).expect("resolved");
    assert!(matches!(kind(&state, text), MappingKind::ToStringCall { .. }));
}

#[test]
fn test_disabled_conversion_is_skipped() {
    let db = TypeInterner::new();
    let config = MapperConfiguration {
        enabled_conversions: MappingConversionType::all() - MappingConversionType::PARSE_METHOD,
        ..MapperConfiguration::default()
    };
    let mut state = state_with(&db, &config);
    let id = resolve(&mut state, TypeId::STRING, TypeId::INT);
    assert!(id.is_none_or(|id| kind(&state, id) != MappingKind::Parse));
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_by_value_is_a_cast() {
    let db = TypeInterner::new();
    let (color, colour) = colors(&db);
    let mut state = state(&db);
    let id = resolve(&mut state, color, colour).expect("resolved");

    assert!(matches!(kind(&state, id), MappingKind::EnumByValue { .. }));
    assert_eq!(render_expression(&state, id), "(Colour)source");
}

#[test]
fn test_enum_by_name_builds_switch_method() {
    let db = TypeInterner::new();
    let (color, colour) = colors(&db);
    let config = MapperConfiguration {
        enum_mapping_strategy: EnumMappingStrategy::ByName,
        ..MapperConfiguration::default()
    };
    let mut state = state_with(&db, &config);
    let id = resolve(&mut state, color, colour).expect("resolved");

    assert!(matches!(kind(&state, id), MappingKind::EnumByName { .. }));
    assert_eq!(render_expression(&state, id), "MapToColour(source)");
    let body = render_method(&state, id);
    assert!(body.contains("Color.Red => Colour.Red,"), "{body}");
    assert!(body.contains("Color.Green => Colour.Green,"), "{body}");
    assert!(
        body.contains(
            "_ => throw new System.ArgumentOutOfRangeException(nameof(source), source, \"The value of enum Color is not supported\"),"
        ),
        "{body}"
    );
}

#[test]
fn test_enum_by_name_reports_unmatched_members() {
    let db = TypeInterner::new();
    let color = db.enumeration("Color", &[("Red", 0), ("Blue", 1)]);
    let colour = db.enumeration("Colour", &[("Red", 0), ("Yellow", 1)]);
    let config = MapperConfiguration {
        enum_mapping_strategy: EnumMappingStrategy::ByName,
        ..MapperConfiguration::default()
    };
    let mut state = state_with(&db, &config);
    resolve(&mut state, color, colour).expect("resolved");

    assert_eq!(diagnostic_count(&state, ENUM_SOURCE_VALUE_NOT_MAPPED), 1);
    assert_eq!(diagnostic_count(&state, ENUM_TARGET_VALUE_NOT_MAPPED), 1);
}

#[test]
fn test_string_to_enum_uses_parse() {
    let db = TypeInterner::new();
    let (_, colour) = colors(&db);
    let mut state = state(&db);
    let id = resolve(&mut state, TypeId::STRING, colour).expect("resolved");

    assert!(matches!(
        kind(&state, id),
        MappingKind::StringToEnum { use_parse: true, .. }
    ));
    assert_eq!(
        render_expression(&state, id),
        "(Colour)System.Enum.Parse(typeof(Colour), source)"
    );
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn test_enumerable_strategies() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let ints = db.array(TypeId::INT);

    let list = resolve(&mut state, ints, db.generic(GenericKind::List, &[TypeId::INT])).expect("resolved");
    assert!(matches!(
        kind(&state, list),
        MappingKind::LinqSelect {
            collect: Some(CollectMethod::ToList),
            ..
        }
    ));
    assert_eq!(render_expression(&state, list), "source.ToList()");

    let enumerable = db.generic(GenericKind::Enumerable, &[TypeId::INT]);
    let cast = resolve(&mut state, ints, enumerable).expect("resolved");
    assert_eq!(kind(&state, cast), MappingKind::Cast { explicit: false });
    assert_eq!(render_expression(&state, cast), "(IEnumerable<int>)source");

    let immutable = db.generic(GenericKind::ImmutableArray, &[TypeId::INT]);
    let collected = resolve(&mut state, ints, immutable).expect("resolved");
    assert_eq!(render_expression(&state, collected), "source.ToImmutableArray()");

    let from_list = db.generic(GenericKind::List, &[TypeId::INT]);
    let to_array = resolve(&mut state, from_list, ints).expect("resolved");
    assert_eq!(render_expression(&state, to_array), "source.ToArray()");
}

#[test]
fn test_dictionary_to_implemented_interface_is_a_cast() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let source = db.generic(GenericKind::Dictionary, &[TypeId::STRING, TypeId::INT]);
    let target = db.generic(GenericKind::IDictionary, &[TypeId::STRING, TypeId::INT]);
    let id = resolve(&mut state, source, target).expect("resolved");

    assert_eq!(kind(&state, id), MappingKind::Cast { explicit: false });
}

#[test]
fn test_dictionary_with_converted_keys_uses_indexer_loop() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let source = db.generic(GenericKind::Dictionary, &[TypeId::INT, TypeId::STRING]);
    let target = db.generic(GenericKind::Dictionary, &[TypeId::LONG, TypeId::STRING]);
    let id = resolve(&mut state, source, target).expect("resolved");
    drain(&mut state);

    assert!(matches!(
        kind(&state, id),
        MappingKind::DictionaryForEachSet { body: Some(_), .. }
    ));
    let body = render_method(&state, id);
    assert!(body.contains("target.EnsureCapacity(source.Count);"), "{body}");
    assert!(body.contains("target[(long)item.Key] = item.Value;"), "{body}");
}

#[test]
fn test_immutable_dictionary_target_is_collected() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let source = db.generic(GenericKind::Dictionary, &[TypeId::INT, TypeId::STRING]);
    let target = db.generic(GenericKind::ImmutableDictionary, &[TypeId::LONG, TypeId::STRING]);
    let id = resolve(&mut state, source, target).expect("resolved");

    assert!(matches!(
        kind(&state, id),
        MappingKind::ToDictionary {
            collect: CollectMethod::ToImmutableDictionary,
            ..
        }
    ));
    let rendered = render_expression(&state, id);
    assert!(rendered.starts_with("source.ToImmutableDictionary("), "{rendered}");
    assert!(rendered.contains("(long)"), "{rendered}");
}

#[test]
fn test_array_of_objects_uses_for_loop() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Id", TypeId::INT).finish();
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let mut state = state(&db);
    let id = resolve(&mut state, db.array(car), db.array(dto)).expect("resolved");
    drain(&mut state);

    let MappingKind::ArrayForLoop { element } = kind(&state, id) else {
        panic!("expected an array loop, got {:?}", kind(&state, id));
    };
    assert!(matches!(kind(&state, element), MappingKind::NewInstanceObject { body: Some(_) }));
    let body = render_method(&state, id);
    assert!(body.contains("new CarDto[source.Length]"), "{body}");
    assert!(body.contains("MapToCarDto(source[i])"), "{body}");
}

#[test]
fn test_deep_cloned_array_uses_clone() {
    let db = TypeInterner::new();
    let config = MapperConfiguration {
        use_deep_cloning: true,
        ..MapperConfiguration::default()
    };
    let mut state = state_with(&db, &config);
    let ints = db.array(TypeId::INT);
    let id = resolve(&mut state, ints, ints).expect("resolved");

    assert_eq!(kind(&state, id), MappingKind::ArrayClone);
    assert_eq!(render_expression(&state, id), "(int[])source.Clone()");
}

#[test]
fn test_same_array_without_deep_cloning_is_direct() {
    let db = TypeInterner::new();
    let mut state = state(&db);
    let ints = db.array(TypeId::INT);
    let id = resolve(&mut state, ints, ints).expect("resolved");
    assert_eq!(kind(&state, id), MappingKind::Direct);
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_object_mapping_body() {
    let db = TypeInterner::new();
    let car = db
        .class("Car")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .finish();
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let mut state = state(&db);
    let id = resolve(&mut state, car, dto).expect("resolved");
    drain(&mut state);

    assert_eq!(render_expression(&state, id), "MapToCarDto(source)");
    assert_eq!(
        render_method(&state, id),
        "var target = new CarDto();\ntarget.Id = source.Id;\ntarget.Name = source.Name;\nreturn target;"
    );
}

#[test]
fn test_recursive_graph_terminates() {
    let db = TypeInterner::new();
    let node = db.declare("Node", DefKind::Class);
    db.build(node)
        .property("Value", TypeId::INT)
        .property("Next", db.nullable(node))
        .finish();
    let node_dto = db.declare("NodeDto", DefKind::Class);
    db.build(node_dto)
        .property("Value", TypeId::INT)
        .property("Next", db.nullable(node_dto))
        .parameterless_ctor()
        .finish();
    let mut state = state(&db);
    let id = resolve(&mut state, node, node_dto).expect("resolved");
    drain(&mut state);

    let nested = resolve(&mut state, db.nullable(node), db.nullable(node_dto)).expect("resolved");
    assert!(matches!(kind(&state, nested), MappingKind::NullDelegate { inner, .. } if inner == id));
    let body = render_method(&state, id);
    assert!(body.contains("MapToNodeDto(source.Next)"), "{body}");
    assert!(!state.mappings().has_pending_bodies());
}

// =============================================================================
// Constructors and reference loops
// =============================================================================

fn car_type(db: &TypeInterner) -> TypeId {
    db.class("Car")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .finish()
}

fn creation_of(db: &TypeInterner, config: &MapperConfiguration, car: TypeId, dto: TypeId) -> String {
    let mut state = state_with(db, config);
    let id = resolve(&mut state, car, dto).expect("resolved");
    drain(&mut state);
    render_method(&state, id)
}

#[test]
fn test_marked_constructor_wins() {
    let db = TypeInterner::new();
    let car = car_type(&db);
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .ctor(&[("id", TypeId::INT), ("name", TypeId::STRING)])
        .ctor_with_flags(&[("id", TypeId::INT)], ConstructorFlags::MAPPER_CONSTRUCTOR)
        .finish();

    let body = creation_of(&db, &MapperConfiguration::default(), car, dto);
    assert!(body.contains("var target = new CarDto(source.Id);"), "{body}");
    assert!(body.contains("target.Name = source.Name;"), "{body}");
    assert!(!body.contains("target.Id ="), "{body}");
}

#[test]
fn test_obsolete_constructor_is_used_last() {
    let db = TypeInterner::new();
    let car = car_type(&db);
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .ctor_with_flags(&[], ConstructorFlags::OBSOLETE)
        .ctor(&[("id", TypeId::INT), ("name", TypeId::STRING)])
        .finish();

    let body = creation_of(&db, &MapperConfiguration::default(), car, dto);
    assert!(body.contains("var target = new CarDto(source.Id, source.Name);"), "{body}");
}

#[test]
fn test_parameterless_constructor_preference() {
    let db = TypeInterner::new();
    let car = car_type(&db);
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .ctor(&[("id", TypeId::INT)])
        .ctor(&[("id", TypeId::INT), ("name", TypeId::STRING)])
        .parameterless_ctor()
        .finish();

    let preferred = creation_of(&db, &MapperConfiguration::default(), car, dto);
    assert!(preferred.contains("var target = new CarDto();"), "{preferred}");

    let config = MapperConfiguration {
        prefer_parameterless_constructors: false,
        ..MapperConfiguration::default()
    };
    let widest = creation_of(&db, &config, car, dto);
    assert!(widest.contains("var target = new CarDto(source.Id, source.Name);"), "{widest}");
}

#[test]
fn test_constructor_parameter_referencing_own_mapping_is_a_loop() {
    let db = TypeInterner::new();
    let node = db.declare("Node", DefKind::Class);
    db.build(node).property("Parent", node).finish();
    let node_dto = db.declare("NodeDto", DefKind::Class);
    db.build(node_dto).ctor(&[("parent", node_dto)]).finish();

    let mut state = state(&db);
    resolve(&mut state, node, node_dto).expect("resolved");
    drain(&mut state);

    assert_eq!(diagnostic_count(&state, REFERENCE_LOOP_IN_CTOR_MAPPING), 1);
    assert_eq!(diagnostic_count(&state, NO_CONSTRUCTOR_FOUND), 1);
}

#[test]
fn test_init_only_member_referencing_own_mapping_is_a_loop() {
    let db = TypeInterner::new();
    let node = db.declare("Node", DefKind::Class);
    db.build(node)
        .property("Value", TypeId::INT)
        .property("Parent", node)
        .finish();
    let node_dto = db.declare("NodeDto", DefKind::Class);
    db.build(node_dto)
        .property("Value", TypeId::INT)
        .init_only("Parent", node_dto)
        .parameterless_ctor()
        .finish();

    let mut state = state(&db);
    let id = resolve(&mut state, node, node_dto).expect("resolved");
    drain(&mut state);

    assert_eq!(diagnostic_count(&state, REFERENCE_LOOP_IN_INIT_ONLY_MAPPING), 1);
    let body = render_method(&state, id);
    assert!(!body.contains("Parent"), "{body}");
    assert!(body.contains("target.Value = source.Value;"), "{body}");
}
