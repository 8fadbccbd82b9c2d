use super::*;
use crate::test_support::init_tracing;
use mapforge_common::diagnostic_codes::{
    AMBIGUOUS_USER_MAPPINGS, DERIVED_SOURCE_TYPE_DUPLICATED, DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE,
    DERIVED_TARGET_TYPE_NOT_ASSIGNABLE, DUPLICATE_DEFAULT_MAPPING, NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE,
    SOURCE_MEMBER_NOT_FOUND, SOURCE_MEMBER_NOT_MAPPED,
};
use mapforge_types::{TypeDatabase, TypeId, TypeInterner};

fn build(db: &TypeInterner, declaration: &MapperDeclaration) -> MapperDescriptor {
    init_tracing();
    MapperDescriptorBuilder::new(db, declaration)
        .expect("valid configuration")
        .build(&CancellationToken::new())
        .expect("not cancelled")
}

fn body_text(descriptor: &MapperDescriptor, name: &str) -> String {
    let method = descriptor.method(name).expect("method exists");
    method
        .body
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn car_types(db: &TypeInterner) -> (TypeId, TypeId) {
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
    (car, dto)
}

#[test]
fn test_render_partial_object_mapping() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));

    let descriptor = build(&db, &declaration);
    assert!(descriptor.diagnostics.is_empty(), "{:?}", descriptor.diagnostics);
    assert_eq!(
        descriptor.render(),
        "public partial class CarMapper\n\
         {\n\
         \x20   public partial CarDto Map(Car source)\n\
         \x20   {\n\
         \x20       var target = new CarDto();\n\
         \x20       target.Id = source.Id;\n\
         \x20       target.Name = source.Name;\n\
         \x20       return target;\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn test_nested_objects_get_helper_methods() {
    let db = TypeInterner::new();
    let person = db.class("Person").property("Name", TypeId::STRING).finish();
    let person_dto = db
        .class("PersonDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let car = db.class("Car").property("Owner", person).finish();
    let dto = db
        .class("CarDto")
        .property("Owner", person_dto)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));

    let descriptor = build(&db, &declaration);
    let names: Vec<&str> = descriptor.methods.iter().map(MethodDescriptor::name).collect();
    assert_eq!(names, ["Map", "MapToPersonDto"]);
    assert!(descriptor.methods[0].user_defined);
    assert!(!descriptor.methods[1].user_defined);
    assert_eq!(descriptor.methods[1].signature.modifiers, "private");
    assert!(body_text(&descriptor, "Map").contains("target.Owner = MapToPersonDto(source.Owner);"));
    assert!(descriptor.render().contains("private PersonDto MapToPersonDto(Person source)"));
}

#[test]
fn test_user_partial_is_reused_for_members() {
    let db = TypeInterner::new();
    let person = db.class("Person").property("Name", TypeId::STRING).finish();
    let person_dto = db
        .class("PersonDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let car = db.class("Car").property("Owner", person).finish();
    let dto = db
        .class("CarDto")
        .property("Owner", person_dto)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::partial("MapCar", car, dto))
        .method(MethodDeclaration::partial("MapPerson", person, person_dto));

    let descriptor = build(&db, &declaration);
    assert!(body_text(&descriptor, "MapCar").contains("target.Owner = MapPerson(source.Owner);"));
    assert_eq!(descriptor.methods.len(), 2);
}

#[test]
fn test_existing_target_method() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::new(
        "Update",
        car,
        dto,
        MethodKind::PartialExistingTarget,
    ));

    let descriptor = build(&db, &declaration);
    let method = descriptor.method("Update").expect("method exists");
    assert_eq!(method.signature.return_type, "void");
    assert_eq!(
        method.signature.parameters,
        [
            ("Car".to_string(), "source".to_string()),
            ("CarDto".to_string(), "target".to_string())
        ]
    );
    assert_eq!(
        body_text(&descriptor, "Update"),
        "target.Id = source.Id;\ntarget.Name = source.Name;"
    );
}

#[test]
fn test_nullable_member_assignment_is_guarded() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Seats", db.nullable(TypeId::INT)).finish();
    let dto = db
        .class("CarDto")
        .property("Seats", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));

    let descriptor = build(&db, &declaration);
    assert_eq!(
        descriptor.diagnostic_count(NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE),
        1
    );
    assert_eq!(
        body_text(&descriptor, "Map"),
        "var target = new CarDto();\n\
         if (source.Seats != null)\n\
         {\n\
         \x20   target.Seats = source.Seats.Value;\n\
         }\n\
         return target;"
    );
}

#[test]
fn test_unmapped_members_are_reported() {
    let db = TypeInterner::new();
    let car = db
        .class("Car")
        .property("Id", TypeId::INT)
        .property("Secret", TypeId::STRING)
        .finish();
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Extra", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(SOURCE_MEMBER_NOT_MAPPED), 1);
    assert_eq!(descriptor.diagnostic_count(SOURCE_MEMBER_NOT_FOUND), 1);
    let not_mapped = descriptor
        .diagnostics
        .iter()
        .find(|d| d.code == SOURCE_MEMBER_NOT_MAPPED)
        .expect("reported");
    assert!(not_mapped.message_text.contains("Secret"));
}

#[test]
fn test_ignored_members_are_not_reported() {
    let db = TypeInterner::new();
    let car = db
        .class("Car")
        .property("Id", TypeId::INT)
        .property("Secret", TypeId::STRING)
        .finish();
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::INT)
        .property("Extra", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let overrides = MethodConfiguration::new().ignore_source("Secret").ignore_target("Extra");
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::partial("Map", car, dto).with_overrides(overrides));

    let descriptor = build(&db, &declaration);
    assert!(descriptor.diagnostics.is_empty(), "{:?}", descriptor.diagnostics);
}

#[test]
fn test_duplicate_explicit_default_reported_once() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::partial("MapA", car, dto).default_mapping(true))
        .method(MethodDeclaration::partial("MapB", car, dto).default_mapping(true));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(DUPLICATE_DEFAULT_MAPPING), 1);
    let diagnostic = descriptor
        .diagnostics
        .iter()
        .find(|d| d.code == DUPLICATE_DEFAULT_MAPPING)
        .expect("reported");
    assert_eq!(diagnostic.location.symbol, "CarMapper.MapB");
    assert!(descriptor.method("MapA").is_some_and(MethodDescriptor::is_generated));
    assert!(descriptor.method("MapB").is_some_and(MethodDescriptor::is_generated));
}

#[test]
fn test_used_duplicate_user_mappings_are_reported() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Id", TypeId::INT).finish();
    let dto = db
        .class("CarDto")
        .property("Id", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::implemented("FormatA", TypeId::INT, TypeId::STRING))
        .method(MethodDeclaration::implemented("FormatB", TypeId::INT, TypeId::STRING))
        .method(MethodDeclaration::partial("Map", car, dto));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(AMBIGUOUS_USER_MAPPINGS), 1);
    assert!(body_text(&descriptor, "Map").contains("target.Id = FormatA(source.Id);"));
}

#[test]
fn test_unused_duplicate_user_mappings_are_silent() {
    let db = TypeInterner::new();
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::implemented("FormatA", TypeId::INT, TypeId::STRING))
        .method(MethodDeclaration::implemented("FormatB", TypeId::INT, TypeId::STRING));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(AMBIGUOUS_USER_MAPPINGS), 0);
    assert!(descriptor.methods.iter().all(|m| !m.is_generated()));
}

#[test]
fn test_runtime_target_type_switch() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::partial("Map", car, dto))
        .method(MethodDeclaration::new(
            "MapAny",
            TypeId::OBJECT,
            TypeId::OBJECT,
            MethodKind::PartialRuntimeTargetType,
        ));

    let descriptor = build(&db, &declaration);
    let method = descriptor.method("MapAny").expect("method exists");
    assert_eq!(
        method.signature.parameters,
        [
            ("object".to_string(), "source".to_string()),
            ("System.Type".to_string(), "targetType".to_string())
        ]
    );
    let body = body_text(&descriptor, "MapAny");
    assert!(
        body.contains("Car x when targetType.IsAssignableFrom(typeof(CarDto)) => (object)Map(x),"),
        "{body}"
    );
    assert!(body.contains("null => default,"), "{body}");
}

#[test]
fn test_runtime_target_arms_prefer_non_nullable_targets() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::partial("MapNullableTarget", car, db.nullable(dto)))
        .method(MethodDeclaration::partial("MapPlain", db.nullable(car), dto))
        .method(MethodDeclaration::new(
            "MapAny",
            TypeId::OBJECT,
            TypeId::OBJECT,
            MethodKind::PartialRuntimeTargetType,
        ));

    let descriptor = build(&db, &declaration);
    let body = body_text(&descriptor, "MapAny");
    let plain = body.find("MapPlain(x").expect("plain arm");
    let nullable_target = body.find("MapNullableTarget(x").expect("nullable target arm");
    assert!(plain < nullable_target, "{body}");
}

struct Vehicles {
    vehicle: TypeId,
    car: TypeId,
    sports_car: TypeId,
    vehicle_dto: TypeId,
    car_dto: TypeId,
    sports_car_dto: TypeId,
}

fn vehicles(db: &TypeInterner) -> Vehicles {
    let vehicle = db.class("Vehicle").property("Id", TypeId::INT).finish();
    let car = db.class("Car").base(vehicle).property("Id", TypeId::INT).finish();
    let sports_car = db.class("SportsCar").base(car).property("Id", TypeId::INT).finish();
    let vehicle_dto = db
        .class("VehicleDto")
        .property("Id", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let car_dto = db
        .class("CarDto")
        .base(vehicle_dto)
        .property("Id", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let sports_car_dto = db
        .class("SportsCarDto")
        .base(car_dto)
        .property("Id", TypeId::INT)
        .parameterless_ctor()
        .finish();
    Vehicles {
        vehicle,
        car,
        sports_car,
        vehicle_dto,
        car_dto,
        sports_car_dto,
    }
}

#[test]
fn test_derived_types_switch_most_derived_first() {
    let db = TypeInterner::new();
    let v = vehicles(&db);
    let overrides = MethodConfiguration::new()
        .derived(v.car, v.car_dto)
        .derived(v.sports_car, v.sports_car_dto);
    let declaration = MapperDeclaration::new("VehicleMapper")
        .method(MethodDeclaration::partial("Map", v.vehicle, v.vehicle_dto).with_overrides(overrides));

    let descriptor = build(&db, &declaration);
    let body = body_text(&descriptor, "Map");
    assert!(body.starts_with("return source switch"), "{body}");
    let sports_car = body.find("MapToSportsCarDto(x").expect("sports car arm");
    let car = body.find("MapToCarDto(x").expect("car arm");
    assert!(sports_car < car, "{body}");
    assert!(body.contains("_ => MapToVehicleDto(source)"), "{body}");
    assert_eq!(descriptor.diagnostic_count(DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE), 0);
}

#[test]
fn test_invalid_derived_type_pairs_are_reported() {
    let db = TypeInterner::new();
    let v = vehicles(&db);
    let unrelated = db.class("Boat").property("Id", TypeId::INT).finish();
    let unrelated_dto = db
        .class("BoatDto")
        .property("Id", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let overrides = MethodConfiguration::new()
        .derived(unrelated, v.car_dto)
        .derived(v.car, unrelated_dto)
        .derived(v.car, v.car_dto)
        .derived(v.car, v.sports_car_dto);
    let declaration = MapperDeclaration::new("VehicleMapper")
        .method(MethodDeclaration::partial("Map", v.vehicle, v.vehicle_dto).with_overrides(overrides));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE), 1);
    assert_eq!(descriptor.diagnostic_count(DERIVED_TARGET_TYPE_NOT_ASSIGNABLE), 1);
    assert_eq!(descriptor.diagnostic_count(DERIVED_SOURCE_TYPE_DUPLICATED), 1);
    let body = body_text(&descriptor, "Map");
    assert!(body.contains("MapToCarDto(x)"), "{body}");
    assert!(!body.contains("SportsCarDto"), "{body}");
}

#[test]
fn test_cancelled_build() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));
    let token = CancellationToken::new();
    token.cancel();

    let result = MapperDescriptorBuilder::new(&db, &declaration)
        .expect("valid configuration")
        .build(&token);
    assert!(matches!(result, Err(EngineError::Cancelled)));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let db = TypeInterner::new();
    let config = MapperConfiguration {
        projection_max_recursion_depth: 0,
        ..MapperConfiguration::default()
    };
    let declaration = MapperDeclaration::new("CarMapper").with_config(config);

    let result = MapperDescriptorBuilder::new(&db, &declaration);
    assert!(matches!(
        result,
        Err(EngineError::Config(ConfigError::InvalidValue {
            field: "projectionMaxRecursionDepth",
            ..
        }))
    ));
}

#[test]
fn test_builds_are_independent() {
    let db = TypeInterner::new();
    let (car, dto) = car_types(&db);
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::partial("Map", car, dto));

    let first = build(&db, &declaration);
    let second = build(&db, &declaration);
    assert_eq!(first.render(), second.render());
    assert_eq!(first.mappings.len(), second.mappings.len());
}
