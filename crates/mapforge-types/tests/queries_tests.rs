use super::*;
use crate::queries::*;

#[test]
fn test_strip_annotations_keeps_value_type_nullables() {
    let db = TypeInterner::new();

    let nullable_string = db.nullable(TypeId::STRING);
    let nullable_int = db.nullable(TypeId::INT);

    assert_eq!(strip_annotations(&db, nullable_string), TypeId::STRING);
    assert_eq!(strip_annotations(&db, nullable_int), nullable_int);
}

#[test]
fn test_strip_annotations_is_deep() {
    let db = TypeInterner::new();

    let annotated = db.generic(GenericKind::List, &[db.nullable(TypeId::STRING)]);
    let plain = db.generic(GenericKind::List, &[TypeId::STRING]);

    assert_eq!(strip_annotations(&db, annotated), plain);
    assert!(types_equal(&db, annotated, plain, false));
    assert!(!types_equal(&db, annotated, plain, true));
}

#[test]
fn test_upgrade_nullable_reference() {
    let db = TypeInterner::new();
    let nullable_string = db.nullable(TypeId::STRING);
    let nullable_int = db.nullable(TypeId::INT);

    assert_eq!(upgrade_nullable_reference(&db, nullable_string), TypeId::STRING);
    assert_eq!(upgrade_nullable_reference(&db, nullable_int), nullable_int);
}

#[test]
fn test_members_include_inherited_and_shadowed_once() {
    let db = TypeInterner::new();
    let base = db
        .class("Vehicle")
        .property("Id", TypeId::INT)
        .property("Name", TypeId::STRING)
        .finish();
    let car = db
        .class("Car")
        .base(base)
        .property("Name", db.nullable(TypeId::STRING))
        .property("Doors", TypeId::INT)
        .finish();

    let members = members_of(&db, car);
    let names: Vec<String> = members
        .iter()
        .map(|m| db.resolve_atom(m.name).to_string())
        .collect();
    assert_eq!(names, ["Name", "Doors", "Id"]);
    assert_eq!(members[0].type_id, db.nullable(TypeId::STRING));
}

#[test]
fn test_find_member_case_insensitive() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("ModelName", TypeId::STRING).finish();

    assert!(find_member(&db, car, "modelName", false).is_none());
    assert!(find_member(&db, car, "modelName", true).is_some());
}

#[test]
fn test_inheritance_depth_and_derivation() {
    let db = TypeInterner::new();
    let animal = db.class("Animal").finish();
    let dog = db.class("Dog").base(animal).finish();
    let puppy = db.class("Puppy").base(dog).finish();

    assert_eq!(inheritance_depth(&db, animal), 1);
    assert_eq!(inheritance_depth(&db, puppy), 3);
    assert!(is_derived_from(&db, puppy, animal));
    assert!(!is_derived_from(&db, animal, puppy));
    assert!(is_derived_from(&db, db.nullable(dog), animal));
}

#[test]
fn test_immutability() {
    let db = TypeInterner::new();
    let color = db.enumeration("Color", &[("Red", 0)]);
    let point = db.record("Point").property("X", TypeId::INT).finish();
    let car = db.class("Car").finish();

    assert!(is_immutable(&db, TypeId::STRING));
    assert!(is_immutable(&db, color));
    assert!(is_immutable(&db, point));
    assert!(!is_immutable(&db, car));
    assert!(!is_immutable(&db, db.array(TypeId::INT)));
}

#[test]
fn test_parameterless_ctor_detection() {
    let db = TypeInterner::new();
    let with_ctor = db.class("A").parameterless_ctor().finish();
    let without = db.class("B").ctor(&[("id", TypeId::INT)]).finish();
    let abstract_type = db.interface("IC").finish();

    assert!(has_parameterless_ctor(&db, with_ctor));
    assert!(!has_parameterless_ctor(&db, without));
    assert!(!has_parameterless_ctor(&db, abstract_type));
    assert!(has_parameterless_ctor(&db, TypeId::INT));
    assert!(has_parameterless_ctor(
        &db,
        db.generic(GenericKind::List, &[TypeId::INT])
    ));
}

#[test]
fn test_simple_name() {
    let db = TypeInterner::new();
    let car = db.class("Car").finish();

    assert_eq!(simple_name(&db, car), "Car");
    assert_eq!(simple_name(&db, TypeId::INT), "Int");
    assert_eq!(
        simple_name(&db, db.generic(GenericKind::Enumerable, &[car])),
        "EnumerableOfCar"
    );
    assert_eq!(
        simple_name(&db, db.generic(GenericKind::ImmutableArray, &[car])),
        "ImmutableArrayOfCar"
    );
}
