use super::*;
use mapforge_common::diagnostic_codes::{
    ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION, NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE,
    PROJECTION_MAX_RECURSION_DEPTH_REACHED, PROJECTION_USER_MAPPING_CANNOT_INLINE,
};
use mapforge_types::{DefKind, GenericKind, TypeDatabase, TypeId, TypeInterner};

fn build(db: &TypeInterner, declaration: &MapperDeclaration) -> MapperDescriptor {
    MapperDescriptorBuilder::new(db, declaration)
        .expect("valid configuration")
        .build(&CancellationToken::new())
        .expect("not cancelled")
}

fn projection_body(descriptor: &MapperDescriptor, name: &str) -> Expr {
    let method = descriptor.method(name).expect("method exists");
    match method.body.as_slice() {
        [Stmt::Return(Some(expr))] => expr.clone(),
        other => panic!("unexpected projection body: {other:?}"),
    }
}

#[test]
fn test_projection_builds_single_expression() {
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
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::new(
        "Projection",
        car,
        dto,
        MethodKind::PartialProjection,
    ));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new CarDto() { Id = x.Id, Name = x.Name }");
    assert!(body.is_expression_tree_safe());

    let method = descriptor.method("Projection").expect("method exists");
    assert_eq!(
        method.signature.return_type,
        "System.Linq.Expressions.Expression<System.Func<Car, CarDto>>"
    );
    assert!(method.signature.parameters.is_empty());
}

#[test]
fn test_enum_by_name_falls_back_to_by_value_in_projection() {
    let db = TypeInterner::new();
    let color = db.enumeration("Color", &[("Red", 0), ("Green", 1)]);
    let colour = db.enumeration("Colour", &[("Red", 0), ("Green", 1)]);
    let car = db.class("Car").property("Color", color).finish();
    let dto = db
        .class("CarDto")
        .property("Color", colour)
        .parameterless_ctor()
        .finish();
    let config = MapperConfiguration {
        enum_mapping_strategy: EnumMappingStrategy::ByName,
        ..MapperConfiguration::default()
    };
    let declaration = MapperDeclaration::new("CarMapper")
        .with_config(config)
        .method(MethodDeclaration::new("Projection", car, dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION), 1);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new CarDto() { Color = (Colour)x.Color }");
    assert!(body.is_expression_tree_safe());
}

#[test]
fn test_nullable_references_are_upgraded_in_projection() {
    let db = TypeInterner::new();
    let car = db
        .class("Car")
        .property("Name", db.nullable(TypeId::STRING))
        .property("Seats", db.nullable(TypeId::INT))
        .finish();
    let dto = db
        .class("CarDto")
        .property("Name", TypeId::STRING)
        .property("Seats", TypeId::INT)
        .parameterless_ctor()
        .finish();
    let declaration = MapperDeclaration::new("CarMapper").method(MethodDeclaration::new(
        "Projection",
        car,
        dto,
        MethodKind::PartialProjection,
    ));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection").to_string();
    assert!(body.contains("Name = x.Name,"), "{body}");
    assert!(body.contains("Seats = x.Seats != null ? x.Seats.Value : default"), "{body}");
    assert_eq!(
        descriptor.diagnostic_count(NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE),
        1
    );
}

#[test]
fn test_user_method_body_is_inlined() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Name", TypeId::STRING).finish();
    let dto = db
        .class("CarDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let trim = InlineBody {
        parameter: "s".to_string(),
        expr: Expr::ident("s").call("Trim", vec![]),
    };
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::implemented("Normalize", TypeId::STRING, TypeId::STRING).with_body(trim))
        .method(MethodDeclaration::new("Projection", car, dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new CarDto() { Name = x.Name.Trim() }");
}

#[test]
fn test_nested_user_calls_are_inlined_transitively() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Name", TypeId::STRING).finish();
    let dto = db
        .class("CarDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let upper = InlineBody {
        parameter: "v".to_string(),
        expr: Expr::ident("v").call("ToUpper", vec![]),
    };
    let normalize = InlineBody {
        parameter: "s".to_string(),
        expr: Expr::static_call("Upper", vec![Expr::ident("s").call("Trim", vec![])]),
    };
    let declaration = MapperDeclaration::new("CarMapper")
        .method(
            MethodDeclaration::implemented("Upper", TypeId::STRING, TypeId::STRING)
                .with_body(upper)
                .default_mapping(false),
        )
        .method(MethodDeclaration::implemented("Normalize", TypeId::STRING, TypeId::STRING).with_body(normalize))
        .method(MethodDeclaration::new("Projection", car, dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new CarDto() { Name = x.Name.Trim().ToUpper() }");
}

#[test]
fn test_self_calling_user_method_stays_a_call() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Name", TypeId::STRING).finish();
    let dto = db
        .class("CarDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let recursive = InlineBody {
        parameter: "s".to_string(),
        expr: Expr::static_call("Normalize", vec![Expr::ident("s")]),
    };
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::implemented("Normalize", TypeId::STRING, TypeId::STRING).with_body(recursive))
        .method(MethodDeclaration::new("Projection", car, dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new CarDto() { Name = Normalize(x.Name) }");
    assert_eq!(descriptor.diagnostic_count(PROJECTION_USER_MAPPING_CANNOT_INLINE), 0);
}

#[test]
fn test_queryable_reports_user_method_that_cannot_inline() {
    let db = TypeInterner::new();
    let car = db.class("Car").property("Name", TypeId::STRING).finish();
    let dto = db
        .class("CarDto")
        .property("Name", TypeId::STRING)
        .parameterless_ctor()
        .finish();
    let cars = db.generic(GenericKind::Queryable, &[car]);
    let dtos = db.generic(GenericKind::Queryable, &[dto]);
    let declaration = MapperDeclaration::new("CarMapper")
        .method(MethodDeclaration::implemented("Normalize", TypeId::STRING, TypeId::STRING))
        .method(MethodDeclaration::partial("ProjectToDto", cars, dtos));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(PROJECTION_USER_MAPPING_CANNOT_INLINE), 1);
    let method = descriptor.method("ProjectToDto").expect("method exists");
    let rendered: Vec<String> = method.body.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        ["return System.Linq.Queryable.Select(source, x => new CarDto() { Name = Normalize(x.Name) });"]
    );
}

#[test]
fn test_projection_depth_limits_recursive_types() {
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
    let config = MapperConfiguration {
        projection_max_recursion_depth: 1,
        ..MapperConfiguration::default()
    };
    let declaration = MapperDeclaration::new("NodeMapper")
        .with_config(config)
        .method(MethodDeclaration::new("Projection", node, node_dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    assert_eq!(descriptor.diagnostic_count(PROJECTION_MAX_RECURSION_DEPTH_REACHED), 1);
    let body = projection_body(&descriptor, "Projection");
    assert_eq!(body.to_string(), "x => new NodeDto() { Value = x.Value }");
}

#[test]
fn test_projection_depth_two_nests_once() {
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
    let config = MapperConfiguration {
        projection_max_recursion_depth: 2,
        ..MapperConfiguration::default()
    };
    let declaration = MapperDeclaration::new("NodeMapper")
        .with_config(config)
        .method(MethodDeclaration::new("Projection", node, node_dto, MethodKind::PartialProjection));

    let descriptor = build(&db, &declaration);
    let body = projection_body(&descriptor, "Projection");
    assert!(body.is_expression_tree_safe());
    assert_eq!(
        body.to_string(),
        "x => new NodeDto() { Value = x.Value, Next = new NodeDto() { Value = x.Next.Value } }"
    );
}
