use super::*;

#[test]
fn test_new_name_appends_suffix_on_collision() {
    let mut names = UniqueNameBuilder::new();
    assert_eq!(names.new_name("MapToCar"), "MapToCar");
    assert_eq!(names.new_name("MapToCar"), "MapToCar1");
    assert_eq!(names.new_name("MapToCar"), "MapToCar2");
    assert_eq!(names.new_name("MapToBike"), "MapToBike");
}

#[test]
fn test_reserved_names_are_skipped() {
    let mut names = UniqueNameBuilder::new();
    names.reserve("Map");
    assert!(names.is_used("Map"));
    assert_eq!(names.new_name("Map"), "Map1");
}

#[test]
fn test_scope_does_not_leak() {
    let mut names = UniqueNameBuilder::new();
    names.reserve("source");

    let mut scope = names.new_scope();
    assert_eq!(scope.new_name("source"), "source1");
    assert_eq!(scope.new_name("item"), "item");

    assert!(!names.is_used("item"));
    assert_eq!(names.new_name("item"), "item");
}
