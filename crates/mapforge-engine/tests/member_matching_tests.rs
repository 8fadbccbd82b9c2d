use super::*;
use crate::members::{MemberMatcher, pascal_case_chunks};
use mapforge_types::{TypeDatabase, TypeId, TypeInterner};

#[test]
fn test_pascal_case_chunks() {
    assert_eq!(pascal_case_chunks("CustomerAddressId"), ["Customer", "Address", "Id"]);
    assert_eq!(pascal_case_chunks("Id"), ["Id"]);
    assert!(pascal_case_chunks("").is_empty());
}

#[test]
fn test_candidates_most_segments_first() {
    let candidates: Vec<Vec<String>> = MemberPathCandidateBuilder::build("CustomerAddressId").collect();
    assert_eq!(
        candidates,
        vec![
            vec!["Customer", "Address", "Id"],
            vec!["CustomerAddress", "Id"],
            vec!["Customer", "AddressId"],
        ]
    );
}

#[test]
fn test_single_chunk_has_no_candidates() {
    assert_eq!(MemberPathCandidateBuilder::build("Name").count(), 0);
}

#[test]
fn test_exact_match_beats_flattening() {
    let db = TypeInterner::new();
    let customer = db.class("Customer").property("Id", TypeId::INT).finish();
    let source = db
        .class("Order")
        .property("Customer", customer)
        .property("CustomerId", TypeId::INT)
        .finish();

    let matcher = MemberMatcher::new(&db, source, false);
    let path = matcher.find_source_path("CustomerId").expect("matches");
    assert_eq!(path.names(&db), ["CustomerId"]);
}

#[test]
fn test_flattening_picks_first_resolving_candidate() {
    let db = TypeInterner::new();
    let address = db.class("Address").property("Id", TypeId::INT).finish();
    let customer = db.class("Customer").property("AddressId", TypeId::INT).finish();
    let source = db
        .class("Order")
        .property("CustomerAddress", address)
        .property("Customer", customer)
        .finish();

    let matcher = MemberMatcher::new(&db, source, false);
    let path = matcher.find_source_path("CustomerAddressId").expect("matches");
    assert_eq!(path.names(&db), ["CustomerAddress", "Id"]);
    assert_eq!(path.member_type(), TypeId::INT);
}

#[test]
fn test_case_insensitive_only_when_enabled() {
    let db = TypeInterner::new();
    let source = db.class("Car").property("name", TypeId::STRING).finish();

    assert!(MemberMatcher::new(&db, source, false).find_source_path("Name").is_none());
    let path = MemberMatcher::new(&db, source, true)
        .find_source_path("Name")
        .expect("matches ignoring case");
    assert_eq!(path.names(&db), ["name"]);
}

#[test]
fn test_configured_empty_path_is_the_source() {
    let db = TypeInterner::new();
    let source = db.class("Car").finish();
    let path = MemberMatcher::new(&db, source, false)
        .resolve_configured::<&str>(&[])
        .expect("root");
    assert!(path.is_root());
    assert_eq!(path.member_type(), source);
}

#[test]
fn test_nullable_intermediate_is_walked() {
    let db = TypeInterner::new();
    let address = db.class("Address").property("City", TypeId::STRING).finish();
    let source = db
        .class("Customer")
        .property("Address", db.nullable(address))
        .finish();

    let path = MemberPath::resolve(&db, source, &["Address", "City"], false).expect("resolves");
    assert!(path.has_nullable_prefix(&db, false));
    assert_eq!(path.full_name(&db), "Address.City");
}
