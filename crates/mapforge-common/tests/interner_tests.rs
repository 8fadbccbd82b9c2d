use super::*;

#[test]
fn test_interner_empty_string_is_first_atom() {
    let interner = Interner::new();
    assert_eq!(interner.intern(""), Atom::EMPTY);
    assert_eq!(&*interner.resolve(Atom::EMPTY), "");
}

#[test]
fn test_interner_deduplication() {
    let interner = Interner::new();

    let id1 = interner.intern("CustomerId");
    let id2 = interner.intern("CustomerId");
    let id3 = interner.intern("customerId");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
    assert_eq!(&*interner.resolve(id3), "customerId");
}

#[test]
fn test_interner_get_does_not_intern() {
    let interner = Interner::new();
    let before = interner.len();

    assert_eq!(interner.get("Missing"), None);
    assert_eq!(interner.len(), before);

    let atom = interner.intern("Present");
    assert_eq!(interner.get("Present"), Some(atom));
}

#[test]
fn test_interner_unknown_atom_resolves_empty() {
    let interner = Interner::new();
    assert_eq!(&*interner.resolve(Atom(9_999)), "");
}
