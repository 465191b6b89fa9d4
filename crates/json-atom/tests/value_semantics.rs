//! Behaviour of the value model that callers rely on: aliasing, array
//! shifting and growth, zero/empty singletons, text validation, casts.

use json_atom::{
    Array, Atom, AtomError, AtomType, Boolean, Descriptor, Double, Integer, Object, Utf16Text,
    Utf8Text,
};

#[test]
fn remove_shifts_later_indices() {
    let arr = Array::from_vec(vec![Atom::Integer(10), Atom::Integer(20), Atom::Integer(30)]).unwrap();
    let removed = arr.remove(1).unwrap();
    assert_eq!(removed, Atom::Integer(20));
    assert_eq!(arr.len(), 2);
    assert_eq!(arr.at(0), Some(Atom::Integer(10)));
    assert_eq!(arr.at(1), Some(Atom::Integer(30)));
}

#[test]
fn writing_past_the_end_grows_with_undefined() {
    let arr = Array::new();
    let x = Utf8Text::new("x").unwrap();
    arr.set(5, x.clone()).unwrap();
    assert_eq!(arr.len(), 6);
    for i in 0..5 {
        assert!(arr.get(i, &Atom::Null).is_undefined());
    }
    assert_eq!(arr.get(5, &Atom::Null), Atom::Utf8(x));
    assert!(arr.get(6, &Atom::Null).is_null());
}

#[test]
fn containers_are_shared_mutable_handles() {
    let obj = Object::new();
    let alias = Atom::Object(obj.clone());
    obj.set("k", true).unwrap();
    assert_eq!(
        alias.as_object().unwrap().get("k", &Atom::Undefined),
        Atom::Boolean(true)
    );

    let independent = alias.deep_copy().unwrap();
    obj.set("k", false).unwrap();
    assert_eq!(
        independent.as_object().unwrap().get("k", &Atom::Undefined),
        Atom::Boolean(true)
    );
}

#[test]
fn two_lazy_handles_diverge_only_until_copied() {
    let a = Array::new();
    let b = Array::new();
    a.push(1).unwrap();
    assert_eq!(b.len(), 0);
    let c = b.clone();
    b.push(2).unwrap();
    assert_eq!(c.len(), 1);
    assert!(!a.ptr_eq(&b));
}

#[test]
fn double_zero_is_one_shared_payload() {
    let a = Double::new(0.0).unwrap();
    let b = Double::new(0.0).unwrap();
    assert!(a.ptr_eq(&b));
    assert!(Double::cast(&Atom::Integer(0)).unwrap().ptr_eq(&a));
    assert!(!Double::new(1.0).unwrap().ptr_eq(&Double::new(1.0).unwrap()));
}

#[test]
fn utf8_validation() {
    match Utf8Text::from_bytes(&[0xC0]) {
        Err(AtomError::Validation { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected a validation error, got {other:?}"),
    }
    let s = Utf8Text::from_bytes("héllo".as_bytes()).unwrap();
    assert_eq!(s.length_chars(), 5);
    assert_eq!(s.length_bytes(), 6);
}

#[test]
fn text_conversion_round_trips() {
    let original = "mixed: ascii, é, 日本, 😀";
    let wide = Utf16Text::new(original).unwrap();
    let narrow = wide.to_utf8().unwrap();
    assert_eq!(narrow.as_str(), original);
    assert_eq!(Atom::Utf8(narrow), Atom::Utf16(wide));
}

#[test]
fn object_keys_collide_by_string_form() {
    let obj = Object::new();
    obj.set(&Atom::Integer(7), Utf8Text::new("int").unwrap()).unwrap();
    obj.set("7", Atom::Null).unwrap();
    assert_eq!(obj.len(), 1);
    assert!(obj.lookup(&Integer::new(7)).unwrap().is_null());
}

#[test]
fn casts_and_type_checks() {
    assert_eq!(Integer::cast(&Atom::Double(Double::new(-2.9).unwrap())).unwrap().value(), -2);
    assert_eq!(Integer::cast(&Atom::Boolean(true)).unwrap().value(), 1);
    assert!(!Boolean::cast(&Atom::Utf8(Utf8Text::empty())).value());
    let err = Array::cast(&Atom::Null).unwrap_err();
    assert_eq!(err.to_string(), "type mismatch: expected array but got null");
    assert!(Atom::Integer(3).is_a(&json_atom::descriptor::INTEGER));
    assert_eq!(Descriptor::for_type(AtomType::Object).name, "object");
}
