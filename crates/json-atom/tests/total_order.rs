//! The cross-type order must be a total order: reflexive, antisymmetric and
//! transitive over arbitrary mixes of types.

use std::cmp::Ordering;

use json_atom::{Array, Atom, Double, Object, Utf16Text, Utf8Text};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text8(String),
    Text16(String),
    Arr(Vec<Shape>),
    Obj(Vec<(String, Shape)>),
}

fn build(shape: &Shape) -> Atom {
    match shape {
        Shape::Undefined => Atom::Undefined,
        Shape::Null => Atom::Null,
        Shape::Bool(b) => Atom::Boolean(*b),
        Shape::Int(i) => Atom::Integer(*i),
        Shape::Float(f) => Atom::Double(Double::new(*f).unwrap()),
        Shape::Text8(s) => Atom::Utf8(Utf8Text::new(s).unwrap()),
        Shape::Text16(s) => Atom::Utf16(Utf16Text::new(s).unwrap()),
        Shape::Arr(items) => {
            let arr = Array::new();
            for item in items {
                arr.push(build(item)).unwrap();
            }
            Atom::Array(arr)
        }
        Shape::Obj(members) => {
            let obj = Object::new();
            for (k, v) in members {
                obj.set(k.as_str(), build(v)).unwrap();
            }
            Atom::Object(obj)
        }
    }
}

fn text() -> impl Strategy<Value = String> {
    // A small alphabet so equal and prefix-related strings are common.
    "[ab\u{e9}\u{ff21}\u{1f600}]{0,3}"
}

fn leaf() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Undefined),
        Just(Shape::Null),
        any::<bool>().prop_map(Shape::Bool),
        (-2i64..3).prop_map(Shape::Int),
        any::<i64>().prop_map(Shape::Int),
        (-2i64..3).prop_map(|i| Shape::Float(i as f64)),
        Just(Shape::Float(0.5)),
        Just(Shape::Float(f64::NAN)),
        any::<f64>().prop_map(Shape::Float),
        text().prop_map(Shape::Text8),
        text().prop_map(Shape::Text16),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    leaf().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Shape::Arr),
            prop::collection::vec(("[ab]{1}", inner), 0..3).prop_map(Shape::Obj),
        ]
    })
}

proptest! {
    #[test]
    fn compare_is_reflexive(a in shape()) {
        let a = build(&a);
        prop_assert_eq!(a.compare(&a), Ordering::Equal);
        prop_assert_eq!(a.compare(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric(a in shape(), b in shape()) {
        let (a, b) = (build(&a), build(&b));
        prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn compare_is_transitive(a in shape(), b in shape(), c in shape()) {
        let mut atoms = [build(&a), build(&b), build(&c)];
        atoms.sort();
        prop_assert_ne!(atoms[0].compare(&atoms[1]), Ordering::Greater);
        prop_assert_ne!(atoms[1].compare(&atoms[2]), Ordering::Greater);
        prop_assert_ne!(atoms[0].compare(&atoms[2]), Ordering::Greater);
    }
}

#[test]
fn type_rank_order() {
    let ranked = [
        Atom::Undefined,
        Atom::Null,
        Atom::Integer(i64::MAX),
        Atom::Utf8(Utf8Text::empty()),
        Atom::Array(Array::new()),
        Atom::Object(Object::new()),
    ];
    for (i, lo) in ranked.iter().enumerate() {
        for hi in &ranked[i + 1..] {
            assert_eq!(lo.compare(hi), Ordering::Less, "{lo:?} < {hi:?}");
            assert_eq!(hi.compare(lo), Ordering::Greater, "{hi:?} > {lo:?}");
        }
    }
}

#[test]
fn numbers_of_different_types_compare_by_value() {
    let one_f = Atom::Double(Double::new(1.0).unwrap());
    assert_eq!(Atom::Integer(1).compare(&one_f), Ordering::Equal);
    assert_eq!(Atom::Boolean(true).compare(&one_f), Ordering::Equal);
    assert_eq!(Atom::Boolean(false).compare(&Atom::Integer(-1)), Ordering::Greater);
    let half = Atom::Double(Double::new(0.5).unwrap());
    assert_eq!(Atom::Boolean(false).compare(&half), Ordering::Less);
    assert_eq!(Atom::Integer(1).compare(&half), Ordering::Greater);
}
