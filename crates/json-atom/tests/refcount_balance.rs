//! Pool accounting: every pooled payload is released exactly once, when its
//! last handle goes away.

use json_atom::pool::{self, usage};
use json_atom::{parse, Array, Atom, Double, Object, PoolKind, Utf16Text, Utf8Text};

fn live() -> Vec<usize> {
    PoolKind::ALL.iter().map(|k| usage(*k).live).collect()
}

#[test]
fn copies_of_pooled_atoms_return_to_baseline() {
    let baseline = live();
    let samples = [
        Atom::Double(Double::new(6.25).unwrap()),
        Atom::Utf8(Utf8Text::new("shared").unwrap()),
        Atom::Utf16(Utf16Text::new("wide").unwrap()),
        Atom::Array(Array::with_len(2).unwrap()),
        Atom::Object(Object::new_allocated().unwrap()),
    ];
    for sample in &samples {
        let copies: Vec<Atom> = (0..100).map(|_| sample.clone()).collect();
        assert_eq!(copies.len(), 100);
    }
    assert_ne!(live(), baseline);
    drop(samples);
    assert_eq!(live(), baseline);
}

#[test]
fn share_counts_follow_clones() {
    let d = Double::new(-3.5).unwrap();
    let copies: Vec<Double> = (0..5).map(|_| d.clone()).collect();
    assert_eq!(d.share_count(), 6);
    drop(copies);
    assert_eq!(d.share_count(), 1);
}

#[test]
fn parsed_trees_release_everything() {
    let baseline = live();
    let doc = parse(r#"{"a": [1.5, "x", {"b": [[], {}]}], "c": "y"}"#).unwrap();
    let before_drop = live();
    assert!(before_drop
        .iter()
        .zip(&baseline)
        .all(|(now, base)| now >= base));
    let nested = doc.as_object().unwrap().lookup("a").unwrap();
    drop(doc);
    // `nested` still holds the array, its double and its children.
    assert_ne!(live(), baseline);
    drop(nested);
    assert_eq!(live(), baseline);
}

#[test]
fn replaced_and_removed_elements_are_released() {
    let baseline = usage(PoolKind::Utf8Text).live;
    let arr = Array::new();
    arr.push(Utf8Text::new("one").unwrap()).unwrap();
    arr.push(Utf8Text::new("two").unwrap()).unwrap();
    assert_eq!(usage(PoolKind::Utf8Text).live, baseline + 2);
    arr.set(0, Atom::Null).unwrap();
    assert_eq!(usage(PoolKind::Utf8Text).live, baseline + 1);
    drop(arr.remove(1));
    assert_eq!(usage(PoolKind::Utf8Text).live, baseline);

    let obj = Object::new();
    obj.set("k", Utf8Text::new("v").unwrap()).unwrap();
    obj.set("k", 1).unwrap();
    assert_eq!(usage(PoolKind::Utf8Text).live, baseline);
}

#[test]
fn singletons_never_touch_the_pools() {
    let baseline = live();
    let atoms: Vec<Atom> = (0..10)
        .flat_map(|_| {
            [
                Atom::Double(Double::new(0.0).unwrap()),
                Atom::Utf8(Utf8Text::new("").unwrap()),
                Atom::Utf16(Utf16Text::new("").unwrap()),
                Atom::Array(Array::new()),
                Atom::Object(Object::new()),
            ]
        })
        .collect();
    assert_eq!(live(), baseline);
    drop(atoms);
    assert_eq!(live(), baseline);
}

#[test]
fn peak_tracks_high_water_mark() {
    pool::reset_peak(PoolKind::Double);
    let start = usage(PoolKind::Double);
    let many: Vec<Double> = (1..=10).map(|i| Double::new(f64::from(i)).unwrap()).collect();
    drop(many);
    let end = usage(PoolKind::Double);
    assert_eq!(end.live, start.live);
    assert_eq!(end.peak, start.live + 10);
    assert_eq!(end.allocated, start.allocated + 10);
}
