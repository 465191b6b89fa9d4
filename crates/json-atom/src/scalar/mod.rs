//! Scalar value types: [`Boolean`], [`Integer`] and [`Double`].
//!
//! The three are mutually comparable by exact numeric value (false = 0,
//! true = 1). NaN sorts above every other number and equal to itself.

pub(crate) mod boolean;
pub(crate) mod double;
pub(crate) mod integer;

pub use boolean::Boolean;
pub use double::{format_double, Double};
pub use integer::Integer;

use std::cmp::Ordering;

use crate::atom::{rank_order, Atom};

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn numeric(atom: &Atom) -> Option<Num> {
    match atom {
        Atom::Boolean(b) => Some(Num::Int(i64::from(*b))),
        Atom::Integer(i) => Some(Num::Int(*i)),
        Atom::Double(d) => Some(Num::Float(d.value())),
        _ => None,
    }
}

/// Exact comparison of an integer against a double.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return Ordering::Less;
    }
    // 2^63 is exactly representable; i64 spans [-2^63, 2^63).
    const TWO_63: f64 = 9_223_372_036_854_775_808.0;
    if f >= TWO_63 {
        return Ordering::Less;
    }
    if f < -TWO_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    // `whole` is in range here, so the cast is exact.
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            let frac = f - whole;
            if frac > 0.0 {
                Ordering::Less
            } else if frac < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

fn cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // -0.0 == 0.0 numerically.
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn cmp_num(a: Num, b: Num) -> Ordering {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(&y),
        (Num::Int(x), Num::Float(y)) => cmp_int_float(x, y),
        (Num::Float(x), Num::Int(y)) => cmp_int_float(y, x).reverse(),
        (Num::Float(x), Num::Float(y)) => cmp_float(x, y),
    }
}

/// Shared compare entry for all three numeric descriptors.
pub(crate) fn compare_numeric(lhs: &Atom, rhs: &Atom) -> Ordering {
    match (numeric(lhs), numeric(rhs)) {
        (Some(a), Some(b)) => cmp_num(a, b),
        _ => rank_order(lhs, rhs),
    }
}
