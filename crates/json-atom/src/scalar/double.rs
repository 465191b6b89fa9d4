use std::cmp::Ordering;
use std::rc::Rc;

use crate::atom::Atom;
use crate::descriptor::AtomType;
use crate::error::AtomError;
use crate::pool::{self, Payload, PoolKind};

thread_local! {
    static ZERO: Payload<f64> = pool::singleton(0.0);
}

/// Pooled IEEE-754 double.
///
/// `+0.0` never allocates: every zero shares one singleton payload. `-0.0`
/// gets its own block so the sign survives.
#[derive(Clone)]
pub struct Double {
    payload: Payload<f64>,
}

impl Double {
    pub fn new(value: f64) -> Result<Double, AtomError> {
        if value.to_bits() == 0 {
            return Ok(Double::zero());
        }
        Ok(Double {
            payload: pool::alloc(PoolKind::Double, value)?,
        })
    }

    pub fn zero() -> Double {
        Double {
            payload: ZERO.with(Rc::clone),
        }
    }

    pub fn value(&self) -> f64 {
        **self.payload
    }

    /// Accepts Double, Integer and Boolean (0.0/1.0).
    pub fn cast(atom: &Atom) -> Result<Double, AtomError> {
        match atom {
            Atom::Double(d) => Ok(d.clone()),
            Atom::Integer(i) => Double::new(*i as f64),
            Atom::Boolean(b) => Double::new(if *b { 1.0 } else { 0.0 }),
            other => Err(AtomError::mismatch(AtomType::Double, other.type_id())),
        }
    }

    pub fn is_double(atom: &Atom) -> bool {
        matches!(atom, Atom::Double(_))
    }

    pub fn is_nan(&self) -> bool {
        self.value().is_nan()
    }

    pub fn is_infinite(&self) -> bool {
        self.value().is_infinite()
    }

    pub fn is_finite(&self) -> bool {
        self.value().is_finite()
    }

    /// IEEE remainder: `self - n * other` where `n` is the quotient rounded to
    /// the nearest integer, ties to even.
    pub fn remainder(&self, other: &Double) -> f64 {
        ieee_remainder(self.value(), other.value())
    }

    pub fn is_zero_singleton(&self) -> bool {
        ZERO.with(|z| Rc::ptr_eq(z, &self.payload))
    }

    pub fn ptr_eq(&self, other: &Double) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }

    pub fn share_count(&self) -> usize {
        pool::share_count(&self.payload)
    }
}

impl std::fmt::Debug for Double {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Double({})", format_double(self.value()))
    }
}

impl std::fmt::Display for Double {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_double(self.value()))
    }
}

fn ieee_remainder(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() || x.is_infinite() || y == 0.0 {
        return f64::NAN;
    }
    if y.is_infinite() {
        return x;
    }
    let ay = y.abs();
    let mut r = x % y;
    let twice = r.abs() * 2.0;
    if twice > ay {
        r -= ay.copysign(r);
    } else if twice == ay {
        let quotient = (x - r) / y;
        if quotient % 2.0 != 0.0 {
            r -= ay.copysign(r);
        }
    }
    r
}

/// Shortest round-tripping decimal with a mandatory fractional digit:
/// `1.0`, `2.5`, `-0.0`. Magnitudes from `1e16` up, or below `1e-5`, use
/// exponent form (`1.0e300`, `1.5e-7`). Non-finite values render as `NaN`,
/// `inf`, `-inf`.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-5) {
        // `{:e}` gives the shortest mantissa, e.g. `1e300` or `1.5e-7`.
        let s = format!("{value:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0e{exp}"),
            _ => s,
        };
    }
    let mut s = value.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

pub(crate) fn truthiness(atom: &Atom) -> bool {
    matches!(atom, Atom::Double(d) if d.value() != 0.0)
}

pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    super::compare_numeric(lhs, rhs)
}
