use std::cmp::Ordering;

use crate::atom::Atom;
use crate::descriptor::AtomType;
use crate::error::AtomError;

/// Inline 64-bit signed integer. Never allocates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(i64);

impl Integer {
    pub fn new(value: i64) -> Self {
        Integer(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Accepts Integer, Boolean (0/1) and Double. Doubles truncate toward zero,
    /// saturating at the i64 range; NaN becomes 0.
    pub fn cast(atom: &Atom) -> Result<Integer, AtomError> {
        match atom {
            Atom::Integer(i) => Ok(Integer(*i)),
            Atom::Boolean(b) => Ok(Integer(i64::from(*b))),
            Atom::Double(d) => Ok(Integer(d.value() as i64)),
            other => Err(AtomError::mismatch(AtomType::Integer, other.type_id())),
        }
    }

    pub fn is_integer(atom: &Atom) -> bool {
        matches!(atom, Atom::Integer(_))
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer(value)
    }
}

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn truthiness(atom: &Atom) -> bool {
    matches!(atom, Atom::Integer(i) if *i != 0)
}

pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    super::compare_numeric(lhs, rhs)
}
