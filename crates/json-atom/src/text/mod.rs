//! Immutable, pooled text in two encodings.
//!
//! Both encodings order by Unicode code point, so comparing a [`Utf8Text`]
//! with a [`Utf16Text`] gives the same answer as converting either side to the
//! other's encoding first. Unpaired UTF-16 surrogates (which have no UTF-8 form)
//! order by their raw unit value.

pub(crate) mod utf16;
pub(crate) mod utf8;

pub use utf16::Utf16Text;
pub use utf8::Utf8Text;

use std::cmp::Ordering;

use crate::atom::{rank_order, Atom};

/// Code point sequence of a text atom, or `None` for non-text.
fn code_points(atom: &Atom) -> Option<Box<dyn Iterator<Item = u32> + '_>> {
    match atom {
        Atom::Utf8(s) => Some(Box::new(s.as_str().chars().map(u32::from))),
        Atom::Utf16(s) => Some(Box::new(s.code_points())),
        _ => None,
    }
}

/// Compare entry shared by both text descriptors.
pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    match (lhs, rhs) {
        // UTF-8 byte order is code point order.
        (Atom::Utf8(a), Atom::Utf8(b)) => a.as_str().cmp(b.as_str()),
        _ => match (code_points(lhs), code_points(rhs)) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => rank_order(lhs, rhs),
        },
    }
}
