//! Per-type operation tables.
//!
//! Each concrete value type has exactly one static [`Descriptor`]. An [`Atom`]
//! resolves its descriptor in O(1) from its variant, and two atoms are of the
//! same concrete type iff their descriptors are the same static (pointer
//! identity, see [`Descriptor::same`]).

use std::cmp::Ordering;
use std::fmt;

use crate::atom::Atom;
use crate::container::{array, object};
use crate::error::AtomError;
use crate::pool::PoolKind;
use crate::scalar::{boolean, double, integer};
use crate::text::{utf16, utf8};

/// Type tag. The discriminant is also the cross-type rank used by the total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AtomType {
    Undefined = 0,
    Null = 1,
    Boolean = 2,
    Integer = 3,
    Double = 4,
    Utf8Text = 5,
    Utf16Text = 6,
    Array = 7,
    Object = 8,
}

impl AtomType {
    pub fn name(self) -> &'static str {
        Descriptor::for_type(self).name
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<AtomType> {
        Some(match tag {
            0 => AtomType::Undefined,
            1 => AtomType::Null,
            2 => AtomType::Boolean,
            3 => AtomType::Integer,
            4 => AtomType::Double,
            5 => AtomType::Utf8Text,
            6 => AtomType::Utf16Text,
            7 => AtomType::Array,
            8 => AtomType::Object,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, AtomType::Boolean | AtomType::Integer | AtomType::Double)
    }

    pub fn is_text(self) -> bool {
        matches!(self, AtomType::Utf8Text | AtomType::Utf16Text)
    }

    pub fn is_compound(self) -> bool {
        matches!(self, AtomType::Array | AtomType::Object)
    }

    /// Rank class for cross-type ordering. Numeric types share a class, as do
    /// the two text encodings.
    pub(crate) fn order_class(self) -> u8 {
        match self {
            AtomType::Undefined => 0,
            AtomType::Null => 1,
            AtomType::Boolean | AtomType::Integer | AtomType::Double => 2,
            AtomType::Utf8Text | AtomType::Utf16Text => 3,
            AtomType::Array => 4,
            AtomType::Object => 5,
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation table for one concrete type.
///
/// Cloning and destruction are carried by the payload handles themselves
/// (`Rc` clone/drop); `pool` records which pool, if any, owns the payload.
pub struct Descriptor {
    pub type_id: AtomType,
    pub name: &'static str,
    pub pool: Option<PoolKind>,
    pub(crate) make_default: fn() -> Atom,
    pub(crate) truthiness: fn(&Atom) -> bool,
    pub(crate) compare: fn(&Atom, &Atom) -> Ordering,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_id", &self.type_id)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Descriptor {
    pub fn for_type(type_id: AtomType) -> &'static Descriptor {
        match type_id {
            AtomType::Undefined => &UNDEFINED,
            AtomType::Null => &NULL,
            AtomType::Boolean => &BOOLEAN,
            AtomType::Integer => &INTEGER,
            AtomType::Double => &DOUBLE,
            AtomType::Utf8Text => &UTF8_TEXT,
            AtomType::Utf16Text => &UTF16_TEXT,
            AtomType::Array => &ARRAY,
            AtomType::Object => &OBJECT,
        }
    }

    /// Resolve a raw tag. Fails with `TypeMismatch` when the tag names no
    /// scalar or compound type.
    pub fn lookup(tag: u8) -> Result<&'static Descriptor, AtomError> {
        AtomType::from_tag(tag)
            .map(Descriptor::for_type)
            .ok_or_else(|| AtomError::TypeMismatch {
                expected: "a scalar or compound type",
                got: format!("tag {tag}"),
            })
    }

    /// Construct the type's default value: Undefined, Null, false, 0, the
    /// Double zero, the empty texts, or a lazily-empty container.
    pub fn instantiate(&'static self) -> Atom {
        (self.make_default)()
    }

    pub fn same(a: &'static Descriptor, b: &'static Descriptor) -> bool {
        std::ptr::eq(a, b)
    }
}

fn falsy(_: &Atom) -> bool {
    false
}

fn always_truthy(_: &Atom) -> bool {
    true
}

fn compare_undefined(_lhs: &Atom, rhs: &Atom) -> Ordering {
    match rhs.type_id() {
        AtomType::Undefined => Ordering::Equal,
        _ => Ordering::Less,
    }
}

fn compare_null(_lhs: &Atom, rhs: &Atom) -> Ordering {
    match rhs.type_id() {
        AtomType::Null => Ordering::Equal,
        AtomType::Undefined => Ordering::Greater,
        _ => Ordering::Less,
    }
}

pub static UNDEFINED: Descriptor = Descriptor {
    type_id: AtomType::Undefined,
    name: "undefined",
    pool: None,
    make_default: || Atom::Undefined,
    truthiness: falsy,
    compare: compare_undefined,
};

pub static NULL: Descriptor = Descriptor {
    type_id: AtomType::Null,
    name: "null",
    pool: None,
    make_default: || Atom::Null,
    truthiness: falsy,
    compare: compare_null,
};

pub static BOOLEAN: Descriptor = Descriptor {
    type_id: AtomType::Boolean,
    name: "boolean",
    pool: None,
    make_default: || Atom::Boolean(false),
    truthiness: boolean::truthiness,
    compare: boolean::compare,
};

pub static INTEGER: Descriptor = Descriptor {
    type_id: AtomType::Integer,
    name: "integer",
    pool: None,
    make_default: || Atom::Integer(0),
    truthiness: integer::truthiness,
    compare: integer::compare,
};

pub static DOUBLE: Descriptor = Descriptor {
    type_id: AtomType::Double,
    name: "double",
    pool: Some(PoolKind::Double),
    make_default: || Atom::Double(double::Double::zero()),
    truthiness: double::truthiness,
    compare: double::compare,
};

pub static UTF8_TEXT: Descriptor = Descriptor {
    type_id: AtomType::Utf8Text,
    name: "utf8-text",
    pool: Some(PoolKind::Utf8Text),
    make_default: || Atom::Utf8(utf8::Utf8Text::empty()),
    truthiness: utf8::truthiness,
    compare: crate::text::compare,
};

pub static UTF16_TEXT: Descriptor = Descriptor {
    type_id: AtomType::Utf16Text,
    name: "utf16-text",
    pool: Some(PoolKind::Utf16Text),
    make_default: || Atom::Utf16(utf16::Utf16Text::empty()),
    truthiness: utf16::truthiness,
    compare: crate::text::compare,
};

pub static ARRAY: Descriptor = Descriptor {
    type_id: AtomType::Array,
    name: "array",
    pool: Some(PoolKind::Array),
    make_default: || Atom::Array(array::Array::new()),
    truthiness: always_truthy,
    compare: array::compare,
};

pub static OBJECT: Descriptor = Descriptor {
    type_id: AtomType::Object,
    name: "object",
    pool: Some(PoolKind::Object),
    make_default: || Atom::Object(object::Object::new()),
    truthiness: always_truthy,
    compare: object::compare,
};
