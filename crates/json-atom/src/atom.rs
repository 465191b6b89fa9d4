//! [`Atom`], the uniform handle for every value in the model.
//!
//! Inline variants (undefined, null, boolean, integer) own nothing. The others
//! hold a shared, reference-counted payload from the matching pool; cloning an
//! `Atom` shares the payload, it never copies the buffer.

use std::cmp::Ordering;
use std::fmt;

use crate::container::{Array, Object};
use crate::descriptor::{self, AtomType, Descriptor};
use crate::error::AtomError;
use crate::json::encoder::to_json;
use crate::scalar::{format_double, Boolean, Double, Integer};
use crate::text::{Utf16Text, Utf8Text};

#[derive(Clone, Default)]
pub enum Atom {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Integer(i64),
    Double(Double),
    Utf8(Utf8Text),
    Utf16(Utf16Text),
    Array(Array),
    Object(Object),
}

impl Atom {
    /// Construct the default value of the type designated by a raw tag.
    pub fn from_tag(tag: u8) -> Result<Atom, AtomError> {
        Ok(Descriptor::lookup(tag)?.instantiate())
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        match self {
            Atom::Undefined => &descriptor::UNDEFINED,
            Atom::Null => &descriptor::NULL,
            Atom::Boolean(_) => &descriptor::BOOLEAN,
            Atom::Integer(_) => &descriptor::INTEGER,
            Atom::Double(_) => &descriptor::DOUBLE,
            Atom::Utf8(_) => &descriptor::UTF8_TEXT,
            Atom::Utf16(_) => &descriptor::UTF16_TEXT,
            Atom::Array(_) => &descriptor::ARRAY,
            Atom::Object(_) => &descriptor::OBJECT,
        }
    }

    pub fn type_id(&self) -> AtomType {
        self.descriptor().type_id
    }

    pub fn is_a(&self, descriptor: &'static Descriptor) -> bool {
        Descriptor::same(self.descriptor(), descriptor)
    }

    pub fn same_type(&self, other: &Atom) -> bool {
        Descriptor::same(self.descriptor(), other.descriptor())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Atom::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Atom::Null)
    }

    /// False for Undefined and Null, true for everything else.
    pub fn has_value(&self) -> bool {
        !self.is_undefined() && !self.is_null()
    }

    /// Truthiness as defined by the type's descriptor.
    pub fn bool_value(&self) -> bool {
        (self.descriptor().truthiness)(self)
    }

    /// Three-way comparison under the cross-type total order:
    /// undefined < null < numbers < text < array < object.
    pub fn compare(&self, other: &Atom) -> Ordering {
        (self.descriptor().compare)(self, other)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Atom::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Atom::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Atom::Double(d) => Some(d.value()),
            Atom::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Atom::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Atom::Object(o) => Some(o),
            _ => None,
        }
    }

    /// String coercion. This is the form used to key objects: literal names for
    /// undefined/null/booleans, decimal numbers, text as itself and compact
    /// JSON for containers.
    pub fn to_text(&self) -> String {
        match self {
            Atom::Undefined => "undefined".to_string(),
            Atom::Null => "null".to_string(),
            Atom::Boolean(b) => b.to_string(),
            Atom::Integer(i) => i.to_string(),
            Atom::Double(d) => format_double(d.value()),
            Atom::Utf8(s) => s.as_str().to_string(),
            Atom::Utf16(s) => s.to_string_escaped(),
            Atom::Array(_) | Atom::Object(_) => to_json(self),
        }
    }

    /// Copy containers recursively so the result shares no mutable payload with
    /// `self`. Immutable payloads (doubles, text) stay shared.
    pub fn deep_copy(&self) -> Result<Atom, AtomError> {
        Ok(match self {
            Atom::Array(a) => Atom::Array(a.deep_copy()?),
            Atom::Object(o) => Atom::Object(o.deep_copy()?),
            other => other.clone(),
        })
    }
}

/// Ordering between atoms whose order classes differ.
pub(crate) fn rank_order(lhs: &Atom, rhs: &Atom) -> Ordering {
    lhs.type_id()
        .order_class()
        .cmp(&rhs.type_id().order_class())
}

impl PartialEq for Atom {
    fn eq(&self, other: &Atom) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Atom) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Atom) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Undefined => f.write_str("Undefined"),
            Atom::Null => f.write_str("Null"),
            Atom::Boolean(b) => write!(f, "Boolean({b})"),
            Atom::Integer(i) => write!(f, "Integer({i})"),
            Atom::Double(d) => write!(f, "Double({})", format_double(d.value())),
            Atom::Utf8(s) => write!(f, "Utf8({:?})", s.as_str()),
            Atom::Utf16(s) => write!(f, "Utf16({:?})", s.to_string_lossy()),
            Atom::Array(_) => write!(f, "Array({})", to_json(self)),
            Atom::Object(_) => write!(f, "Object({})", to_json(self)),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Atom {
    fn from(b: bool) -> Self {
        Atom::Boolean(b)
    }
}

impl From<i64> for Atom {
    fn from(i: i64) -> Self {
        Atom::Integer(i)
    }
}

impl From<i32> for Atom {
    fn from(i: i32) -> Self {
        Atom::Integer(i64::from(i))
    }
}

impl From<Boolean> for Atom {
    fn from(b: Boolean) -> Self {
        Atom::Boolean(b.value())
    }
}

impl From<Integer> for Atom {
    fn from(i: Integer) -> Self {
        Atom::Integer(i.value())
    }
}

impl From<Double> for Atom {
    fn from(d: Double) -> Self {
        Atom::Double(d)
    }
}

impl From<Utf8Text> for Atom {
    fn from(s: Utf8Text) -> Self {
        Atom::Utf8(s)
    }
}

impl From<Utf16Text> for Atom {
    fn from(s: Utf16Text) -> Self {
        Atom::Utf16(s)
    }
}

impl From<Array> for Atom {
    fn from(a: Array) -> Self {
        Atom::Array(a)
    }
}

impl From<Object> for Atom {
    fn from(o: Object) -> Self {
        Atom::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_and_null_rank_below_everything() {
        let samples = vec![
            Atom::Boolean(false),
            Atom::Integer(-5),
            Atom::Double(Double::new(-1e300).unwrap()),
            Atom::Utf8(Utf8Text::empty()),
            Atom::Array(Array::new()),
            Atom::Object(Object::new()),
        ];
        assert_eq!(Atom::Undefined.compare(&Atom::Null), Ordering::Less);
        assert_eq!(Atom::Null.compare(&Atom::Undefined), Ordering::Greater);
        for s in &samples {
            assert_eq!(Atom::Undefined.compare(s), Ordering::Less);
            assert_eq!(Atom::Null.compare(s), Ordering::Less);
            assert_eq!(s.compare(&Atom::Null), Ordering::Greater);
        }
    }

    #[test]
    fn type_identity_is_descriptor_identity() {
        let a = Atom::Integer(1);
        let b = Atom::Integer(99);
        let c = Atom::Boolean(true);
        assert!(a.same_type(&b));
        assert!(!a.same_type(&c));
        assert!(a.is_a(&descriptor::INTEGER));
    }

    #[test]
    fn from_tag_builds_defaults_and_rejects_bad_tags() {
        assert!(Atom::from_tag(AtomType::Null.tag()).unwrap().is_null());
        assert!(matches!(
            Atom::from_tag(200),
            Err(AtomError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn has_value_and_truthiness() {
        assert!(!Atom::Undefined.has_value());
        assert!(!Atom::Null.has_value());
        assert!(Atom::Boolean(false).has_value());
        assert!(!Atom::Boolean(false).bool_value());
        assert!(Atom::Integer(-1).bool_value());
        assert!(!Atom::Integer(0).bool_value());
        assert!(!Atom::Utf8(Utf8Text::empty()).bool_value());
        assert!(Atom::Utf8(Utf8Text::new("x").unwrap()).bool_value());
        assert!(Atom::Array(Array::new()).bool_value());
    }

    #[test]
    fn string_coercion() {
        assert_eq!(Atom::Undefined.to_text(), "undefined");
        assert_eq!(Atom::Null.to_text(), "null");
        assert_eq!(Atom::Boolean(true).to_text(), "true");
        assert_eq!(Atom::Integer(-42).to_text(), "-42");
        assert_eq!(Atom::Double(Double::new(2.5).unwrap()).to_text(), "2.5");
        assert_eq!(Atom::Double(Double::new(3.0).unwrap()).to_text(), "3.0");
        let arr = Array::new();
        arr.push(1).unwrap();
        arr.push(Atom::Null).unwrap();
        assert_eq!(Atom::Array(arr).to_text(), "[1,null]");
    }

    #[test]
    fn deep_copy_detaches_containers() {
        let inner = Array::new();
        inner.push(1).unwrap();
        let outer = Array::new();
        outer.push(inner.clone()).unwrap();
        let copy = Atom::Array(outer.clone()).deep_copy().unwrap();
        inner.push(2).unwrap();
        let copied_inner = copy.as_array().unwrap().at(0).unwrap();
        assert_eq!(copied_inner.as_array().unwrap().len(), 1);
        assert_eq!(outer.at(0).unwrap().as_array().unwrap().len(), 2);
    }
}
