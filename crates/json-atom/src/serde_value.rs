//! Conversions between [`Atom`] and `serde_json::Value`.

use serde_json::{Map, Number, Value};

use crate::atom::Atom;
use crate::container::{Array, Object};
use crate::error::AtomError;
use crate::scalar::Double;
use crate::text::Utf8Text;

impl Atom {
    /// Build an atom tree from a `serde_json` value. Numbers become integers
    /// when they fit in `i64`, doubles otherwise.
    pub fn from_serde(value: &Value) -> Result<Atom, AtomError> {
        Ok(match value {
            Value::Null => Atom::Null,
            Value::Bool(b) => Atom::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Atom::Integer(i),
                None => Atom::Double(Double::new(n.as_f64().unwrap_or(f64::NAN))?),
            },
            Value::String(s) => Atom::Utf8(Utf8Text::new(s)?),
            Value::Array(items) => {
                let items = items
                    .iter()
                    .map(Atom::from_serde)
                    .collect::<Result<Vec<_>, _>>()?;
                Atom::Array(Array::from_vec(items)?)
            }
            Value::Object(members) => {
                let object = Object::new_allocated()?;
                for (key, item) in members {
                    object.set(key.as_str(), Atom::from_serde(item)?)?;
                }
                Atom::Object(object)
            }
        })
    }

    /// `Undefined` and non-finite doubles map to `null`.
    pub fn to_serde(&self) -> Value {
        match self {
            Atom::Undefined | Atom::Null => Value::Null,
            Atom::Boolean(b) => Value::Bool(*b),
            Atom::Integer(i) => Value::Number(Number::from(*i)),
            Atom::Double(d) => Number::from_f64(d.value()).map_or(Value::Null, Value::Number),
            Atom::Utf8(s) => Value::String(s.as_str().to_string()),
            Atom::Utf16(s) => Value::String(s.to_string_lossy()),
            Atom::Array(a) => Value::Array(a.iter().map(|v| v.to_serde()).collect()),
            Atom::Object(o) => {
                let mut map = Map::new();
                for (key, v) in o.iter() {
                    map.insert(key, v.to_serde());
                }
                Value::Object(map)
            }
        }
    }
}

impl TryFrom<&Value> for Atom {
    type Error = AtomError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Atom::from_serde(value)
    }
}

impl From<&Atom> for Value {
    fn from(atom: &Atom) -> Self {
        atom.to_serde()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(Atom::from_serde(&json!(5)).unwrap().as_i64(), Some(5));
        assert_eq!(Atom::from_serde(&json!(5.5)).unwrap().as_f64(), Some(5.5));
        let big = Atom::from_serde(&json!(u64::MAX)).unwrap();
        assert!(Double::is_double(&big));
    }

    #[test]
    fn tree_conversion_both_ways() {
        let v = json!({"a": [1, 2.5, "s", null, false], "b": {}});
        let atom = Atom::try_from(&v).unwrap();
        assert_eq!(atom.to_serde(), v);
    }

    #[test]
    fn lossy_cases_become_null() {
        assert_eq!(Atom::Undefined.to_serde(), Value::Null);
        let inf = Atom::Double(Double::new(f64::INFINITY).unwrap());
        assert_eq!(Value::from(&inf), Value::Null);
    }
}
