use std::fmt::Write;
use std::rc::Rc;

use crate::atom::Atom;
use crate::descriptor::AtomType;
use crate::error::AtomError;
use crate::pool::{self, Payload, PoolKind};
use crate::text::Utf8Text;

thread_local! {
    static EMPTY: Payload<Box<[u16]>> = pool::singleton(Vec::new().into_boxed_slice());
}

/// Immutable UTF-16 code unit buffer.
///
/// Unlike [`Utf8Text`] the units are not required to be well-formed: unpaired
/// surrogates are kept as-is and only rejected when converting to UTF-8.
#[derive(Clone)]
pub struct Utf16Text {
    payload: Payload<Box<[u16]>>,
}

impl Utf16Text {
    pub fn empty() -> Utf16Text {
        Utf16Text {
            payload: EMPTY.with(Rc::clone),
        }
    }

    pub fn new(s: &str) -> Result<Utf16Text, AtomError> {
        if s.is_empty() {
            return Ok(Utf16Text::empty());
        }
        let units: Vec<u16> = s.encode_utf16().collect();
        Ok(Utf16Text {
            payload: pool::alloc(PoolKind::Utf16Text, units.into_boxed_slice())?,
        })
    }

    pub fn from_units(units: &[u16]) -> Result<Utf16Text, AtomError> {
        if units.is_empty() {
            return Ok(Utf16Text::empty());
        }
        Ok(Utf16Text {
            payload: pool::alloc(PoolKind::Utf16Text, Box::from(units))?,
        })
    }

    /// Decode UTF-8 bytes into UTF-16 units.
    pub fn from_bytes(bytes: &[u8]) -> Result<Utf16Text, AtomError> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Utf16Text::new(s),
            Err(e) => Err(super::utf8::invalid_utf8(bytes, e)),
        }
    }

    pub fn units(&self) -> &[u16] {
        &self.payload
    }

    pub fn length_units(&self) -> usize {
        self.payload.len()
    }

    /// Code unit at `index`, or 0 past the end.
    pub fn unit_at(&self, index: usize) -> u16 {
        self.payload.get(index).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Convert to UTF-8. Fails on the first unpaired surrogate, reporting its
    /// unit index as the offset.
    pub fn to_utf8(&self) -> Result<Utf8Text, AtomError> {
        let mut out = String::with_capacity(self.length_units());
        let mut index = 0;
        for decoded in char::decode_utf16(self.units().iter().copied()) {
            match decoded {
                Ok(ch) => {
                    out.push(ch);
                    index += ch.len_utf16();
                }
                Err(e) => {
                    return Err(AtomError::Validation {
                        offset: index,
                        message: format!("unpaired surrogate 0x{:04X}", e.unpaired_surrogate()),
                    })
                }
            }
        }
        Utf8Text::from_string(out)
    }

    /// Lossy conversion for display: unpaired surrogates become U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.units())
    }

    /// Like [`Utf16Text::to_string_lossy`], but an unpaired surrogate becomes
    /// its `\uXXXX` escape, so distinct unit sequences give distinct strings.
    /// Used for string coercion and object keys.
    pub fn to_string_escaped(&self) -> String {
        let mut out = String::with_capacity(self.length_units());
        for r in char::decode_utf16(self.units().iter().copied()) {
            match r {
                Ok(ch) => out.push(ch),
                Err(e) => {
                    let _ = write!(out, "\\u{:04x}", e.unpaired_surrogate());
                }
            }
        }
        out
    }

    /// Code points in order. An unpaired surrogate yields its raw unit value.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        char::decode_utf16(self.units().iter().copied()).map(|r| match r {
            Ok(ch) => u32::from(ch),
            Err(e) => u32::from(e.unpaired_surrogate()),
        })
    }

    /// Accepts Utf16Text (shared) and Utf8Text (converted).
    pub fn cast(atom: &Atom) -> Result<Utf16Text, AtomError> {
        match atom {
            Atom::Utf16(s) => Ok(s.clone()),
            Atom::Utf8(s) => s.to_utf16(),
            other => Err(AtomError::mismatch(AtomType::Utf16Text, other.type_id())),
        }
    }

    pub fn is_utf16_text(atom: &Atom) -> bool {
        matches!(atom, Atom::Utf16(_))
    }

    pub fn is_empty_singleton(&self) -> bool {
        EMPTY.with(|e| Rc::ptr_eq(e, &self.payload))
    }

    pub fn ptr_eq(&self, other: &Utf16Text) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }

    pub fn share_count(&self) -> usize {
        pool::share_count(&self.payload)
    }
}

impl std::fmt::Debug for Utf16Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Utf16Text({:?})", self.to_string_lossy())
    }
}

impl std::fmt::Display for Utf16Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

pub(crate) fn truthiness(atom: &Atom) -> bool {
    matches!(atom, Atom::Utf16(s) if !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::usage;

    #[test]
    fn round_trips_through_utf8() {
        for s in ["", "plain", "héllo", "日本語", "emoji 😀 pair", "\u{FFFF}\u{10000}"] {
            let wide = Utf16Text::new(s).unwrap();
            let narrow = wide.to_utf8().unwrap();
            assert_eq!(narrow, s);
            assert_eq!(narrow.to_utf16().unwrap().units(), wide.units());
        }
    }

    #[test]
    fn unit_access_past_the_end_is_zero() {
        let s = Utf16Text::new("ab").unwrap();
        assert_eq!(s.length_units(), 2);
        assert_eq!(s.unit_at(1), u16::from(b'b'));
        assert_eq!(s.unit_at(2), 0);
        assert_eq!(s.unit_at(usize::MAX), 0);
        assert_eq!(Utf16Text::empty().unit_at(0), 0);
    }

    #[test]
    fn unpaired_surrogate_fails_conversion_at_its_index() {
        let s = Utf16Text::from_units(&[0x61, 0xD800, 0x62]).unwrap();
        match s.to_utf8() {
            Err(AtomError::Validation { offset, message }) => {
                assert_eq!(offset, 1);
                assert!(message.contains("D800"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let points: Vec<u32> = s.code_points().collect();
        assert_eq!(points, vec![0x61, 0xD800, 0x62]);
    }

    #[test]
    fn from_bytes_validates_utf8() {
        assert_eq!(Utf16Text::from_bytes("é".as_bytes()).unwrap().units(), &[0xE9]);
        assert!(matches!(
            Utf16Text::from_bytes(&[b'x', 0xC0]),
            Err(AtomError::Validation { offset: 1, .. })
        ));
    }

    #[test]
    fn empty_singleton_is_unaccounted() {
        let before = usage(PoolKind::Utf16Text).live;
        let a = Utf16Text::from_units(&[]).unwrap();
        assert!(a.is_empty_singleton());
        assert!(a.ptr_eq(&Utf16Text::new("").unwrap()));
        assert_eq!(usage(PoolKind::Utf16Text).live, before);
    }
}
