use std::rc::Rc;

use crate::atom::Atom;
use crate::descriptor::AtomType;
use crate::error::AtomError;
use crate::pool::{self, Payload, PoolKind};
use crate::text::Utf16Text;

thread_local! {
    static EMPTY: Payload<Box<str>> = pool::singleton(Box::from(""));
}

/// Immutable, validated UTF-8 text.
#[derive(Clone)]
pub struct Utf8Text {
    payload: Payload<Box<str>>,
}

impl Utf8Text {
    /// The shared empty string. Never allocates.
    pub fn empty() -> Utf8Text {
        Utf8Text {
            payload: EMPTY.with(Rc::clone),
        }
    }

    pub fn new(s: &str) -> Result<Utf8Text, AtomError> {
        if s.is_empty() {
            return Ok(Utf8Text::empty());
        }
        Ok(Utf8Text {
            payload: pool::alloc(PoolKind::Utf8Text, Box::from(s))?,
        })
    }

    pub fn from_string(s: String) -> Result<Utf8Text, AtomError> {
        if s.is_empty() {
            return Ok(Utf8Text::empty());
        }
        Ok(Utf8Text {
            payload: pool::alloc(PoolKind::Utf8Text, s.into_boxed_str())?,
        })
    }

    /// Validate and copy raw bytes. The error names the offset of the first
    /// byte that does not start a well-formed sequence.
    pub fn from_bytes(bytes: &[u8]) -> Result<Utf8Text, AtomError> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Utf8Text::new(s),
            Err(e) => Err(invalid_utf8(bytes, e)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.payload
    }

    pub fn length_bytes(&self) -> usize {
        self.payload.len()
    }

    pub fn length_chars(&self) -> usize {
        self.payload.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Accepts Utf8Text (shared) and Utf16Text (converted).
    pub fn cast(atom: &Atom) -> Result<Utf8Text, AtomError> {
        match atom {
            Atom::Utf8(s) => Ok(s.clone()),
            Atom::Utf16(s) => s.to_utf8(),
            other => Err(AtomError::mismatch(AtomType::Utf8Text, other.type_id())),
        }
    }

    pub fn is_utf8_text(atom: &Atom) -> bool {
        matches!(atom, Atom::Utf8(_))
    }

    pub fn to_utf16(&self) -> Result<Utf16Text, AtomError> {
        Utf16Text::new(self.as_str())
    }

    pub fn is_empty_singleton(&self) -> bool {
        EMPTY.with(|e| Rc::ptr_eq(e, &self.payload))
    }

    pub fn ptr_eq(&self, other: &Utf8Text) -> bool {
        Rc::ptr_eq(&self.payload, &other.payload)
    }

    pub fn share_count(&self) -> usize {
        pool::share_count(&self.payload)
    }
}

pub(crate) fn invalid_utf8(bytes: &[u8], e: std::str::Utf8Error) -> AtomError {
    let offset = e.valid_up_to();
    AtomError::Validation {
        offset,
        message: format!("invalid UTF-8 byte 0x{:02X}", bytes[offset]),
    }
}

impl PartialEq<str> for Utf8Text {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Utf8Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Debug for Utf8Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Utf8Text({:?})", self.as_str())
    }
}

impl std::fmt::Display for Utf8Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn truthiness(atom: &Atom) -> bool {
    matches!(atom, Atom::Utf8(s) if !s.is_empty())
}
