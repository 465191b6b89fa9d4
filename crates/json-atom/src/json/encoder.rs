//! Canonical JSON text for an [`Atom`] tree.
//!
//! Output rules:
//! - `undefined` and `null` are written as literal names
//! - integers in plain decimal, doubles as the shortest round-tripping decimal
//!   with a mandatory fractional part (`1.0`); non-finite doubles become `null`
//! - UTF-16 text with unpaired surrogates keeps them as `\uXXXX` escapes
//! - object members in key order

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::scalar::format_double;
use crate::text::Utf16Text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Spaces per nesting level. 0 writes compact output on one line.
    pub indent: u8,
}

pub struct JsonEncoder {
    config: EncoderConfig,
    out: String,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            config,
            out: String::new(),
        }
    }

    pub fn encode(&mut self, value: &Atom) -> String {
        self.out.clear();
        self.write_any(value, 0);
        std::mem::take(&mut self.out)
    }

    fn write_any(&mut self, value: &Atom, depth: usize) {
        match value {
            Atom::Undefined => self.out.push_str("undefined"),
            Atom::Null => self.write_null(),
            Atom::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Atom::Integer(i) => self.out.push_str(&i.to_string()),
            Atom::Double(d) => self.write_float(d.value()),
            Atom::Utf8(s) => self.write_str(s.as_str()),
            Atom::Utf16(s) => self.write_utf16(s),
            Atom::Array(arr) => {
                let items = arr.to_vec();
                if items.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push('[');
                let last = items.len() - 1;
                for (i, item) in items.iter().enumerate() {
                    self.newline(depth + 1);
                    self.write_any(item, depth + 1);
                    if i < last {
                        self.out.push(',');
                    }
                }
                self.newline(depth);
                self.out.push(']');
            }
            Atom::Object(obj) => {
                let entries = obj.entries();
                if entries.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push('{');
                let last = entries.len() - 1;
                for (i, (key, item)) in entries.iter().enumerate() {
                    self.newline(depth + 1);
                    self.write_str(key);
                    self.out.push(':');
                    if self.config.indent > 0 {
                        self.out.push(' ');
                    }
                    self.write_any(item, depth + 1);
                    if i < last {
                        self.out.push(',');
                    }
                }
                self.newline(depth);
                self.out.push('}');
            }
        }
    }

    fn newline(&mut self, depth: usize) {
        if self.config.indent == 0 {
            return;
        }
        self.out.push('\n');
        let width = depth * usize::from(self.config.indent);
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    fn write_null(&mut self) {
        self.out.push_str("null");
    }

    fn write_float(&mut self, value: f64) {
        if value.is_finite() {
            self.out.push_str(&format_double(value));
        } else {
            self.write_null();
        }
    }

    fn write_str(&mut self, s: &str) {
        self.out.push('"');
        for ch in s.chars() {
            self.write_char(ch);
        }
        self.out.push('"');
    }

    fn write_utf16(&mut self, s: &Utf16Text) {
        self.out.push('"');
        for point in s.code_points() {
            match char::from_u32(point) {
                Some(ch) => self.write_char(ch),
                None => self.out.push_str(&format!("\\u{point:04x}")),
            }
        }
        self.out.push('"');
    }

    fn write_char(&mut self, ch: char) {
        match ch {
            '"' => self.out.push_str("\\\""),
            '\\' => self.out.push_str("\\\\"),
            '\n' => self.out.push_str("\\n"),
            '\r' => self.out.push_str("\\r"),
            '\t' => self.out.push_str("\\t"),
            '\u{0008}' => self.out.push_str("\\b"),
            '\u{000C}' => self.out.push_str("\\f"),
            c if u32::from(c) < 0x20 => self.out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => self.out.push(c),
        }
    }
}

/// Compact JSON text.
pub fn to_json(value: &Atom) -> String {
    JsonEncoder::new().encode(value)
}

/// JSON text indented by `indent` spaces per level.
pub fn to_json_pretty(value: &Atom, indent: u8) -> String {
    JsonEncoder::with_config(EncoderConfig { indent }).encode(value)
}
