//! Reference-counted, dynamically-typed JSON values and a streaming decoder.
//!
//! Every value is an [`Atom`]: undefined, null, boolean, integer, double,
//! UTF-8 or UTF-16 text, array or object. Heap payloads are pooled and shared
//! between clones; containers are shared-mutable handles. All atoms fall into
//! one total order:
//!
//! undefined < null < numbers < text < array < object
//!
//! ```
//! use json_atom::{parse, to_json, Atom};
//!
//! let doc = parse(r#"{"b": [1, 2.5], "a": null}"#).unwrap();
//! let list = doc.as_object().unwrap().get("b", &Atom::Undefined);
//! list.as_array().unwrap().push(3).unwrap();
//! assert_eq!(to_json(&doc), r#"{"a":null,"b":[1,2.5,3]}"#);
//! ```

mod atom;
mod serde_value;

pub mod container;
pub mod descriptor;
pub mod error;
pub mod json;
pub mod json_cli;
pub mod pool;
pub mod scalar;
pub mod text;

pub use atom::Atom;
pub use container::{Array, Object, ObjectKey};
pub use descriptor::{AtomType, Descriptor};
pub use error::{AtomError, ParseError, ParseErrorCode, Position};
pub use json::{parse, parse_with, to_json, to_json_pretty, EncoderConfig, Parser, ParserConfig};
pub use pool::{PoolKind, PoolUsage};
pub use scalar::{Boolean, Double, Integer};
pub use text::{Utf16Text, Utf8Text};
