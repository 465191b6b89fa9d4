//! JSON text: streaming decoder and canonical encoder.

pub mod encoder;
pub mod parser;
pub mod token;

pub use encoder::{to_json, to_json_pretty, EncoderConfig, JsonEncoder};
pub use parser::{parse, parse_with, Parser, ParserConfig};
pub use token::Token;
