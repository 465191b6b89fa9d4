//! Core logic for the `json-atom-fmt` binary: parse JSON from a byte buffer
//! and re-encode it canonically.

use thiserror::Error;

use crate::error::{AtomError, ParseError};
use crate::json::{EncoderConfig, JsonEncoder, Parser, ParserConfig};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Atom(#[from] AtomError),
    #[error("usage: {0}")]
    Usage(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub parser: ParserConfig,
    pub encoder: EncoderConfig,
}

fn flag_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, CliError> {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CliError::Usage(format!("{flag} expects a number")))
}

/// Read `--indent N`, `--max-depth N` and `--allow-comments`. `args` excludes
/// the program name.
pub fn parse_args(args: &[String]) -> Result<FormatOptions, CliError> {
    let mut options = FormatOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--indent" => {
                i += 1;
                options.encoder.indent = flag_value(args, i, "--indent")?;
            }
            "--max-depth" => {
                i += 1;
                options.parser.max_depth = flag_value(args, i, "--max-depth")?;
            }
            "--allow-comments" => options.parser.allow_comments = true,
            other => return Err(CliError::Usage(format!("unknown argument {other}"))),
        }
        i += 1;
    }
    Ok(options)
}

/// Parse `input` and return its canonical JSON text.
pub fn format(input: &[u8], options: &FormatOptions) -> Result<String, CliError> {
    let mut parser = Parser::with_config(options.parser);
    let value = parser.parse_bytes(input)?;
    Ok(JsonEncoder::with_config(options.encoder).encode(&value))
}
