//! Streaming JSON decoder producing an [`Atom`] tree.
//!
//! Input is pushed one character at a time ([`Parser::parse_char`]) or through
//! the `parse_str` / `parse_bytes` / `parse_reader` wrappers. The tokenizer
//! turns characters into [`Token`]s and [`Parser::step`] applies each token to
//! the container stack. The first error is sticky: every later call returns it
//! again until [`Parser::reset`].

use std::io::Read;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::container::{Array, Object};
use crate::error::{AtomError, ParseError, ParseErrorCode, Position};
use crate::json::token::{Token, Tokenizer, TokenizerOptions};
use crate::scalar::Double;
use crate::text::Utf8Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest container nesting accepted.
    pub max_depth: usize,
    /// Accept `/* */` and `//` comments wherever whitespace may appear.
    pub allow_comments: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            allow_comments: false,
        }
    }
}

impl ParserConfig {
    fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            max_depth: self.max_depth,
            allow_comments: self.allow_comments,
        }
    }
}

fn out_of_memory(err: AtomError) -> ParseErrorCode {
    match err {
        AtomError::AllocationFailure { .. } => ParseErrorCode::OutOfMemory,
        _ => ParseErrorCode::Internal,
    }
}

/// Container stack plus the value being assembled.
#[derive(Default)]
struct TreeBuilder {
    root: Option<Atom>,
    stack: Vec<Atom>,
    key: Option<String>,
}

impl TreeBuilder {
    /// A root exists and every container opened has been closed.
    fn is_complete(&self) -> bool {
        self.root.is_some() && self.stack.is_empty() && self.key.is_none()
    }

    fn step(&mut self, token: Token) -> Result<(), ParseErrorCode> {
        trace!("step {token:?} (depth {})", self.stack.len());
        match token {
            Token::ArrayBegin => {
                let array = Array::new_allocated().map_err(out_of_memory)?;
                self.begin(Atom::Array(array))
            }
            Token::ObjectBegin => {
                let object = Object::new_allocated().map_err(out_of_memory)?;
                self.begin(Atom::Object(object))
            }
            Token::ArrayEnd | Token::ObjectEnd => match self.stack.pop() {
                Some(_) => Ok(()),
                None => Err(ParseErrorCode::UnbalancedCollection),
            },
            Token::Key(key) => match self.stack.last() {
                Some(Atom::Object(_)) => {
                    self.key = Some(key);
                    Ok(())
                }
                _ => Err(ParseErrorCode::Internal),
            },
            Token::Integer(i) => self.insert(Atom::Integer(i)),
            Token::Float(f) => {
                let d = Double::new(f).map_err(out_of_memory)?;
                self.insert(Atom::Double(d))
            }
            Token::String(s) => {
                let s = Utf8Text::from_string(s).map_err(out_of_memory)?;
                self.insert(Atom::Utf8(s))
            }
            Token::True => self.insert(Atom::Boolean(true)),
            Token::False => self.insert(Atom::Boolean(false)),
            Token::Null => self.insert(Atom::Null),
        }
    }

    fn begin(&mut self, container: Atom) -> Result<(), ParseErrorCode> {
        // Clones share the store, so the stack entry and the parent's copy are
        // the same container.
        self.insert(container.clone())?;
        self.stack.push(container);
        Ok(())
    }

    fn insert(&mut self, value: Atom) -> Result<(), ParseErrorCode> {
        match (self.stack.last(), self.key.take()) {
            (Some(Atom::Object(object)), Some(key)) => {
                object.set(key.as_str(), value).map_err(out_of_memory)
            }
            (Some(Atom::Array(array)), None) => {
                array.push(value).map(|_| ()).map_err(out_of_memory)
            }
            (None, None) if self.root.is_none() => {
                self.root = Some(value);
                Ok(())
            }
            _ => Err(ParseErrorCode::Internal),
        }
    }
}

pub struct Parser {
    config: ParserConfig,
    tokenizer: Tokenizer,
    builder: TreeBuilder,
    error: Option<ParseError>,
    // Set once any character has been fed; tokens applied through `step`
    // alone never touch the tokenizer.
    fed_chars: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            tokenizer: Tokenizer::new(config.tokenizer_options()),
            builder: TreeBuilder::default(),
            error: None,
            fed_chars: false,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Feed one character.
    pub fn parse_char(&mut self, ch: char) -> Result<(), ParseError> {
        self.check()?;
        self.fed_chars = true;
        let builder = &mut self.builder;
        let result = self
            .tokenizer
            .feed(ch, &mut |token| builder.step(token));
        self.record(result)
    }

    /// Apply one token directly, bypassing the tokenizer. Errors are located
    /// at the current input position.
    pub fn step(&mut self, token: Token) -> Result<(), ParseError> {
        self.check()?;
        let position = self.tokenizer.position();
        let result = self
            .builder
            .step(token)
            .map_err(|code| ParseError::new(code, position));
        self.record(result)
    }

    /// Signal end of input and return the completed value. An empty document
    /// yields `Undefined`.
    pub fn finish(&mut self) -> Result<Atom, ParseError> {
        self.check()?;
        let builder = &mut self.builder;
        let result = self.tokenizer.finish(&mut |token| builder.step(token));
        self.record(result)?;
        if !self.builder.stack.is_empty() {
            let err = ParseError::new(ParseErrorCode::UnbalancedCollection, self.position());
            return Err(self.fail(err));
        }
        Ok(self.root())
    }

    /// True once a complete top-level value has been read. A bare top-level
    /// number only completes on [`Parser::finish`].
    pub fn parse_done(&self) -> bool {
        self.error.is_none()
            && self.builder.is_complete()
            && (!self.fed_chars || self.tokenizer.is_complete())
    }

    /// The value built so far, or `Undefined` if nothing has been parsed.
    pub fn root(&self) -> Atom {
        self.builder.root.clone().unwrap_or_default()
    }

    /// Discard all parser and value state.
    pub fn reset(&mut self) {
        debug!("parser reset at {:?}", self.tokenizer.position());
        self.tokenizer.reset();
        self.builder = TreeBuilder::default();
        self.error = None;
        self.fed_chars = false;
    }

    pub fn position(&self) -> Position {
        self.tokenizer.position()
    }

    pub fn line(&self) -> u32 {
        self.error.as_ref().map_or(self.position().line, |e| e.line)
    }

    pub fn column(&self) -> u32 {
        self.error.as_ref().map_or(self.position().column, |e| e.column)
    }

    pub fn offset(&self) -> usize {
        self.error.as_ref().map_or(self.position().offset, |e| e.offset)
    }

    /// Code of the last error, `ParseErrorCode::None` if there is none.
    pub fn error_code(&self) -> ParseErrorCode {
        self.error.as_ref().map_or(ParseErrorCode::None, |e| e.code)
    }

    pub fn last_error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Reset, then parse a complete document.
    pub fn parse_str(&mut self, input: &str) -> Result<Atom, ParseError> {
        self.reset();
        for ch in input.chars() {
            self.parse_char(ch)?;
        }
        self.finish()
    }

    /// Reset, then parse UTF-8 bytes. Malformed UTF-8 fails with
    /// `InvalidChar` at the offset of the first bad byte.
    pub fn parse_bytes(&mut self, input: &[u8]) -> Result<Atom, ParseError> {
        match std::str::from_utf8(input) {
            Ok(s) => self.parse_str(s),
            Err(e) => {
                let valid = e.valid_up_to();
                self.reset();
                // The valid prefix is fed so its own errors win and the
                // position lands on the bad byte.
                for ch in String::from_utf8_lossy(&input[..valid]).chars() {
                    self.parse_char(ch)?;
                }
                let err = ParseError::new(ParseErrorCode::InvalidChar, self.position())
                    .with_message(format!("invalid UTF-8 byte 0x{:02X}", input[valid]));
                Err(self.fail(err))
            }
        }
    }

    /// Reset, then read and parse everything from `reader`.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<Atom, AtomError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(self.parse_bytes(&buf)?)
    }

    fn check(&self) -> Result<(), ParseError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: Result<(), ParseError>) -> Result<(), ParseError> {
        result.map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        debug!("{err}");
        self.error = Some(err.clone());
        err
    }
}

/// Parse a complete JSON document with the default configuration.
pub fn parse(input: &str) -> Result<Atom, ParseError> {
    Parser::new().parse_str(input)
}

pub fn parse_with(input: &str, config: ParserConfig) -> Result<Atom, ParseError> {
    Parser::with_config(config).parse_str(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{self, PoolKind};

    #[test]
    fn builds_nested_values() {
        let v = parse(r#"{"list": [1, 2.5, "x", null, true], "obj": {"k": false}}"#).unwrap();
        let obj = v.as_object().unwrap();
        let list = obj.lookup("list").unwrap();
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list.at(0).unwrap().as_i64(), Some(1));
        assert_eq!(list.at(1).unwrap().as_f64(), Some(2.5));
        assert_eq!(list.at(2).unwrap().as_str(), Some("x"));
        assert!(list.at(3).unwrap().is_null());
        let inner = obj.lookup("obj").unwrap();
        assert_eq!(
            inner.as_object().unwrap().lookup("k").unwrap().as_bool(),
            Some(false)
        );
    }

    #[test]
    fn top_level_scalars() {
        assert_eq!(parse("42").unwrap().as_i64(), Some(42));
        assert_eq!(parse(" \"s\" ").unwrap().as_str(), Some("s"));
        assert!(parse("null").unwrap().is_null());
    }

    #[test]
    fn empty_document_is_undefined() {
        assert!(parse("").unwrap().is_undefined());
        assert!(parse(" \n\t").unwrap().is_undefined());
    }

    #[test]
    fn errors_are_sticky_until_reset() {
        let mut p = Parser::new();
        for ch in "[1,".chars() {
            p.parse_char(ch).unwrap();
        }
        let err = p.parse_char(']').unwrap_err();
        assert_eq!(err.code, ParseErrorCode::InvalidChar);
        assert_eq!(p.error_code(), ParseErrorCode::InvalidChar);
        assert_eq!(p.offset(), 3);
        assert_eq!(p.parse_char('2').unwrap_err(), err);
        assert_eq!(p.finish().unwrap_err(), err);
        p.reset();
        assert_eq!(p.error_code(), ParseErrorCode::None);
        assert_eq!(p.parse_str("[2]").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn parse_done_tracks_structural_completion() {
        let mut p = Parser::new();
        for ch in "{\"a\":[]".chars() {
            p.parse_char(ch).unwrap();
        }
        assert!(!p.parse_done());
        p.parse_char('}').unwrap();
        assert!(p.parse_done());
        assert_eq!(p.root().as_object().unwrap().len(), 1);
    }

    #[test]
    fn step_applies_tokens_directly() {
        let mut p = Parser::new();
        p.step(Token::ArrayBegin).unwrap();
        p.step(Token::Integer(7)).unwrap();
        assert!(!p.parse_done());
        p.step(Token::ArrayEnd).unwrap();
        assert!(p.parse_done());
        assert_eq!(p.root().as_array().unwrap().at(0).unwrap().as_i64(), Some(7));
        assert_eq!(
            p.step(Token::ArrayEnd).unwrap_err().code,
            ParseErrorCode::UnbalancedCollection
        );

        let mut p = Parser::new();
        p.step(Token::ArrayBegin).unwrap();
        assert_eq!(
            p.step(Token::Key("k".into())).unwrap_err().code,
            ParseErrorCode::Internal
        );

        let mut p = Parser::new();
        p.step(Token::ObjectBegin).unwrap();
        p.step(Token::Key("k".into())).unwrap();
        assert!(!p.parse_done());
        p.step(Token::Null).unwrap();
        p.step(Token::ObjectEnd).unwrap();
        assert!(p.parse_done());

        let mut p = Parser::new();
        p.step(Token::Integer(1)).unwrap();
        assert!(p.parse_done());
        assert_eq!(
            p.step(Token::Integer(2)).unwrap_err().code,
            ParseErrorCode::Internal
        );
    }

    #[test]
    fn invalid_utf8_is_located() {
        let mut p = Parser::new();
        let err = p.parse_bytes(b"[\"ok\", \"\xC0\"]").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::InvalidChar);
        assert_eq!(err.offset, 8);
        assert!(err.to_string().contains("0xC0"));
    }

    #[test]
    fn reader_input() {
        let mut p = Parser::new();
        let v = p.parse_reader(&b"[true]"[..]).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
        assert!(matches!(
            p.parse_reader(&b"[true"[..]),
            Err(AtomError::Parse(ParseError {
                code: ParseErrorCode::UnbalancedCollection,
                ..
            }))
        ));
    }

    #[test]
    fn pool_exhaustion_maps_to_out_of_memory() {
        let base = pool::usage(PoolKind::Array).live;
        pool::set_capacity(PoolKind::Array, Some(base + 1));
        let err = parse("[[1]]").unwrap_err();
        pool::set_capacity(PoolKind::Array, None);
        assert_eq!(err.code, ParseErrorCode::OutOfMemory);
        assert_eq!(err.offset, 1);
        assert_eq!(pool::usage(PoolKind::Array).live, base);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: ParserConfig = serde_json::from_str(r#"{"allow_comments": true}"#).unwrap();
        assert_eq!(cfg.max_depth, 64);
        assert!(cfg.allow_comments);
        let v = parse_with("[1 /* c */]", cfg).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }
}
