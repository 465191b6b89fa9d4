//! # JSON Tokenizer
//!
//! Character-at-a-time tokenizer. It validates the structural grammar as it
//! goes (so the builder only ever sees a well-formed token order) and hands
//! each finished token to a callback. Errors are reported at the position of
//! the offending character, before it is consumed.

use log::trace;

use crate::error::{ParseError, ParseErrorCode, Position};

/// Tokens delivered to the tree builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ArrayBegin,
    ArrayEnd,
    ObjectBegin,
    ObjectEnd,
    Integer(i64),
    Float(f64),
    String(String),
    Key(String),
    True,
    False,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

// What the grammar accepts next, outside of any lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrEnd,
    KeyOrEnd,
    Key,
    Colon,
    CommaOrEnd,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrPhase {
    Plain,
    Escape,
    Hex { acc: u16, digits: u8 },
    // After a lead surrogate escape: expecting `\` then `u`.
    LowEscape,
    LowU,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumPhase {
    Sign,
    Zero,
    Int,
    Dot,
    Frac,
    Exp,
    ExpSign,
    ExpDigits,
}

impl NumPhase {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            NumPhase::Zero | NumPhase::Int | NumPhase::Frac | NumPhase::ExpDigits
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentPhase {
    Start,
    Line,
    Block,
    BlockStar,
}

// The lexeme in progress, if any.
#[derive(Debug, Clone, PartialEq)]
enum Lex {
    None,
    Str {
        buf: String,
        is_key: bool,
        phase: StrPhase,
        lead: Option<u16>,
    },
    Number {
        text: String,
        phase: NumPhase,
    },
    Keyword {
        word: &'static str,
        matched: usize,
    },
    Comment(CommentPhase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub max_depth: usize,
    pub allow_comments: bool,
}

type Step = Result<(), ParseErrorCode>;

#[derive(Debug, Clone)]
pub struct Tokenizer {
    options: TokenizerOptions,
    position: Position,
    frames: Vec<Frame>,
    expect: Expect,
    lex: Lex,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            options,
            position: Position::default(),
            frames: Vec::new(),
            expect: Expect::Value,
            lex: Lex::None,
        }
    }

    pub fn reset(&mut self) {
        self.position = Position::default();
        self.frames.clear();
        self.expect = Expect::Value;
        self.lex = Lex::None;
    }

    /// Position of the next character to be fed.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when a complete top-level value has been read and no lexeme is
    /// pending.
    pub fn is_complete(&self) -> bool {
        self.expect == Expect::Done && self.lex == Lex::None
    }

    /// Consume one character, invoking `emit` for every token it completes.
    pub fn feed<F>(&mut self, ch: char, emit: &mut F) -> Result<(), ParseError>
    where
        F: FnMut(Token) -> Step,
    {
        self.dispatch(ch, emit)
            .map_err(|code| ParseError::new(code, self.position))?;
        self.position.advance(ch);
        Ok(())
    }

    /// Signal end of input, flushing a trailing number.
    pub fn finish<F>(&mut self, emit: &mut F) -> Result<(), ParseError>
    where
        F: FnMut(Token) -> Step,
    {
        self.flush_at_end(emit)
            .map_err(|code| ParseError::new(code, self.position))
    }

    fn flush_at_end<F>(&mut self, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        if let Lex::Number { phase, .. } = &self.lex {
            if phase.is_terminal() {
                self.end_number(emit)?;
            }
        }
        if matches!(self.lex, Lex::Comment(CommentPhase::Line)) {
            self.lex = Lex::None;
        }
        if !self.frames.is_empty() {
            return Err(ParseErrorCode::UnbalancedCollection);
        }
        if self.lex != Lex::None {
            return Err(ParseErrorCode::Unknown);
        }
        Ok(())
    }

    fn dispatch<F>(&mut self, ch: char, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        match &mut self.lex {
            Lex::None => self.structural(ch, emit),
            Lex::Str { .. } => self.string_char(ch, emit),
            Lex::Number { .. } => self.number_char(ch, emit),
            Lex::Keyword { word, matched } => {
                if word.as_bytes().get(*matched).copied() != Some(ch as u8) || !ch.is_ascii() {
                    return Err(ParseErrorCode::InvalidKeyword);
                }
                *matched += 1;
                if *matched == word.len() {
                    let token = match *word {
                        "true" => Token::True,
                        "false" => Token::False,
                        _ => Token::Null,
                    };
                    self.lex = Lex::None;
                    self.value_token(token, emit)?;
                }
                Ok(())
            }
            Lex::Comment(phase) => {
                let next = match (*phase, ch) {
                    (CommentPhase::Start, '/') => Some(CommentPhase::Line),
                    (CommentPhase::Start, '*') => Some(CommentPhase::Block),
                    (CommentPhase::Start, _) => return Err(ParseErrorCode::InvalidChar),
                    (CommentPhase::Line, '\n') | (CommentPhase::BlockStar, '/') => None,
                    (CommentPhase::Line, _) => Some(CommentPhase::Line),
                    (CommentPhase::Block | CommentPhase::BlockStar, '*') => {
                        Some(CommentPhase::BlockStar)
                    }
                    (CommentPhase::Block | CommentPhase::BlockStar, _) => {
                        Some(CommentPhase::Block)
                    }
                };
                match next {
                    Some(p) => *phase = p,
                    None => self.lex = Lex::None,
                }
                Ok(())
            }
        }
    }

    fn structural<F>(&mut self, ch: char, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            return Ok(());
        }
        if ch == '/' {
            if !self.options.allow_comments {
                return Err(ParseErrorCode::InvalidChar);
            }
            self.lex = Lex::Comment(CommentPhase::Start);
            return Ok(());
        }
        match self.expect {
            Expect::Value | Expect::ValueOrEnd => match ch {
                '[' => self.open(Frame::Array, emit),
                '{' => self.open(Frame::Object, emit),
                '"' => {
                    self.begin_string(false);
                    Ok(())
                }
                '-' | '0'..='9' => {
                    let phase = match ch {
                        '-' => NumPhase::Sign,
                        '0' => NumPhase::Zero,
                        _ => NumPhase::Int,
                    };
                    self.lex = Lex::Number {
                        text: ch.to_string(),
                        phase,
                    };
                    Ok(())
                }
                't' | 'f' | 'n' => {
                    let word = match ch {
                        't' => "true",
                        'f' => "false",
                        _ => "null",
                    };
                    self.lex = Lex::Keyword { word, matched: 1 };
                    Ok(())
                }
                ']' if self.expect == Expect::ValueOrEnd => self.close(Frame::Array, emit),
                ']' | '}' => {
                    if self.expect == Expect::ValueOrEnd || self.frames.is_empty() {
                        Err(ParseErrorCode::UnbalancedCollection)
                    } else {
                        Err(ParseErrorCode::InvalidChar)
                    }
                }
                _ => Err(ParseErrorCode::InvalidChar),
            },
            Expect::KeyOrEnd | Expect::Key => match ch {
                '"' => {
                    self.begin_string(true);
                    Ok(())
                }
                '}' if self.expect == Expect::KeyOrEnd => self.close(Frame::Object, emit),
                ']' => Err(ParseErrorCode::UnbalancedCollection),
                _ => Err(ParseErrorCode::ExpectedKey),
            },
            Expect::Colon => match ch {
                ':' => {
                    self.expect = Expect::Value;
                    Ok(())
                }
                _ => Err(ParseErrorCode::ExpectedColon),
            },
            Expect::CommaOrEnd => match ch {
                ',' => {
                    self.expect = match self.frames.last() {
                        Some(Frame::Object) => Expect::Key,
                        _ => Expect::Value,
                    };
                    Ok(())
                }
                ']' => self.close(Frame::Array, emit),
                '}' => self.close(Frame::Object, emit),
                _ => Err(ParseErrorCode::InvalidChar),
            },
            Expect::Done => match ch {
                ']' | '}' => Err(ParseErrorCode::UnbalancedCollection),
                _ => Err(ParseErrorCode::InvalidChar),
            },
        }
    }

    fn open<F>(&mut self, frame: Frame, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        if self.frames.len() >= self.options.max_depth {
            return Err(ParseErrorCode::NestingDepthReached);
        }
        let (token, expect) = match frame {
            Frame::Array => (Token::ArrayBegin, Expect::ValueOrEnd),
            Frame::Object => (Token::ObjectBegin, Expect::KeyOrEnd),
        };
        emit(token)?;
        self.frames.push(frame);
        self.expect = expect;
        Ok(())
    }

    fn close<F>(&mut self, frame: Frame, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        if self.frames.last() != Some(&frame) {
            return Err(ParseErrorCode::UnbalancedCollection);
        }
        self.frames.pop();
        emit(match frame {
            Frame::Array => Token::ArrayEnd,
            Frame::Object => Token::ObjectEnd,
        })?;
        self.after_value();
        Ok(())
    }

    fn after_value(&mut self) {
        self.expect = if self.frames.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }

    fn value_token<F>(&mut self, token: Token, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        emit(token)?;
        self.after_value();
        Ok(())
    }

    fn begin_string(&mut self, is_key: bool) {
        self.lex = Lex::Str {
            buf: String::new(),
            is_key,
            phase: StrPhase::Plain,
            lead: None,
        };
    }

    fn string_char<F>(&mut self, ch: char, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        let Lex::Str {
            buf,
            is_key,
            phase,
            lead,
        } = &mut self.lex
        else {
            return Err(ParseErrorCode::Internal);
        };
        match *phase {
            StrPhase::Plain => match ch {
                '"' => {
                    let text = std::mem::take(buf);
                    let is_key = *is_key;
                    self.lex = Lex::None;
                    if is_key {
                        emit(Token::Key(text))?;
                        self.expect = Expect::Colon;
                        return Ok(());
                    }
                    return self.value_token(Token::String(text), emit);
                }
                '\\' => *phase = StrPhase::Escape,
                c if u32::from(c) < 0x20 => return Err(ParseErrorCode::InvalidChar),
                c => buf.push(c),
            },
            StrPhase::Escape => {
                let unescaped = match ch {
                    '"' => '"',
                    '\\' => '\\',
                    '/' => '/',
                    'b' => '\u{0008}',
                    'f' => '\u{000C}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'u' => {
                        *phase = StrPhase::Hex { acc: 0, digits: 0 };
                        return Ok(());
                    }
                    _ => return Err(ParseErrorCode::InvalidEscapeSequence),
                };
                buf.push(unescaped);
                *phase = StrPhase::Plain;
            }
            StrPhase::Hex { acc, digits } => {
                let digit = ch.to_digit(16).ok_or(ParseErrorCode::InvalidUnicodeSequence)?;
                let acc = (acc << 4) | digit as u16;
                if digits < 3 {
                    *phase = StrPhase::Hex {
                        acc,
                        digits: digits + 1,
                    };
                    return Ok(());
                }
                match (lead.take(), acc) {
                    (Some(hi), 0xDC00..=0xDFFF) => {
                        let point = 0x10000 + ((u32::from(hi) - 0xD800) << 10) + (u32::from(acc) - 0xDC00);
                        let c = char::from_u32(point).ok_or(ParseErrorCode::InvalidUnicodeSequence)?;
                        buf.push(c);
                        *phase = StrPhase::Plain;
                    }
                    (Some(_), _) => return Err(ParseErrorCode::InvalidUnicodeSequence),
                    (None, 0xD800..=0xDBFF) => {
                        *lead = Some(acc);
                        *phase = StrPhase::LowEscape;
                    }
                    (None, 0xDC00..=0xDFFF) => return Err(ParseErrorCode::InvalidUnicodeSequence),
                    (None, unit) => {
                        let c = char::from_u32(u32::from(unit))
                            .ok_or(ParseErrorCode::InvalidUnicodeSequence)?;
                        buf.push(c);
                        *phase = StrPhase::Plain;
                    }
                }
            }
            StrPhase::LowEscape => match ch {
                '\\' => *phase = StrPhase::LowU,
                _ => return Err(ParseErrorCode::InvalidUnicodeSequence),
            },
            StrPhase::LowU => match ch {
                'u' => *phase = StrPhase::Hex { acc: 0, digits: 0 },
                _ => return Err(ParseErrorCode::InvalidUnicodeSequence),
            },
        }
        Ok(())
    }

    fn number_char<F>(&mut self, ch: char, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        let Lex::Number { text, phase } = &mut self.lex else {
            return Err(ParseErrorCode::Internal);
        };
        let next = match (*phase, ch) {
            (NumPhase::Sign, '0') => Some(NumPhase::Zero),
            (NumPhase::Sign, '1'..='9') => Some(NumPhase::Int),
            (NumPhase::Zero, '0'..='9') => return Err(ParseErrorCode::InvalidNumber),
            (NumPhase::Int, '0'..='9') => Some(NumPhase::Int),
            (NumPhase::Zero | NumPhase::Int, '.') => Some(NumPhase::Dot),
            (NumPhase::Dot | NumPhase::Frac, '0'..='9') => Some(NumPhase::Frac),
            (NumPhase::Zero | NumPhase::Int | NumPhase::Frac, 'e' | 'E') => Some(NumPhase::Exp),
            (NumPhase::Exp, '+' | '-') => Some(NumPhase::ExpSign),
            (NumPhase::Exp | NumPhase::ExpSign | NumPhase::ExpDigits, '0'..='9') => {
                Some(NumPhase::ExpDigits)
            }
            (p, _) if p.is_terminal() => None,
            _ => return Err(ParseErrorCode::InvalidNumber),
        };
        match next {
            Some(p) => {
                text.push(ch);
                *phase = p;
                Ok(())
            }
            None => {
                // The character ends the number; it still needs its own turn.
                self.end_number(emit)?;
                self.structural(ch, emit)
            }
        }
    }

    fn end_number<F>(&mut self, emit: &mut F) -> Step
    where
        F: FnMut(Token) -> Step,
    {
        let Lex::Number { text, .. } = std::mem::replace(&mut self.lex, Lex::None) else {
            return Err(ParseErrorCode::Internal);
        };
        let token = if text.contains(['.', 'e', 'E']) {
            Token::Float(
                text.parse::<f64>()
                    .map_err(|_| ParseErrorCode::InvalidNumber)?,
            )
        } else {
            match text.parse::<i64>() {
                Ok(i) => Token::Integer(i),
                // Out of i64 range: keep the magnitude as a double.
                Err(_) => Token::Float(
                    text.parse::<f64>()
                        .map_err(|_| ParseErrorCode::InvalidNumber)?,
                ),
            }
        };
        trace!("number {text} -> {token:?}");
        self.value_token(token, emit)
    }
}
