//! PGN tokenizer
//!
//! Produces a flat token stream with byte offsets. Structure (variations,
//! attachment of comments and glyphs) is left to the parser.

use crate::error::{Error, Result};
use crate::headers::Outcome;
use crate::tree::Nag;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Tag { key: String, value: String },
    MoveNumber(u32),
    San(String),
    Nag(Nag),
    Comment(String),
    OpenVariation,
    CloseVariation,
    Result(Outcome),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Characters that end a SAN word.
fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b'{' | b'}' | b'[' | b']' | b';' | b'$' | b'!' | b'?' | b'"')
}

pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.bytes[self.pos - 1] == b'\n'
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                // Escape lines start with '%' in the first column.
                Some(b'%') if self.at_line_start() => self.skip_line(),
                _ => break,
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let offset = self.pos;
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let kind = match b {
            b'[' => self.tag(offset)?,
            b'{' => self.brace_comment(offset)?,
            b';' => {
                self.pos += 1;
                let text = self.take_while(|b| b != b'\n');
                TokenKind::Comment(text.trim().to_string())
            }
            b'(' => {
                self.pos += 1;
                TokenKind::OpenVariation
            }
            b')' => {
                self.pos += 1;
                TokenKind::CloseVariation
            }
            b'$' => {
                self.pos += 1;
                let digits = self.take_while(|b| b.is_ascii_digit());
                let value = digits.parse::<u8>().map_err(|_| Error::UnexpectedToken {
                    offset,
                    token: format!("${digits}"),
                })?;
                TokenKind::Nag(Nag(value))
            }
            b'!' | b'?' => {
                let symbol = self.take_while(|b| b == b'!' || b == b'?');
                let nag = Nag::from_symbol(symbol).ok_or_else(|| Error::UnexpectedToken {
                    offset,
                    token: symbol.to_string(),
                })?;
                TokenKind::Nag(nag)
            }
            b'*' => {
                self.pos += 1;
                TokenKind::Result(Outcome::Unknown)
            }
            b'}' | b']' | b'"' => {
                return Err(Error::UnexpectedToken {
                    offset,
                    token: (b as char).to_string(),
                });
            }
            _ => self.word(offset)?,
        };
        Ok(Some(Token { kind, offset }))
    }

    /// `[Key "Value"]` with `\"` and `\\` escapes in the value.
    fn tag(&mut self, offset: usize) -> Result<TokenKind> {
        let malformed = |lexer: &Self| Error::UnexpectedToken {
            offset,
            token: lexer.src[offset..lexer.pos.min(lexer.src.len())]
                .lines()
                .next()
                .unwrap_or("[")
                .to_string(),
        };
        self.pos += 1;
        self.take_while(|b| b == b' ' || b == b'\t');
        let key = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        if key.is_empty() {
            return Err(malformed(self));
        }
        self.take_while(|b| b == b' ' || b == b'\t');
        if self.peek() != Some(b'"') {
            return Err(malformed(self));
        }
        self.pos += 1;

        let mut value = String::new();
        let mut chunk_start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(malformed(self)),
                Some(b'"') => {
                    value.push_str(&self.src[chunk_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                Some(b'\\') if matches!(self.bytes.get(self.pos + 1), Some(b'"' | b'\\')) => {
                    value.push_str(&self.src[chunk_start..self.pos]);
                    value.push(self.bytes[self.pos + 1] as char);
                    self.pos += 2;
                    chunk_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }

        self.take_while(|b| b == b' ' || b == b'\t');
        if self.peek() != Some(b']') {
            return Err(malformed(self));
        }
        self.pos += 1;
        Ok(TokenKind::Tag {
            key: key.to_string(),
            value,
        })
    }

    fn brace_comment(&mut self, offset: usize) -> Result<TokenKind> {
        self.pos += 1;
        let text = self.take_while(|b| b != b'}');
        if self.peek().is_none() {
            return Err(Error::UnterminatedComment { offset });
        }
        self.pos += 1;
        Ok(TokenKind::Comment(text.trim().to_string()))
    }

    /// Move numbers, result tokens and SAN.
    fn word(&mut self, offset: usize) -> Result<TokenKind> {
        let rest = &self.src[offset..];
        for token in ["1-0", "0-1", "1/2-1/2"] {
            if rest.starts_with(token)
                && rest[token.len()..]
                    .bytes()
                    .next()
                    .is_none_or(is_delimiter)
            {
                self.pos += token.len();
                return Ok(TokenKind::Result(Outcome::from_token(token).unwrap_or(Outcome::Unknown)));
            }
        }

        if self.peek().is_some_and(|b| b.is_ascii_digit()) && !rest.starts_with("0-0") {
            let digits = self.take_while(|b| b.is_ascii_digit());
            self.take_while(|b| b == b'.');
            let number = digits.parse::<u32>().map_err(|_| Error::UnexpectedToken {
                offset,
                token: digits.to_string(),
            })?;
            return Ok(TokenKind::MoveNumber(number));
        }

        let word = self.take_while(|b| !is_delimiter(b));
        if word.is_empty() {
            // A lone non-ASCII or control character.
            let ch = rest.chars().next().unwrap_or('?');
            self.pos += ch.len_utf8();
            return Err(Error::UnexpectedToken {
                offset,
                token: ch.to_string(),
            });
        }
        Ok(TokenKind::San(word.to_string()))
    }
}
