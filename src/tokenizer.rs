//! Bracketed-tree tokenizer
//!
//! Splits a byte stream into `(`, `)` and word tokens with one token of
//! lookahead. Whitespace separates tokens and never appears inside a word.

use std::io::{self, BufRead};
use std::sync::Arc;

/// Kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Word,
}

/// A token borrowed from the tokenizer's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub bytes: &'a [u8],
}

/// I/O errors are shared so that a repeated peek reports the same error
pub type LexResult<T> = Result<T, Arc<io::Error>>;

#[inline(always)]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline(always)]
fn is_delimiter(b: u8) -> bool {
    is_space(b) || b == b'(' || b == b')'
}

/// `BufRead::fill_buf`, retried while interrupted
fn fill_buf<R: BufRead>(input: &mut R) -> io::Result<&[u8]> {
    loop {
        match input.fill_buf() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
            Ok(_) => break,
        }
    }
    input.fill_buf()
}

/// What the last scan produced
#[derive(Debug)]
enum Scanned {
    Token(TokenKind),
    End,
    Failed(Arc<io::Error>),
}

/// Tokenizer over any buffered reader
pub struct Tokenizer<R: BufRead> {
    input: R,
    /// Bytes of the current token
    token: Vec<u8>,
    /// Result of a peek that has not been consumed yet
    peeked: Option<Scanned>,
    /// Error hit while reading a word, reported after the word
    postponed: Option<io::Error>,
    /// Bytes consumed from `input`
    offset: usize,
    /// Offset of the first byte of the current token
    token_offset: usize,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            token: Vec::with_capacity(256),
            peeked: None,
            postponed: None,
            offset: 0,
            token_offset: 0,
        }
    }

    /// Byte offset where the most recently scanned token starts
    pub fn offset(&self) -> usize {
        self.token_offset
    }

    /// Look at the next token without consuming it
    ///
    /// `Ok(None)` means the input is cleanly exhausted.
    pub fn peek(&mut self) -> LexResult<Option<Token<'_>>> {
        if self.peeked.is_none() {
            let scanned = self.scan();
            self.peeked = Some(scanned);
        }
        match &self.peeked {
            Some(Scanned::Token(kind)) => Ok(Some(Token {
                kind: *kind,
                bytes: &self.token,
            })),
            Some(Scanned::Failed(e)) => Err(Arc::clone(e)),
            Some(Scanned::End) | None => Ok(None),
        }
    }

    /// Kind of the next token, without consuming it
    pub fn peek_kind(&mut self) -> LexResult<Option<TokenKind>> {
        Ok(self.peek()?.map(|t| t.kind))
    }

    /// Consume and return the next token
    pub fn next_token(&mut self) -> LexResult<Option<Token<'_>>> {
        let scanned = match self.peeked.take() {
            Some(scanned) => scanned,
            None => self.scan(),
        };
        match scanned {
            Scanned::Token(kind) => Ok(Some(Token {
                kind,
                bytes: &self.token,
            })),
            Scanned::Failed(e) => Err(e),
            Scanned::End => Ok(None),
        }
    }

    fn scan(&mut self) -> Scanned {
        if let Some(e) = self.postponed.take() {
            return Scanned::Failed(Arc::new(e));
        }
        match self.scan_token() {
            Ok(Some(kind)) => Scanned::Token(kind),
            Ok(None) => Scanned::End,
            Err(e) => Scanned::Failed(Arc::new(e)),
        }
    }

    fn consume(&mut self, n: usize) {
        self.input.consume(n);
        self.offset += n;
    }

    fn scan_token(&mut self) -> io::Result<Option<TokenKind>> {
        self.token.clear();

        // Skip whitespace
        let first = loop {
            let buf = fill_buf(&mut self.input)?;
            if buf.is_empty() {
                self.token_offset = self.offset;
                return Ok(None);
            }
            match buf.iter().position(|&b| !is_space(b)) {
                Some(skip) => {
                    let first = buf[skip];
                    self.consume(skip);
                    break first;
                }
                None => {
                    let len = buf.len();
                    self.consume(len);
                }
            }
        };

        self.token_offset = self.offset;
        match first {
            b'(' | b')' => {
                self.token.push(first);
                self.consume(1);
                Ok(Some(if first == b'(' {
                    TokenKind::Open
                } else {
                    TokenKind::Close
                }))
            }
            _ => {
                self.scan_word();
                Ok(Some(TokenKind::Word))
            }
        }
    }

    /// Read up to the next delimiter. The first byte is known to be part
    /// of the word, so any read error is held back until the next scan.
    fn scan_word(&mut self) {
        loop {
            let buf = match fill_buf(&mut self.input) {
                Ok(buf) => buf,
                Err(e) => {
                    self.postponed = Some(e);
                    return;
                }
            };
            if buf.is_empty() {
                return;
            }
            let end = buf
                .iter()
                .position(|&b| is_delimiter(b))
                .unwrap_or(buf.len());
            self.token.extend_from_slice(&buf[..end]);
            let done = end < buf.len();
            self.consume(end);
            if done {
                return;
            }
        }
    }
}

impl<'a> Tokenizer<&'a [u8]> {
    /// Tokenizer over an in-memory string
    pub fn over_str(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}
