//! Bracketed tree parser
//!
//! Reads Penn Treebank trees such as `((S (NP this) (VP (V is))))` from any
//! buffered reader. The grammar is stricter than a general s-expression:
//!
//! ```text
//! Tree      -> '(' InnerTree ')'
//! InnerTree -> ')' | Node ')'
//! Node      -> Category (Word | Children)
//! Children  -> '(' Node ')' { '(' Node ')' }
//! ```
//!
//! `(())` is the no-parse tree: a valid tree with no root. Decisions use
//! one token of lookahead and never backtrack. Nesting depth is bounded
//! only by memory.

use crate::tokenizer::{TokenKind, Tokenizer};
use crate::topology::{NodeId, Topology};
use crate::tree::ParseTree;
use bstr::ByteSlice;
use std::io::{self, BufRead};
use std::iter::FusedIterator;
use std::sync::Arc;
use thiserror::Error;

/// Error type for malformed input, with the byte offset of the offending
/// token
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Parse error: expected `(` at byte {offset}")]
    MissingOpenParen { offset: usize },

    #[error("Parse error: expected `)` at byte {offset}")]
    MissingCloseParen { offset: usize },

    #[error("Parse error: expected a category at byte {offset}")]
    MissingCategory { offset: usize },

    #[error("Parse error: expected a word or `(` at byte {offset}")]
    MissingWordOrOpenParen { offset: usize },

    #[error("Parse error: residual input at byte {offset}")]
    ResidualInput { offset: usize },

    #[error("Parse error: no tree before end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("I/O error: {0}")]
    Io(#[from] Arc<io::Error>),
}

impl ParseError {
    /// Byte offset of the error, if it is not an I/O error
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::MissingOpenParen { offset }
            | ParseError::MissingCloseParen { offset }
            | ParseError::MissingCategory { offset }
            | ParseError::MissingWordOrOpenParen { offset }
            | ParseError::ResidualInput { offset }
            | ParseError::UnexpectedEof { offset } => Some(*offset),
            ParseError::Io(_) => None,
        }
    }
}

/// Streaming parser over a byte source
///
/// [`Parser::next_tree`] can be called until it returns `Ok(None)`. As an
/// iterator the parser yields `Result<ParseTree, ParseError>` and stops
/// after the first error, since the input position is undefined after a
/// structural error.
pub struct Parser<R: BufRead> {
    tokenizer: Tokenizer<R>,
    done: bool,
}

impl<R: BufRead> Parser<R> {
    pub fn new(input: R) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            done: false,
        }
    }

    /// Byte offset of the most recently read token
    pub fn offset(&self) -> usize {
        self.tokenizer.offset()
    }

    /// Parse the next tree
    ///
    /// `Ok(None)` means the input ended cleanly before another tree
    /// started. End of input inside a tree is a structural error.
    pub fn next_tree(&mut self) -> Result<Option<ParseTree>, ParseError> {
        match self.tokenizer.next_token()?.map(|t| t.kind) {
            None => return Ok(None),
            Some(TokenKind::Open) => {}
            Some(_) => return Err(self.missing_open_paren()),
        }
        self.expect(TokenKind::Open)?;

        let mut topology = Topology::new_empty();
        let mut labels = Vec::with_capacity(16);
        if self.tokenizer.peek_kind()? == Some(TokenKind::Close) {
            self.tokenizer.next_token()?;
        } else {
            let root = self.parse_node(&mut topology, &mut labels)?;
            self.expect(TokenKind::Close)?;
            topology.set_root(Some(root));
        }
        self.expect(TokenKind::Close)?;

        Ok(Some(ParseTree::new(topology, labels)))
    }

    /// Whether any token is left
    pub fn has_residual_input(&mut self) -> Result<bool, ParseError> {
        Ok(self.tokenizer.peek_kind()?.is_some())
    }

    /// Parse a node and all of its descendants, appending them in
    /// pre-order, and return the node's id
    fn parse_node(
        &mut self,
        topology: &mut Topology,
        labels: &mut Vec<String>,
    ) -> Result<NodeId, ParseError> {
        let (node, has_children) = self.open_node(topology, labels, None)?;
        // Non-terminals whose children are being read
        let mut stack = Vec::new();
        if has_children {
            stack.push(node);
        }
        while let Some(&parent) = stack.last() {
            if self.tokenizer.peek_kind()? == Some(TokenKind::Open) {
                self.tokenizer.next_token()?;
                let (child, has_children) = self.open_node(topology, labels, Some(parent))?;
                if has_children {
                    stack.push(child);
                } else {
                    self.expect(TokenKind::Close)?;
                }
            } else {
                stack.pop();
                // The outermost node's `)` belongs to the caller
                if !stack.is_empty() {
                    self.expect(TokenKind::Close)?;
                }
            }
        }
        Ok(node)
    }

    /// Read a category and create its node. A pre-terminal's word is read
    /// as well; otherwise the returned flag says children follow.
    fn open_node(
        &mut self,
        topology: &mut Topology,
        labels: &mut Vec<String>,
        parent: Option<NodeId>,
    ) -> Result<(NodeId, bool), ParseError> {
        let Some(category) = self.next_word()? else {
            return Err(ParseError::MissingCategory {
                offset: self.tokenizer.offset(),
            });
        };
        let node = topology.add_node();
        labels.push(category);
        if let Some(parent) = parent {
            topology.append_child(parent, node);
        }

        match self.tokenizer.peek_kind()? {
            Some(TokenKind::Word) => {
                let word = self.next_word()?.unwrap_or_default();
                let leaf = topology.add_node();
                labels.push(word);
                topology.append_child(node, leaf);
                Ok((node, false))
            }
            Some(TokenKind::Open) => Ok((node, true)),
            Some(TokenKind::Close) | None => Err(ParseError::MissingWordOrOpenParen {
                offset: self.tokenizer.offset(),
            }),
        }
    }

    /// Consume the next token and return it if it is a word
    fn next_word(&mut self) -> Result<Option<String>, ParseError> {
        Ok(self
            .tokenizer
            .next_token()?
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.bytes.to_str_lossy().into_owned()))
    }

    /// Consume the next token, which must be `kind`
    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.tokenizer.next_token()?.map(|t| t.kind) == Some(kind) {
            return Ok(());
        }
        Err(match kind {
            TokenKind::Open => self.missing_open_paren(),
            _ => ParseError::MissingCloseParen {
                offset: self.tokenizer.offset(),
            },
        })
    }

    fn missing_open_paren(&self) -> ParseError {
        ParseError::MissingOpenParen {
            offset: self.tokenizer.offset(),
        }
    }
}

impl<'a> Parser<&'a [u8]> {
    /// Parser over an in-memory string
    pub fn over_str(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<R: BufRead> Iterator for Parser<R> {
    type Item = Result<ParseTree, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_tree() {
            Ok(Some(tree)) => Some(Ok(tree)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for Parser<R> {}

/// Parse the first tree from `input` and discard the rest
pub fn parse_one<R: BufRead>(input: R) -> Result<ParseTree, ParseError> {
    let mut parser = Parser::new(input);
    parser
        .next_tree()?
        .ok_or_else(|| ParseError::UnexpectedEof {
            offset: parser.offset(),
        })
}

/// Parse `text`, which must hold exactly one tree
pub fn parse_exact(text: &str) -> Result<ParseTree, ParseError> {
    let mut parser = Parser::over_str(text);
    let tree = parser
        .next_tree()?
        .ok_or_else(|| ParseError::UnexpectedEof {
            offset: parser.offset(),
        })?;
    if parser.has_residual_input()? {
        return Err(ParseError::ResidualInput {
            offset: parser.offset(),
        });
    }
    Ok(tree)
}

/// Parse every tree until the end of `input`
///
/// No-parse trees are kept. Parsing stops at the first malformed tree;
/// the trees before it are returned along with the error.
pub fn parse_all<R: BufRead>(input: R) -> (Vec<ParseTree>, Option<ParseError>) {
    let mut trees = Vec::new();
    for result in Parser::new(input) {
        match result {
            Ok(tree) => trees.push(tree),
            Err(e) => return (trees, Some(e)),
        }
    }
    (trees, None)
}

/// Parse a tree literal
///
/// # Panics
/// If `text` is not exactly one well-formed tree.
pub fn from_text(text: &str) -> ParseTree {
    match parse_exact(text) {
        Ok(tree) => tree,
        Err(e) => panic!("cannot parse tree {text:?}: {e}"),
    }
}
