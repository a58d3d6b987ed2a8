//! Treebank: Penn Treebank parse trees
//!
//! Reads bracketed trees such as `((S (NP this) (VP (V is) (NP (DT a) (NN test)))))`
//! and computes the annotations downstream NLP pipelines use: constituent
//! spans, head children and head leaves.

// Core modules
pub mod head_rules; // English and Chinese head tables
pub mod heads; // Table-driven head finder
pub mod interner; // Label <-> id interning
pub mod parser; // Bracketed tree parser
pub mod tokenizer;
pub mod topology; // Forest shape, topsort, disconnect
pub mod tree; // Parse trees and their annotations
pub mod treebank; // Tree collections from strings and files
pub mod union_find;

// Re-exports for convenience
pub use head_rules::{ChineseHeadFinder, EnglishHeadFinder};
pub use heads::{Direction, HeadFinder, HeadRule, TableHeadFinder};
pub use interner::{LabelInterner, LabelMap};
pub use parser::{ParseError, Parser, from_text, parse_all, parse_exact, parse_one};
pub use topology::{NodeId, Topology, UpLink};
pub use tree::{EMPTY_CATEGORY, Fill, ParseTree, Span};
pub use treebank::{Treebank, TreebankError};
