//! Treebank collections
//!
//! Provides convenient collection interfaces for iterating over trees from
//! a string, a file, several files or a glob pattern. Files ending in `.gz`
//! are decompressed on the fly.

use crate::parser::{ParseError, Parser};
use crate::tree::ParseTree;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Error reading trees from a treebank source
#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("Treebank error: cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Treebank error: {origin}: {source}")]
    Parse {
        /// File name, or `<string>` for in-memory text
        origin: String,
        #[source]
        source: ParseError,
    },
}

type TreeResults = Box<dyn Iterator<Item = Result<ParseTree, TreebankError>>>;

/// Source of trees for a collection
#[derive(Debug, Clone)]
enum TreeSource {
    /// In-memory bracketed text
    String(String),
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

/// Collection of trees from a string, file, or glob pattern
///
/// Iterating a `Treebank` yields every tree that parses. A file that
/// cannot be opened is skipped, and a malformed tree ends its file; both
/// are logged as warnings. Use [`Treebank::trees`] to see the errors
/// instead.
///
/// # Examples
///
/// ```no_run
/// use treebank::Treebank;
///
/// for tree in Treebank::from_file("wsj_0001.mrg") {
///     println!("{}", tree.words().join(" "));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    source: TreeSource,
}

impl Treebank {
    /// Create from in-memory bracketed text
    pub fn from_string(text: &str) -> Self {
        Self {
            source: TreeSource::String(text.to_string()),
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: TreeSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, glob::PatternError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        Ok(Self::from_paths(file_paths))
    }

    /// Create from explicit file paths, read in the given order
    pub fn from_paths(file_paths: Vec<PathBuf>) -> Self {
        Self {
            source: TreeSource::Files(file_paths),
        }
    }

    /// Every tree or error, in input order
    ///
    /// After a parse error the rest of that file is skipped.
    pub fn trees(&self) -> TreeResults {
        match self.source.clone() {
            TreeSource::String(text) => {
                let iter = Parser::new(Cursor::new(text)).map(|result| {
                    result.map_err(|source| TreebankError::Parse {
                        origin: "<string>".to_string(),
                        source,
                    })
                });
                Box::new(iter)
            }
            TreeSource::File(path) => file_trees(path),
            TreeSource::Files(paths) => Box::new(paths.into_iter().flat_map(file_trees)),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = ParseTree>> {
        self.clone().into_iter()
    }
}

impl IntoIterator for Treebank {
    type Item = ParseTree;
    type IntoIter = Box<dyn Iterator<Item = Self::Item>>;

    fn into_iter(self) -> Self::IntoIter {
        let iter = self.trees().filter_map(|result| match result {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!(error = %e, "skipping treebank input");
                None
            }
        });
        Box::new(iter)
    }
}

/// Open `path`, decompressing `.gz` files
fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Helper: Open a file and return an iterator over its trees
///
/// A file that cannot be opened yields a single error.
fn file_trees(path: PathBuf) -> TreeResults {
    match open_reader(&path) {
        Ok(reader) => {
            debug!(path = %path.display(), "reading trees");
            let origin = path.display().to_string();
            let iter = Parser::new(reader).map(move |result| {
                result.map_err(|source| TreebankError::Parse {
                    origin: origin.clone(),
                    source,
                })
            });
            Box::new(iter)
        }
        Err(source) => Box::new(std::iter::once(Err(TreebankError::Open { path, source }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TREES: &str = "( (S (NP-SBJ (NNP Pierre)) (VP (VBD joined) (NP (DT the) (NN board)))) )\n\
                             ( (S (NP (PRP It)) (VP (VBZ works))) )\n";

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_treebank_from_string() {
        let trees: Vec<_> = Treebank::from_string(TWO_TREES).into_iter().collect();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].words(), vec!["Pierre", "joined", "the", "board"]);
        assert_eq!(trees[1].words(), vec!["It", "works"]);
    }

    #[test]
    fn test_no_parse_trees_are_kept() {
        let trees: Vec<_> = Treebank::from_string("(()) ((A B)) (())").iter().collect();
        assert_eq!(trees.len(), 3);
        assert!(trees[0].is_empty());
        assert!(!trees[1].is_empty());
    }

    #[test]
    fn test_trees_reports_parse_error() {
        init_logging();
        let results: Vec<_> = Treebank::from_string("((A B)) ((A)) ((C D))").trees().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(TreebankError::Parse { origin, source }) => {
                assert_eq!(origin, "<string>");
                assert!(matches!(source, ParseError::MissingWordOrOpenParen { .. }));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }

        // Iterating directly skips the error
        assert_eq!(Treebank::from_string("((A B)) ((A)) ((C D))").iter().count(), 1);
    }

    #[cfg(test)]
    mod multi_file {
        use super::*;
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::fs;
        use std::io::Write;
        use tempfile::{TempDir, tempdir};

        /// Helper to create test files with given content
        fn create_test_files(contents: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
            let dir = tempdir().unwrap();
            let mut paths = Vec::new();

            for (filename, content) in contents {
                let path = dir.path().join(filename);
                let mut file = fs::File::create(&path).unwrap();
                write!(file, "{}", content).unwrap();
                paths.push(path);
            }

            (dir, paths)
        }

        fn gzip(content: &str) -> Vec<u8> {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(content.as_bytes()).unwrap();
            encoder.finish().unwrap()
        }

        #[test]
        fn test_treebank_from_file() {
            let (_dir, paths) = create_test_files(&[("wsj_0001.mrg", TWO_TREES)]);
            let trees: Vec<_> = Treebank::from_file(&paths[0]).into_iter().collect();
            assert_eq!(trees.len(), 2);
        }

        #[test]
        fn test_treebank_from_paths() {
            let (_dir, paths) = create_test_files(&[
                ("file1.mrg", "((S (NP (DT The) (NN dog)) (VP (VBZ runs))))"),
                ("file2.mrg", "((S (NP (NNS Cats)) (VP (VBP sleep))))"),
            ]);

            let results: Vec<_> = Treebank::from_paths(paths).into_iter().collect();

            assert_eq!(results.len(), 2);
            assert_eq!(results[0].words().len(), 3);
            assert_eq!(results[1].words().len(), 2);
        }

        #[test]
        fn test_treebank_from_glob() {
            let (dir, _paths) = create_test_files(&[
                ("test2.mrg", "((S (NP (NNS Cats)) (VP (VBP sleep))))"),
                ("test1.mrg", "((S (NP (DT The) (NN dog)) (VP (VBZ runs))))"),
                ("other.txt", "ignored"),
            ]);

            let pattern = format!("{}/*.mrg", dir.path().display());
            let results: Vec<_> = Treebank::from_glob(&pattern).unwrap().into_iter().collect();

            assert_eq!(results.len(), 2);
            // Sorted by file name
            assert_eq!(results[0].words(), vec!["The", "dog", "runs"]);
        }

        #[test]
        fn test_gzip_files() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("wsj_0001.mrg.gz");
            // Concatenated gzip members are read as one stream
            let mut bytes = gzip("((A (B C)))\n");
            bytes.extend(gzip("((D E))\n"));
            fs::write(&path, bytes).unwrap();

            let trees: Vec<_> = Treebank::from_file(&path).into_iter().collect();
            assert_eq!(trees.len(), 2);
            assert_eq!(trees[1].to_string(), "((D E))");
        }

        #[test]
        fn test_skips_bad_files() {
            init_logging();
            let (dir, mut paths) = create_test_files(&[("good.mrg", "((A B))")]);

            let good_file = paths[0].clone();
            let bad_file = dir.path().join("nonexistent.mrg");
            paths = vec![good_file.clone(), bad_file.clone(), good_file];

            let results: Vec<_> = Treebank::from_paths(paths.clone()).into_iter().collect();
            assert_eq!(results.len(), 2);

            let errors: Vec<_> = Treebank::from_paths(paths)
                .trees()
                .filter_map(Result::err)
                .collect();
            assert_eq!(errors.len(), 1);
            match &errors[0] {
                TreebankError::Open { path, source } => {
                    assert_eq!(path, &bad_file);
                    assert_eq!(source.kind(), io::ErrorKind::NotFound);
                }
                other => panic!("expected an open error, got {other:?}"),
            }
        }

        #[test]
        fn test_parse_error_ends_only_its_file() {
            let (_dir, paths) = create_test_files(&[
                ("bad.mrg", "((A B)) ((A B) ((C D))"),
                ("good.mrg", "((E F))"),
            ]);

            let results: Vec<_> = Treebank::from_paths(paths).trees().collect();
            assert_eq!(results.len(), 3);
            assert!(results[0].is_ok());
            match &results[1] {
                Err(e @ TreebankError::Parse { origin, .. }) => {
                    assert!(origin.ends_with("bad.mrg"));
                    assert!(e.to_string().contains("expected `)`"));
                }
                other => panic!("expected a parse error, got {other:?}"),
            }
            assert_eq!(results[2].as_ref().unwrap().to_string(), "((E F))");
        }
    }
}
