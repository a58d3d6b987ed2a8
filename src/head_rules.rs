//! Head rule tables for the English and Chinese treebanks
//!
//! English rules follow Collins (1999), appendix A, with the special NP
//! procedure; Chinese rules follow Zhang & Clark (2008), table 8.

use crate::heads::{Direction, HeadFinder, TableHeadFinder};

use Direction::{Final, Initial};

type RuleTable = &'static [(&'static str, Direction, &'static [&'static str])];

const ENGLISH_RULES: RuleTable = &[
    (
        "ADJP",
        Final,
        &[
            "NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS", "DT",
            "FW", "RBR", "RBS", "SBAR", "RB",
        ],
    ),
    (
        "ADVP",
        Initial,
        &[
            "RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN",
        ],
    ),
    ("CONJP", Initial, &["CC", "RB", "IN"]),
    ("FRAG", Initial, &[]),
    ("INTJ", Final, &[]),
    ("LST", Initial, &["LS", ":"]),
    (
        "NAC",
        Final,
        &[
            "NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG", "JJ",
            "JJS", "JJR", "ADJP", "FW",
        ],
    ),
    ("PP", Initial, &["IN", "TO", "VBG", "VBN", "RP", "FW"]),
    ("PRN", Final, &[]),
    ("PRT", Initial, &["RP"]),
    (
        "QP",
        Final,
        &[
            "$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS",
        ],
    ),
    ("RRC", Initial, &["VP", "NP", "ADVP", "ADJP", "PP"]),
    (
        "S",
        Final,
        &["TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP"],
    ),
    (
        "SBAR",
        Final,
        &[
            "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG",
        ],
    ),
    ("SBARQ", Final, &["SQ", "S", "SINV", "SBARQ", "FRAG"]),
    (
        "SINV",
        Final,
        &[
            "VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP",
        ],
    ),
    ("SQ", Final, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ"]),
    ("UCP", Initial, &[]),
    (
        "VP",
        Final,
        &[
            "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS", "NP",
        ],
    ),
    ("WHADJP", Final, &["CC", "WRB", "JJ", "ADJP"]),
    ("WHADVP", Initial, &["CC", "WRB"]),
    ("WHNP", Final, &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"]),
    ("WHPP", Initial, &["IN", "TO", "FW"]),
];

const CHINESE_RULES: RuleTable = &[
    ("ADJP", Final, &["ADJP", "JJ", "AD"]),
    (
        "ADVP",
        Final,
        &["ADVP", "AD", "CS", "JJ", "NP", "PP", "P", "VA", "VV"],
    ),
    ("CLP", Final, &["CLP", "M", "NN", "NP"]),
    ("CP", Final, &["CP", "IP", "VP"]),
    ("DNP", Final, &["DEG", "DNP", "DEC", "QP"]),
    ("DP", Initial, &["DP", "DT", "OD"]),
    ("DVP", Final, &["DEV", "AD", "VP"]),
    ("FRAG", Final, &["VV", "NR", "NN", "NT"]),
    ("IP", Final, &["VP", "IP", "NP"]),
    ("LCP", Final, &["LCP", "LC"]),
    ("LST", Final, &["CD", "NP", "QP"]),
    ("NP", Final, &["NP", "NN", "IP", "NR", "NT"]),
    ("NN", Final, &["NP", "NN", "IP", "NR", "NT"]),
    ("PP", Initial, &["P", "PP"]),
    ("PRN", Initial, &["PU"]),
    ("QP", Final, &["QP", "CLP", "CD"]),
    ("UCP", Initial, &["IP", "NP", "VP"]),
    ("VCD", Initial, &["VV", "VA", "VE"]),
    (
        "VP",
        Initial,
        &[
            "VE", "VC", "VV", "VNV", "VPT", "VRD", "VSB", "VCD", "VP",
        ],
    ),
    ("VPT", Initial, &["VA", "VV"]),
    ("VRD", Initial, &["VVI", "VA"]),
    ("VSB", Final, &["VV", "VE"]),
];

/// Head finder for English Penn Treebank trees
///
/// NPs use the dedicated procedure instead of a table row. A constituent
/// with a single child, such as a pre-terminal, is headed by that child.
/// Other categories outside the table are a fatal error.
#[derive(Debug, Clone)]
pub struct EnglishHeadFinder {
    table: TableHeadFinder,
}

impl Default for EnglishHeadFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishHeadFinder {
    pub fn new() -> Self {
        Self {
            table: TableHeadFinder::from_rules(ENGLISH_RULES, None),
        }
    }
}

/// Rightmost child whose label is in `labels`
fn rightmost(children: &[&str], labels: &[&str]) -> Option<usize> {
    children.iter().rposition(|c| labels.contains(c))
}

/// Collins' NP rule. Flattening of possessive NPs and removal of ADJP/QP
/// modifiers is expected to happen before head finding.
fn english_np_head(children: &[&str]) -> usize {
    let last = children.len() - 1;
    if children[last] == "POS" {
        return last;
    }
    rightmost(children, &["NN", "NNP", "NNPS", "NNS", "NX", "POS", "JJR"])
        .or_else(|| children.iter().position(|c| *c == "NP"))
        .or_else(|| rightmost(children, &["$", "ADJP", "PRN"]))
        .or_else(|| rightmost(children, &["CD"]))
        .or_else(|| rightmost(children, &["JJ", "JJS", "RB", "QP"]))
        .unwrap_or(last)
}

impl HeadFinder for EnglishHeadFinder {
    fn find_head(&self, parent: &str, children: &[&str]) -> usize {
        if children.len() == 1 {
            return 0;
        }
        if parent == "NP" {
            assert!(
                !children.is_empty(),
                "trying to find the head of a leaf: {parent}"
            );
            return english_np_head(children);
        }
        self.table.find_head(parent, children)
    }
}

/// Head finder for Chinese Treebank trees
///
/// Unknown categories are head-final. A DP headed by a measure word takes
/// the rightmost `M`.
#[derive(Debug, Clone)]
pub struct ChineseHeadFinder {
    table: TableHeadFinder,
}

impl Default for ChineseHeadFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChineseHeadFinder {
    pub fn new() -> Self {
        Self {
            table: TableHeadFinder::from_rules(CHINESE_RULES, Some(Final)),
        }
    }
}

impl HeadFinder for ChineseHeadFinder {
    fn find_head(&self, parent: &str, children: &[&str]) -> usize {
        if parent == "DP" {
            if let Some(m) = rightmost(children, &["M"]) {
                return m;
            }
        }
        self.table.find_head(parent, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_table() {
        let finder = EnglishHeadFinder::new();
        assert_eq!(finder.find_head("VP", &["VBD", "NP", "PP"]), 0);
        assert_eq!(finder.find_head("S", &["NP", "VP", "."]), 1);
        assert_eq!(finder.find_head("PP", &["IN", "NP"]), 0);
        // Head-final with nothing preferred: the last child
        assert_eq!(finder.find_head("PRN", &["-LRB-", "NP", "-RRB-"]), 2);
    }

    #[test]
    fn test_english_np() {
        let finder = EnglishHeadFinder::new();
        assert_eq!(finder.find_head("NP", &["NP", "POS"]), 1);
        assert_eq!(finder.find_head("NP", &["DT", "JJ", "NN", "NNS", "RB"]), 3);
        assert_eq!(finder.find_head("NP", &["DT", "NP", "PP", "NP"]), 1);
        assert_eq!(finder.find_head("NP", &["$", "CD", "ADJP"]), 2);
        assert_eq!(finder.find_head("NP", &["DT", "CD"]), 1);
        assert_eq!(finder.find_head("NP", &["JJ", "DT"]), 0);
        assert_eq!(finder.find_head("NP", &["DT", "PRP"]), 1);
    }

    #[test]
    #[should_panic(expected = "no head rule")]
    fn test_english_unknown_category() {
        EnglishHeadFinder::new().find_head("XYZ", &["A", "B"]);
    }

    #[test]
    fn test_english_single_child() {
        let finder = EnglishHeadFinder::new();
        assert_eq!(finder.find_head("NNP", &["Pierre"]), 0);
        assert_eq!(finder.find_head("XYZ", &["A"]), 0);
    }

    #[test]
    fn test_english_full_tree() {
        use crate::parser::from_text;

        let mut tree = from_text(
            "((S (NP (DT The) (NN bill)) (VP (VBZ is) (VP (VBN expected) (S (VP (TO to) (VP (VB pass)))))) (. .)))",
        );
        tree.fill_head(&EnglishHeadFinder::new());
        tree.fill_head_leaf();
        let root = tree.root().unwrap();
        let head_leaf = tree.head_leaves().unwrap()[root];
        assert_eq!(tree.label(head_leaf), "is");
    }

    #[test]
    #[should_panic(expected = "head of a leaf")]
    fn test_english_np_leaf() {
        EnglishHeadFinder::new().find_head("NP", &[]);
    }

    #[test]
    fn test_chinese() {
        let finder = ChineseHeadFinder::new();
        assert_eq!(finder.find_head("IP", &["NP", "VP", "PU"]), 1);
        assert_eq!(finder.find_head("DP", &["DT", "M", "M"]), 2);
        assert_eq!(finder.find_head("DP", &["DT", "OD"]), 0);
        // Unknown category falls back to the last child
        assert_eq!(finder.find_head("XYZ", &["A", "B"]), 1);
    }
}
