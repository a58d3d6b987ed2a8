//! Head-child selection
//!
//! A [`HeadFinder`] picks the linguistic head among the children of a
//! constituent. [`TableHeadFinder`] is the generic table-driven rule engine;
//! language-specific tables live in [`crate::head_rules`].

use rustc_hash::FxHashMap;

/// Finds the head child of a constituent
pub trait HeadFinder {
    /// Index into `children` of the head child of `parent`
    ///
    /// # Panics
    /// If `children` is empty (a leaf has no head), or if the finder has
    /// no way to decide for `parent`.
    fn find_head(&self, parent: &str, children: &[&str]) -> usize;
}

/// Side of a constituent the head is searched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Scan left to right
    Initial,
    /// Scan right to left
    Final,
}

/// Head rule for one parent category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRule {
    pub direction: Direction,
    /// Rank of each preferred label, 0 being the best. Labels not listed
    /// rank `priority.len()`.
    pub priority: FxHashMap<String, usize>,
}

impl HeadRule {
    /// Create a rule preferring `labels` in decreasing order of priority
    ///
    /// With no labels the direction alone decides the head.
    pub fn new(direction: Direction, labels: &[&str]) -> Self {
        let mut priority = FxHashMap::default();
        for (rank, label) in labels.iter().enumerate() {
            priority.entry((*label).to_owned()).or_insert(rank);
        }
        Self {
            direction,
            priority,
        }
    }

    #[inline]
    pub fn rank(&self, label: &str) -> usize {
        self.priority
            .get(label)
            .copied()
            .unwrap_or(self.priority.len())
    }

    /// Best-ranked child; ties go to the child met first in scan order
    pub fn select(&self, children: &[&str]) -> usize {
        let ranked = children
            .iter()
            .enumerate()
            .map(|(i, label)| (i, self.rank(label)));
        let best = match self.direction {
            Direction::Initial => best_first(ranked),
            Direction::Final => best_first(ranked.rev()),
        };
        best.unwrap_or_else(|| panic!("cannot select a head among zero children"))
    }
}

/// First item with the strictly lowest rank
fn best_first(mut ranked: impl Iterator<Item = (usize, usize)>) -> Option<usize> {
    let (mut best, mut best_rank) = ranked.next()?;
    for (i, rank) in ranked {
        if rank < best_rank {
            best = i;
            best_rank = rank;
        }
    }
    Some(best)
}

/// Head finder driven by a table of [`HeadRule`]s
///
/// Parents missing from the table fall back to the first or last child
/// according to `fallback`; with no fallback they are a fatal error.
#[derive(Debug, Clone, Default)]
pub struct TableHeadFinder {
    pub table: FxHashMap<String, HeadRule>,
    pub fallback: Option<Direction>,
}

impl TableHeadFinder {
    pub fn new(fallback: Option<Direction>) -> Self {
        Self {
            table: FxHashMap::default(),
            fallback,
        }
    }

    /// Build from `(parent, direction, preferred labels)` entries
    pub fn from_rules(
        rules: &[(&str, Direction, &[&str])],
        fallback: Option<Direction>,
    ) -> Self {
        let mut finder = Self::new(fallback);
        for (parent, direction, labels) in rules {
            finder.insert(parent, HeadRule::new(*direction, labels));
        }
        finder
    }

    pub fn insert(&mut self, parent: &str, rule: HeadRule) {
        self.table.insert(parent.to_owned(), rule);
    }
}

impl HeadFinder for TableHeadFinder {
    fn find_head(&self, parent: &str, children: &[&str]) -> usize {
        assert!(
            !children.is_empty(),
            "trying to find the head of a leaf: {parent}"
        );
        match (self.table.get(parent), self.fallback) {
            (Some(rule), _) => rule.select(children),
            (None, Some(Direction::Initial)) => 0,
            (None, Some(Direction::Final)) => children.len() - 1,
            (None, None) => panic!("no head rule for category {parent}"),
        }
    }
}
