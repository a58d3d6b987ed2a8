//! Parse trees with node annotations
//!
//! A [`ParseTree`] is a [`Topology`] plus optional per-node arrays: labels,
//! interned label ids, spans, head children and head leaves. Each array is
//! either absent or exactly one entry per node. The tree never recomputes an
//! array on its own; after a structural change, re-run the matching `fill_*`
//! method. Routines that read an array panic when it is missing or does not
//! match the topology in size.

use crate::heads::HeadFinder;
use crate::interner::LabelInterner;
use crate::topology::{NodeId, Topology};
use crate::union_find;
use bitflags::bitflags;
use memchr::memchr2;
use std::fmt::{self, Write as _};

/// Label of empty-category constituents
pub const EMPTY_CATEGORY: &str = "-NONE-";

/// A half-open `[left, right)` range of leaf positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub left: usize,
    pub right: usize,
}

impl Span {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    pub fn len(&self) -> usize {
        self.right - self.left
    }

    pub fn is_empty(&self) -> bool {
        self.left == self.right
    }
}

bitflags! {
    /// Annotations for [`ParseTree::fill`] to compute
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Fill: u32 {
        /// Ids from labels when labels are present; labels from ids otherwise
        const LABEL_ID = 1 << 0;
        const SPAN = 1 << 1;
        const HEAD = 1 << 2;
        /// Implies `HEAD`
        const HEAD_LEAF = 1 << 3;
        const YIELD = 1 << 4;
        const POS = 1 << 5;
        const UP_LINK = 1 << 6;
        const EVERYTHING = Self::LABEL_ID.bits()
            | Self::SPAN.bits()
            | Self::HEAD.bits()
            | Self::HEAD_LEAF.bits()
            | Self::YIELD.bits()
            | Self::POS.bits()
            | Self::UP_LINK.bits();
    }
}

/// Tree topology with optional node annotations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseTree {
    topology: Topology,
    labels: Option<Vec<String>>,
    ids: Option<Vec<usize>>,
    spans: Option<Vec<Span>>,
    /// Index of the head child; `None` on leaves
    heads: Option<Vec<Option<usize>>>,
    head_leaves: Option<Vec<NodeId>>,
    /// Leaves in left-to-right order
    yields: Option<Vec<NodeId>>,
    /// Pre-terminals in left-to-right order
    pos: Option<Vec<NodeId>>,
}

/// The array if it is present and matches `num_nodes`
fn full<'a, T>(array: &'a Option<Vec<T>>, num_nodes: usize, what: &str) -> &'a [T] {
    match array {
        Some(array) if array.len() == num_nodes => array,
        Some(array) => panic!(
            "{what} has {} entries but topology has {num_nodes} nodes",
            array.len()
        ),
        None => panic!("{what} is not available"),
    }
}

/// Move a full-length array into the numbering given by `old_to_new`;
/// arrays of any other length are dropped.
fn remap<T: Default>(
    array: Option<Vec<T>>,
    old_to_new: &[Option<NodeId>],
    num_nodes: usize,
) -> Option<Vec<T>> {
    let mut array = array.filter(|a| a.len() == old_to_new.len())?;
    let mut out: Vec<T> = std::iter::repeat_with(T::default).take(num_nodes).collect();
    for (old, new) in old_to_new.iter().enumerate() {
        if let Some(new) = *new {
            out[new] = std::mem::take(&mut array[old]);
        }
    }
    Some(out)
}

/// Translate node ids through `old_to_new`; `None` if any node was dropped.
fn remap_ids(ids: &[NodeId], old_to_new: &[Option<NodeId>]) -> Option<Vec<NodeId>> {
    ids.iter()
        .map(|&old| old_to_new.get(old).copied().flatten())
        .collect()
}

impl ParseTree {
    /// Create a tree from a topology and one label per node
    pub fn new(topology: Topology, labels: Vec<String>) -> Self {
        assert_eq!(
            labels.len(),
            topology.num_nodes(),
            "labels and topology do not match in size"
        );
        Self {
            topology,
            labels: Some(labels),
            ..Self::default()
        }
    }

    /// The no-parse tree
    pub fn empty() -> Self {
        Self::new(Topology::new_empty(), Vec::new())
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable access to the shape; annotations are not updated
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.topology.num_nodes()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.topology.root()
    }

    /// Whether this is the no-parse tree
    pub fn is_empty(&self) -> bool {
        self.topology.root().is_none()
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Label of node `n`
    ///
    /// # Panics
    /// If labels are not available.
    pub fn label(&self, n: NodeId) -> &str {
        &full(&self.labels, self.num_nodes(), "labels")[n]
    }

    pub fn ids(&self) -> Option<&[usize]> {
        self.ids.as_deref()
    }

    pub fn spans(&self) -> Option<&[Span]> {
        self.spans.as_deref()
    }

    pub fn heads(&self) -> Option<&[Option<usize>]> {
        self.heads.as_deref()
    }

    pub fn head_leaves(&self) -> Option<&[NodeId]> {
        self.head_leaves.as_deref()
    }

    pub fn yields(&self) -> Option<&[NodeId]> {
        self.yields.as_deref()
    }

    pub fn pos(&self) -> Option<&[NodeId]> {
        self.pos.as_deref()
    }

    /// Replace the labels, or drop them with `None`
    pub fn set_labels(&mut self, labels: Option<Vec<String>>) {
        if let Some(labels) = &labels {
            assert_eq!(
                labels.len(),
                self.num_nodes(),
                "labels and topology do not match in size"
            );
        }
        self.labels = labels;
    }

    /// Replace the label ids, or drop them with `None`
    pub fn set_ids(&mut self, ids: Option<Vec<usize>>) {
        if let Some(ids) = &ids {
            assert_eq!(
                ids.len(),
                self.num_nodes(),
                "ids and topology do not match in size"
            );
        }
        self.ids = ids;
    }

    /// Leaf labels in left-to-right order
    pub fn words(&self) -> Vec<&str> {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        self.leaves().into_iter().map(|n| labels[n].as_str()).collect()
    }

    /// Pre-terminal (part-of-speech) labels in left-to-right order
    pub fn preterminals(&self) -> Vec<&str> {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        self.topology
            .preorder()
            .into_iter()
            .filter(|&n| self.topology.is_preterminal(n))
            .map(|n| labels[n].as_str())
            .collect()
    }

    /// Leaves under the root in left-to-right order
    pub fn leaves(&self) -> Vec<NodeId> {
        self.topology
            .preorder()
            .into_iter()
            .filter(|&n| self.topology.is_leaf(n))
            .collect()
    }

    /// Compute the annotations selected by `flags`
    ///
    /// Runs in dependency order: label/id, span, head, head leaf, yield,
    /// POS, up-link.
    ///
    /// # Panics
    /// If `LABEL_ID` is requested without an interner, or `HEAD` /
    /// `HEAD_LEAF` without a head finder.
    pub fn fill(
        &mut self,
        flags: Fill,
        interner: Option<&mut dyn LabelInterner>,
        finder: Option<&dyn HeadFinder>,
    ) {
        if flags.contains(Fill::LABEL_ID) {
            let interner = interner.expect("filling label ids requires an interner");
            if self
                .labels
                .as_ref()
                .is_some_and(|l| l.len() == self.num_nodes())
            {
                self.remap_by_label(interner);
            } else {
                self.remap_by_id(&*interner);
            }
        }
        if flags.contains(Fill::SPAN) {
            self.fill_span();
        }
        if flags.intersects(Fill::HEAD | Fill::HEAD_LEAF) {
            self.fill_head(finder.expect("filling heads requires a head finder"));
        }
        if flags.contains(Fill::HEAD_LEAF) {
            self.fill_head_leaf();
        }
        if flags.contains(Fill::YIELD) {
            self.fill_yield();
        }
        if flags.contains(Fill::POS) {
            self.fill_pos();
        }
        if flags.contains(Fill::UP_LINK) {
            self.topology.fill_up_link();
        }
    }

    /// Rebuild ids from labels, interning new labels
    pub fn remap_by_label<I: LabelInterner + ?Sized>(&mut self, interner: &mut I) {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        self.ids = Some(interner.intern_all(labels));
    }

    /// Rebuild labels from ids
    ///
    /// # Panics
    /// If an id is unknown to the interner.
    pub fn remap_by_id<I: LabelInterner + ?Sized>(&mut self, interner: &I) {
        let ids = full(&self.ids, self.num_nodes(), "ids");
        let labels = ids
            .iter()
            .map(|&id| match interner.lookup(id) {
                Some(label) => label.to_owned(),
                None => panic!("label id {id} is unknown to the interner"),
            })
            .collect();
        self.labels = Some(labels);
    }

    /// Compute the leaf span of every node under the root
    ///
    /// Nodes outside the rooted tree get an empty span at 0.
    pub fn fill_span(&mut self) {
        let mut spans = vec![Span::default(); self.num_nodes()];
        if let Some(root) = self.topology.root() {
            let mut cursor = 0;
            // (node, children already visited)
            let mut stack = vec![(root, false)];
            while let Some((n, visited)) = stack.pop() {
                let children = self.topology.children(n);
                match (children.first(), children.last()) {
                    (Some(&first), Some(&last)) if visited => {
                        spans[n] = Span::new(spans[first].left, spans[last].right);
                    }
                    (Some(_), Some(_)) => {
                        stack.push((n, true));
                        stack.extend(children.iter().rev().map(|&c| (c, false)));
                    }
                    _ => {
                        spans[n] = Span::new(cursor, cursor + 1);
                        cursor += 1;
                    }
                }
            }
        }
        self.spans = Some(spans);
    }

    /// Ask `finder` for the head child of every internal node
    pub fn fill_head<F: HeadFinder + ?Sized>(&mut self, finder: &F) {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        let topology = &self.topology;
        let mut child_labels: Vec<&str> = Vec::with_capacity(16);
        let heads = (0..topology.num_nodes())
            .map(|n| {
                let children = topology.children(n);
                if children.is_empty() {
                    return None;
                }
                child_labels.clear();
                child_labels.extend(children.iter().map(|&c| labels[c].as_str()));
                let head = finder.find_head(&labels[n], &child_labels);
                assert!(
                    head < children.len(),
                    "head finder chose child {head} of {} under {}",
                    children.len(),
                    labels[n]
                );
                Some(head)
            })
            .collect();
        self.heads = Some(heads);
    }

    /// Follow head children down to a leaf for every node
    pub fn fill_head_leaf(&mut self) {
        let heads = full(&self.heads, self.num_nodes(), "heads");
        let mut head_leaves: Vec<NodeId> = heads
            .iter()
            .enumerate()
            .map(|(n, head)| match *head {
                Some(h) => {
                    let children = self.topology.children(n);
                    assert!(
                        h < children.len(),
                        "heads do not match the topology at node {n}"
                    );
                    children[h]
                }
                None => n,
            })
            .collect();
        for n in 0..head_leaves.len() {
            union_find::find(&mut head_leaves, n);
        }
        self.head_leaves = Some(head_leaves);
    }

    /// Record the leaves in left-to-right order
    pub fn fill_yield(&mut self) {
        self.yields = Some(self.leaves());
    }

    /// Record the pre-terminals in left-to-right order
    pub fn fill_pos(&mut self) {
        let pos = self
            .topology
            .preorder()
            .into_iter()
            .filter(|&n| self.topology.is_preterminal(n))
            .collect();
        self.pos = Some(pos);
    }

    /// Renumber the tree in pre-order, dropping nodes outside the rooted
    /// tree, and carry every annotation over to the new numbering
    ///
    /// Per-node arrays that did not match the old topology in size are
    /// dropped, as are node-id arrays that refer to a dropped node.
    pub fn topsort(&mut self) -> Vec<Option<NodeId>> {
        let old_to_new = self.topology.topsort();
        let n = self.num_nodes();

        self.labels = remap(self.labels.take(), &old_to_new, n);
        self.ids = remap(self.ids.take(), &old_to_new, n);
        self.spans = remap(self.spans.take(), &old_to_new, n);
        self.heads = remap(self.heads.take(), &old_to_new, n);
        self.head_leaves = remap(self.head_leaves.take(), &old_to_new, n)
            .and_then(|leaves| remap_ids(&leaves, &old_to_new));
        self.yields = self
            .yields
            .take()
            .and_then(|ids| remap_ids(&ids, &old_to_new));
        self.pos = self
            .pos
            .take()
            .and_then(|ids| remap_ids(&ids, &old_to_new));
        old_to_new
    }

    /// Strip function tags and indices (`NP-SBJ-1`, `NP=2`) from labels
    ///
    /// Leaf labels are stripped only when they are traces starting with
    /// `*`. Internal labels starting with `-` (`-NONE-`, `-LRB-`) are kept
    /// verbatim. Ids, heads and head leaves depend on the labels and are
    /// dropped.
    pub fn strip_annotation(&mut self) -> &mut Self {
        let n = self.num_nodes();
        full(&self.labels, n, "labels");
        if let Some(labels) = self.labels.as_mut() {
            for (node, label) in labels.iter_mut().enumerate() {
                let strip = if self.topology.is_leaf(node) {
                    label.starts_with('*')
                } else {
                    !label.starts_with('-')
                };
                if strip {
                    if let Some(cut) = memchr2(b'-', b'=', label.as_bytes()) {
                        label.truncate(cut);
                    }
                }
            }
        }
        self.ids = None;
        self.heads = None;
        self.head_leaves = None;
        self
    }

    /// Remove empty categories and every constituent left without content
    ///
    /// The tree is compacted afterwards. Spans, heads, head leaves, yield
    /// and POS no longer describe the new shape and are dropped.
    pub fn remove_none(&mut self) -> &mut Self {
        self.topsort();
        let n = self.num_nodes();
        let labels = full(&self.labels, n, "labels");

        // Children have larger ids than parents, so a reverse scan is
        // bottom-up. Only the topmost node of an empty subtree stays marked.
        let mut remove = vec![false; n];
        for node in (0..n).rev() {
            let children = self.topology.children(node);
            if labels[node] == EMPTY_CATEGORY {
                remove[node] = true;
            } else if !children.is_empty() && children.iter().all(|&c| remove[c]) {
                remove[node] = true;
                for &c in children {
                    remove[c] = false;
                }
            }
        }
        tracing::trace!(
            removed = remove.iter().filter(|&&r| r).count(),
            "removing empty categories"
        );

        self.topology.disconnect(&remove);
        self.topsort();
        self.spans = None;
        self.heads = None;
        self.head_leaves = None;
        self.yields = None;
        self.pos = None;
        self
    }

    /// The subtree under `n` in bracketed form, without the outer wrapper
    pub fn string_under(&self, n: NodeId) -> String {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = write_subtree(&mut out, &self.topology, labels, n);
        out
    }

    /// Render through `interner` when only ids are available
    pub fn to_string_with<I: LabelInterner + ?Sized>(&self, interner: &I) -> String {
        if self.labels.as_ref().is_some_and(|l| l.len() == self.num_nodes()) {
            return self.to_string();
        }
        let mut tree = self.clone();
        tree.remap_by_id(interner);
        tree.to_string()
    }
}

enum Step {
    Enter(NodeId),
    Space,
    Close,
}

fn write_subtree<W: fmt::Write, L: AsRef<str>>(
    out: &mut W,
    topology: &Topology,
    labels: &[L],
    node: NodeId,
) -> fmt::Result {
    let mut stack = vec![Step::Enter(node)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(n) => {
                let children = topology.children(n);
                if children.is_empty() {
                    out.write_str(labels[n].as_ref())?;
                    continue;
                }
                out.write_char('(')?;
                out.write_str(labels[n].as_ref())?;
                stack.push(Step::Close);
                for &c in children.iter().rev() {
                    stack.push(Step::Enter(c));
                    stack.push(Step::Space);
                }
            }
            Step::Space => out.write_char(' ')?,
            Step::Close => out.write_char(')')?,
        }
    }
    Ok(())
}

/// Standard treebank form: `((S ...))`, or `(())` for the no-parse tree
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = full(&self.labels, self.num_nodes(), "labels");
        f.write_char('(')?;
        match self.topology.root() {
            Some(root) => write_subtree(f, &self.topology, labels, root)?,
            None => f.write_str("()")?,
        }
        f.write_char(')')
    }
}
