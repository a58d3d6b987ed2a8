//! Tree shape: a forest of nodes addressed by dense ids
//!
//! A [`Topology`] holds `N` nodes with ids `0..N`. The tree of interest is
//! the one under [`Topology::root`]; other nodes may dangle while a tree is
//! being built or after [`Topology::disconnect`]. [`Topology::topsort`]
//! compacts the forest back to the rooted tree and renumbers it in
//! pre-order.

use crate::union_find;
use rustc_hash::FxHashMap;

/// Unique identifier for a node within one topology
pub type NodeId = usize;

/// Link from a node to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpLink {
    /// `None` for any node without a parent, not only the root
    pub parent: Option<NodeId>,
    /// Position in the parent's children; meaningless without a parent
    pub nth_child: usize,
}

/// The parent/child structure of a forest
#[derive(Debug, Default)]
pub struct Topology {
    root: Option<NodeId>,
    children: Vec<Vec<NodeId>>,
    /// Whether a node currently appears in some children list
    attached: Vec<bool>,
    /// Derived parent links; dropped by every mutation
    up_link: Option<Vec<UpLink>>,
}

impl Topology {
    /// Create a topology representing the empty tree
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Create a topology with a single root node `0`
    pub fn new_rooted() -> Self {
        Self {
            root: Some(0),
            children: vec![Vec::new()],
            attached: vec![false],
            up_link: None,
        }
    }

    /// Build a topology from a parent array
    ///
    /// Children are appended in increasing id order.
    pub fn from_parents(root: Option<NodeId>, parents: &[Option<NodeId>]) -> Self {
        let mut topology = Self::new_empty();
        for _ in parents {
            topology.add_node();
        }
        for (child, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                topology.append_child(parent, child);
            }
        }
        topology.set_root(root);
        topology
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Change which tree of the forest is represented
    pub fn set_root(&mut self, root: Option<NodeId>) {
        if let Some(n) = root {
            assert!(
                n < self.num_nodes(),
                "root {n} out of range for {} nodes",
                self.num_nodes()
            );
        }
        self.root = root;
        self.up_link = None;
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.children.len()
    }

    /// Children of `n` in left-to-right order
    #[inline]
    pub fn children(&self, n: NodeId) -> &[NodeId] {
        &self.children[n]
    }

    /// Whether `n` has no children in its own tree
    #[inline]
    pub fn is_leaf(&self, n: NodeId) -> bool {
        self.children[n].is_empty()
    }

    /// Whether `n` is the POS node directly above a single leaf
    #[inline]
    pub fn is_preterminal(&self, n: NodeId) -> bool {
        matches!(self.children[n].as_slice(), [only] if self.is_leaf(*only))
    }

    /// Add a node with neither parent nor children and return its id
    pub fn add_node(&mut self) -> NodeId {
        let id = self.num_nodes();
        self.children.push(Vec::new());
        self.attached.push(false);
        self.up_link = None;
        id
    }

    /// Append `child` as the rightmost child of `parent`
    ///
    /// `child` may be the current root; the topology then still represents
    /// the subtree under `child`.
    ///
    /// # Panics
    /// If `child` is already attached to a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            !self.attached[child],
            "node {child} already has a parent; cannot append it to {parent}"
        );
        self.children[parent].push(child);
        self.attached[child] = true;
        self.up_link = None;
    }

    /// Partition every node, dangling ones included, into connected
    /// components keyed by a representative member
    ///
    /// Member lists are in increasing id order.
    pub fn components(&self) -> FxHashMap<NodeId, Vec<NodeId>> {
        let mut parent = union_find::singletons(self.num_nodes());
        for (p, children) in self.children.iter().enumerate() {
            for &c in children {
                union_find::union(&mut parent, p, c);
            }
        }

        let mut components: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
        for n in 0..self.num_nodes() {
            let rep = union_find::find(&mut parent, n);
            components.entry(rep).or_default().push(n);
        }
        components
    }

    /// Nodes of the tree under the root in pre-order
    ///
    /// # Panics
    /// If a node is reached twice, i.e. the topology has a cycle.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.num_nodes());
        let mut visited = vec![false; self.num_nodes()];
        if let Some(root) = self.root {
            let mut stack = vec![root];
            while let Some(n) = stack.pop() {
                if visited[n] {
                    panic!("cycle in topology: node {n} reached twice");
                }
                visited[n] = true;
                order.push(n);
                stack.extend(self.children[n].iter().rev());
            }
        }
        order
    }

    /// Renumber the tree under the root in pre-order and drop every node
    /// that is not reachable from it
    ///
    /// Returns the old-to-new id mapping; dropped nodes map to `None`.
    ///
    /// # Panics
    /// If a node is reached twice, i.e. the topology has a cycle.
    pub fn topsort(&mut self) -> Vec<Option<NodeId>> {
        let order = self.preorder();
        self.remap(&order)
    }

    /// Rebuild the children lists in `new_to_old` order, rewriting each
    /// surviving list in place.
    fn remap(&mut self, new_to_old: &[NodeId]) -> Vec<Option<NodeId>> {
        let mut old_to_new = vec![None; self.num_nodes()];
        for (new, &old) in new_to_old.iter().enumerate() {
            old_to_new[old] = Some(new);
        }

        let mut old_children = std::mem::take(&mut self.children);
        self.children = new_to_old
            .iter()
            .map(|&old| {
                let mut list = std::mem::take(&mut old_children[old]);
                for c in list.iter_mut() {
                    *c = old_to_new[*c].expect("children of a visited node are visited");
                }
                list
            })
            .collect();

        self.root = if self.children.is_empty() {
            None
        } else {
            Some(0)
        };
        self.attached = (0..self.children.len()).map(|n| n != 0).collect();
        self.up_link = None;
        old_to_new
    }

    /// Detach every node flagged in `remove` from its parent
    ///
    /// Remaining children keep their order. A flagged root leaves the
    /// topology empty. Ids are not reclaimed; follow with
    /// [`Topology::topsort`] to compact.
    pub fn disconnect(&mut self, remove: &[bool]) {
        assert_eq!(
            remove.len(),
            self.num_nodes(),
            "remove flags and topology do not match in size"
        );
        if self.root.is_some_and(|root| remove[root]) {
            self.root = None;
        }
        for children in self.children.iter_mut() {
            children.retain(|&c| !remove[c]);
        }
        for (attached, &removed) in self.attached.iter_mut().zip(remove) {
            if removed {
                *attached = false;
            }
        }
        self.up_link = None;
    }

    /// Compute the parent link of every node
    ///
    /// Call this once the topology has its final shape; any later mutation
    /// drops the links again.
    pub fn fill_up_link(&mut self) {
        let mut up_link = vec![
            UpLink {
                parent: None,
                nth_child: 0,
            };
            self.num_nodes()
        ];
        for (parent, children) in self.children.iter().enumerate() {
            for (nth_child, &child) in children.iter().enumerate() {
                up_link[child] = UpLink {
                    parent: Some(parent),
                    nth_child,
                };
            }
        }
        self.up_link = Some(up_link);
    }

    /// Parent links, if filled since the last mutation
    pub fn up_link(&self) -> Option<&[UpLink]> {
        self.up_link.as_deref()
    }

    /// Parent of `n` according to the filled up-links
    ///
    /// # Panics
    /// If [`Topology::fill_up_link`] has not been called since the last
    /// mutation.
    pub fn parent(&self, n: NodeId) -> Option<NodeId> {
        let up_link = self
            .up_link
            .as_ref()
            .expect("up-links are not filled; call fill_up_link() first");
        up_link[n].parent
    }

    /// Deep copy of the shape; the up-link cache is not copied
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl Clone for Topology {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            children: self.children.clone(),
            attached: self.attached.clone(),
            up_link: None,
        }
    }
}

// Structural equality; the up-link cache is ignored
impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.children == other.children
    }
}

impl Eq for Topology {}
