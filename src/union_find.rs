//! Find with path compression over a parent slice
//!
//! Both connected-component detection and head-leaf propagation reduce to
//! following parent pointers to a fixed point. The slice is indexed by
//! `NodeId`; an entry pointing at itself is a representative.

use crate::topology::NodeId;

/// Follow `parent` pointers from `n` to its representative and rewrite
/// every node on the path to point directly at it.
///
/// The pointer graph must be acyclic apart from the self-loops at the
/// representatives.
#[inline]
pub fn find(parent: &mut [NodeId], n: NodeId) -> NodeId {
    let mut root = n;
    while parent[root] != root {
        root = parent[root];
    }

    let mut n = n;
    while n != root {
        let next = parent[n];
        parent[n] = root;
        n = next;
    }
    root
}

/// Merge the sets holding `a` and `b`; `a`'s representative survives.
#[inline]
pub fn union(parent: &mut [NodeId], a: NodeId, b: NodeId) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    parent[rb] = ra;
}

/// A parent slice where every node is its own representative.
pub fn singletons(n: usize) -> Vec<NodeId> {
    (0..n).collect()
}
