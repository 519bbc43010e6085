//! Skeleton hierarchy (arena tree)
//!
//! Nodes live in a single `Vec` and reference each other by [`NodeIndex`].
//! Storage order is depth-first pre-order starting at the root, so every
//! parent precedes all of its descendants. The pose walk relies on this:
//! iterating the arena front to back visits nodes in the same order as a
//! recursive depth-first traversal, with each parent's global transform
//! already computed.

use glam::Mat4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::assets::{FlatNode, ImportedNode};
use crate::errors::{AnimationError, Result};
use crate::scene::transform::Transform;

/// Index of a node inside a [`SkeletonHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn from_usize(i: usize) -> Self {
        Self(i as u32)
    }
}

#[derive(Debug, Clone)]
pub struct SkeletonNode {
    pub name: String,
    /// Local bind transform relative to the parent.
    pub bind_transform: Mat4,
    /// `bind_transform` decomposed into TRS, used to fill channels a clip
    /// does not animate.
    pub rest_pose: Transform,
    pub parent: Option<NodeIndex>,
    pub children: SmallVec<[NodeIndex; 4]>,
}

/// Immutable bone tree shared by every clip and player of one skeleton.
#[derive(Debug, Clone)]
pub struct SkeletonHierarchy {
    nodes: Vec<SkeletonNode>,
    by_name: FxHashMap<String, NodeIndex>,
}

impl SkeletonHierarchy {
    /// Builds the arena from an imported node tree.
    ///
    /// A nested tree is rooted and acyclic by construction, so this cannot
    /// fail.
    #[must_use]
    pub fn from_imported(root: &ImportedNode) -> Self {
        let mut nodes: Vec<SkeletonNode> = Vec::new();

        // Work stack: (node, parent index). Children are pushed in reverse so
        // they pop, and are stored, in their original order.
        let mut stack: Vec<(&ImportedNode, Option<NodeIndex>)> = vec![(root, None)];

        while let Some((imported, parent)) = stack.pop() {
            let index = NodeIndex::from_usize(nodes.len());
            nodes.push(SkeletonNode {
                name: imported.name.clone(),
                bind_transform: imported.transform,
                rest_pose: Transform::from_matrix(&imported.transform),
                parent,
                children: SmallVec::new(),
            });
            if let Some(p) = parent {
                nodes[p.index()].children.push(index);
            }
            for child in imported.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Self::with_nodes(nodes)
    }

    /// Builds the arena from a flattened node list with parent indices.
    ///
    /// Fails when there is not exactly one root, when a parent index is out
    /// of range, or when some node cannot be reached from the root (which is
    /// the only way a cycle can show up in a single-parent list).
    pub fn from_flat(flat: &[FlatNode]) -> Result<Self> {
        let mut roots = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];

        for (i, node) in flat.iter().enumerate() {
            match node.parent {
                None => roots.push(i),
                Some(p) if p >= flat.len() => {
                    return Err(AnimationError::InvalidParent {
                        node: node.name.clone(),
                        parent: p,
                    });
                }
                Some(p) => children[p].push(i),
            }
        }

        let root = match roots.as_slice() {
            [] => return Err(AnimationError::MissingRoot),
            [root] => *root,
            many => return Err(AnimationError::MultipleRoots { count: many.len() }),
        };

        let mut nodes: Vec<SkeletonNode> = Vec::with_capacity(flat.len());
        let mut visited = vec![false; flat.len()];
        let mut stack: Vec<(usize, Option<NodeIndex>)> = vec![(root, None)];

        while let Some((flat_index, parent)) = stack.pop() {
            visited[flat_index] = true;
            let source = &flat[flat_index];
            let index = NodeIndex::from_usize(nodes.len());
            nodes.push(SkeletonNode {
                name: source.name.clone(),
                bind_transform: source.transform,
                rest_pose: Transform::from_matrix(&source.transform),
                parent,
                children: SmallVec::new(),
            });
            if let Some(p) = parent {
                nodes[p.index()].children.push(index);
            }
            for &child in children[flat_index].iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        if let Some(orphan) = visited.iter().position(|seen| !seen) {
            return Err(AnimationError::CyclicHierarchy {
                node: flat[orphan].name.clone(),
            });
        }

        Ok(Self::with_nodes(nodes))
    }

    fn with_nodes(nodes: Vec<SkeletonNode>) -> Self {
        let mut by_name = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            if by_name
                .insert(node.name.clone(), NodeIndex::from_usize(i))
                .is_some()
            {
                log::warn!("Skeleton node name '{}' is not unique", node.name);
            }
        }
        log::debug!("Built skeleton hierarchy with {} nodes", nodes.len());
        Self { nodes, by_name }
    }

    /// The root node. Always the first node in storage order.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A hierarchy always holds its root; provided for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&SkeletonNode> {
        self.nodes.get(index.index())
    }

    /// Looks a node up by name. With duplicate names, the last one in
    /// depth-first order wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    /// Nodes in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &SkeletonNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex::from_usize(i), node))
    }

    /// Global bind transforms of every node, in storage order.
    #[must_use]
    pub fn bind_globals(&self) -> Vec<Mat4> {
        let mut globals: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent_global = node
                .parent
                .map_or(Mat4::IDENTITY, |p| globals[p.index()]);
            globals.push(parent_global * node.bind_transform);
        }
        globals
    }
}
