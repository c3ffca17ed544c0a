use std::fmt;

use generational_arena::{Arena, Index};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::domain::entities::Transaction;

/// Data payload for tree nodes representing offices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeData {
    /// Office name, used as the key of the distribution result
    pub name: String,
    /// Fraction of an incoming pool the office keeps when it has children
    pub commission_rate: Decimal,
}

impl OfficeData {
    pub fn new(name: impl Into<String>, commission_rate: Decimal) -> Self {
        Self {
            name: name.into(),
            commission_rate,
        }
    }
}

impl fmt::Display for OfficeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.commission_rate)
    }
}

/// Tree node in the arena-based office hierarchy.
#[derive(Debug)]
pub struct OfficeNode {
    /// Office data for this node
    pub data: OfficeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in attachment order
    pub children: Vec<Index>,
    /// Transactions recorded directly against this office
    pub transactions: Vec<Transaction>,
}

impl OfficeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based office hierarchy.
///
/// Children are referenced by index and parents by a non-owning back index,
/// so the ownership graph stays acyclic. A node can only be inserted under an
/// existing parent and is never re-parented, which keeps the structure a tree.
#[derive(Debug)]
pub struct OfficeArena {
    /// Arena storage for all office nodes
    arena: Arena<OfficeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for OfficeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl OfficeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert an office under `parent`, or as the root when `parent` is None.
    ///
    /// Inserting a second root replaces the root pointer; the previous root
    /// stays in the arena but is no longer reachable from `root()`.
    /// An unknown `parent` index leaves the new node detached: it keeps the
    /// dangling parent index, counts towards `len()` and is never visited
    /// from the root.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: OfficeData, parent: Option<Index>) -> Index {
        let node = OfficeNode {
            data,
            parent,
            children: Vec::new(),
            transactions: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Record a transaction against an office. Returns false for unknown indices.
    #[instrument(level = "trace", skip(self))]
    pub fn add_transaction(&mut self, idx: Index, transaction: Transaction) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.transactions.push(transaction);
                true
            }
            None => false,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&OfficeNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Parent of an office, following the back index.
    pub fn parent_of(&self, idx: Index) -> Option<&OfficeNode> {
        self.get_node(idx)
            .and_then(|node| node.parent)
            .and_then(|parent| self.get_node(parent))
    }

    /// First office reachable from the root with the given name (pre-order).
    pub fn find_by_name(&self, name: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.data.name == name)
            .map(|(idx, _)| idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects the names of all leaf offices, left to right.
    ///
    /// Empty trees return an empty vector.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a OfficeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a OfficeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a OfficeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a OfficeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a OfficeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a OfficeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> (OfficeArena, Index, Index, Index) {
        let mut tree = OfficeArena::new();
        let root = tree.insert_node(OfficeData::new("root", dec!(0.1)), None);
        let left = tree.insert_node(OfficeData::new("left", dec!(0.2)), Some(root));
        let right = tree.insert_node(OfficeData::new("right", dec!(0.3)), Some(root));
        (tree, root, left, right)
    }

    #[test]
    fn given_tree_when_iterating_preorder_then_visits_root_first_left_to_right() {
        let (tree, _, _, _) = sample();
        let names: Vec<_> = tree.iter().map(|(_, n)| n.data.name.as_str()).collect();
        assert_eq!(names, vec!["root", "left", "right"]);
    }

    #[test]
    fn given_tree_when_iterating_postorder_then_visits_root_last() {
        let (tree, _, _, _) = sample();
        let names: Vec<_> = tree
            .iter_postorder()
            .map(|(_, n)| n.data.name.as_str())
            .collect();
        assert_eq!(names, vec!["left", "right", "root"]);
    }

    #[test]
    fn given_child_when_looking_up_parent_then_returns_owner() {
        let (tree, root, left, _) = sample();
        assert_eq!(tree.parent_of(left).map(|n| n.data.name.as_str()), Some("root"));
        assert!(tree.parent_of(root).is_none());
    }
}
