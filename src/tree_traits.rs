//! Rendering of office hierarchies as `termtree` trees.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Allocation, AllocationLine, OfficeArena};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for OfficeArena {
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => build_tree(self, root, &|idx| {
                self.get_node(idx)
                    .map(|node| {
                        format!(
                            "{} [rate {}, {} tx]",
                            node.data.name,
                            node.data.commission_rate,
                            node.transactions.len()
                        )
                    })
                    .unwrap_or_default()
            }),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

/// Hierarchy annotated with the outcome of a distribution run.
#[instrument(level = "debug", skip_all)]
pub fn breakdown_tree(tree: &OfficeArena, allocation: &Allocation) -> Tree<String> {
    let by_office: HashMap<Index, &AllocationLine> = allocation
        .lines
        .iter()
        .map(|line| (line.office, line))
        .collect();

    let Some(start) = allocation.lines.first().map(|line| line.office) else {
        return Tree::new("Empty tree".to_string());
    };

    build_tree(tree, start, &|idx| match by_office.get(&idx) {
        Some(line) => format!(
            "{}: {} (pool {}, volume {})",
            line.name, line.credited, line.pool, line.volume
        ),
        None => String::new(),
    })
}

fn build_tree(tree: &OfficeArena, idx: Index, label: &dyn Fn(Index) -> String) -> Tree<String> {
    let leaves: Vec<_> = tree
        .get_node(idx)
        .map(|node| {
            node.children
                .iter()
                .map(|&child| build_tree(tree, child, label))
                .collect()
        })
        .unwrap_or_default();

    Tree::new(label(idx)).with_leaves(leaves)
}
