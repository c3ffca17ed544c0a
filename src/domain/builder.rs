//! Tree builder turning office specs into arena hierarchies.

use std::collections::HashMap;

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::arena::{OfficeArena, OfficeData};
use crate::domain::entities::OfficeSpec;

/// Constructs [`OfficeArena`] hierarchies from nested [`OfficeSpec`]s.
#[derive(Debug, Default)]
pub struct HierarchyBuilder;

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build one arena from a root spec, keeping child and transaction order.
    #[instrument(level = "debug", skip(self, spec), fields(root = %spec.name))]
    pub fn build(&self, spec: &OfficeSpec) -> OfficeArena {
        let mut tree = OfficeArena::new();
        let mut stack: Vec<(&OfficeSpec, Option<Index>)> = vec![(spec, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            let data = OfficeData::new(current.name.clone(), current.commission_rate);
            let current_idx = tree.insert_node(data, parent_idx);

            for tx in &current.transactions {
                tree.add_transaction(current_idx, tx.clone());
            }

            // Reverse so children are inserted, and thus ordered, as declared
            for child in current.children.iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        debug!("built hierarchy with {} offices", tree.len());
        tree
    }
}

/// Office names occurring more than once in the tree, sorted.
///
/// The distribution result is keyed by name, so duplicates overwrite each other.
pub fn duplicate_names(tree: &OfficeArena) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, node) in tree.iter() {
        *counts.entry(node.data.name.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .sorted()
        .collect()
}
