//! Subtree transaction volume.

use std::collections::HashMap;

use generational_arena::Index;
use rust_decimal::Decimal;
use tracing::{instrument, trace};

use crate::domain::arena::{OfficeArena, OfficeNode};
use crate::domain::error::{DomainError, DomainResult};

/// Sums transaction amounts over subtrees of an [`OfficeArena`].
///
/// The plain aggregator walks the subtree on every call. [`VolumeAggregator::cached`]
/// precomputes every subtree total in one post-order pass; both answer identically.
/// Unknown indices contribute zero.
#[derive(Debug)]
pub struct VolumeAggregator<'a> {
    tree: &'a OfficeArena,
    cache: Option<HashMap<Index, Decimal>>,
}

impl<'a> VolumeAggregator<'a> {
    pub fn new(tree: &'a OfficeArena) -> Self {
        Self { tree, cache: None }
    }

    /// Aggregator backed by a table of subtree totals, filled bottom-up.
    #[instrument(level = "debug", skip(tree))]
    pub fn cached(tree: &'a OfficeArena) -> DomainResult<Self> {
        let mut totals: HashMap<Index, Decimal> = HashMap::with_capacity(tree.len());
        for (idx, node) in tree.iter_postorder() {
            let mut total = own_volume(node)?;
            for child in &node.children {
                let child_total = totals.get(child).copied().unwrap_or(Decimal::ZERO);
                total = checked_add(total, child_total, node)?;
            }
            totals.insert(idx, total);
        }
        trace!("cached {} subtree totals", totals.len());
        Ok(Self {
            tree,
            cache: Some(totals),
        })
    }

    /// Amount recorded on `idx` plus every descendant at any depth.
    pub fn total_volume(&self, idx: Index) -> DomainResult<Decimal> {
        if let Some(cache) = &self.cache {
            if let Some(total) = cache.get(&idx) {
                return Ok(*total);
            }
        }
        let Some(node) = self.tree.get_node(idx) else {
            return Ok(Decimal::ZERO);
        };
        let own = own_volume(node)?;
        checked_add(own, self.descendant_volume(idx)?, node)
    }

    /// Amount recorded on every descendant of `idx`, excluding `idx` itself.
    pub fn descendant_volume(&self, idx: Index) -> DomainResult<Decimal> {
        let Some(node) = self.tree.get_node(idx) else {
            return Ok(Decimal::ZERO);
        };
        node.children.iter().try_fold(Decimal::ZERO, |acc, &child| {
            checked_add(acc, self.total_volume(child)?, node)
        })
    }
}

/// Sum of the transactions recorded directly on one office.
pub fn own_volume(node: &OfficeNode) -> DomainResult<Decimal> {
    node.transactions
        .iter()
        .try_fold(Decimal::ZERO, |acc, tx| checked_add(acc, tx.amount, node))
}

fn checked_add(a: Decimal, b: Decimal, node: &OfficeNode) -> DomainResult<Decimal> {
    a.checked_add(b).ok_or_else(|| DomainError::ArithmeticOverflow {
        office: node.data.name.clone(),
    })
}
