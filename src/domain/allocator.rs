//! Commission pool distribution over an office hierarchy.
//!
//! The overall rate is applied once to the grand total of the tree. Every
//! internal office then keeps `pool * commission_rate` and splits what is left
//! among its children by subtree volume. Leaves take whatever reaches them.

use std::collections::BTreeMap;

use generational_arena::Index;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{OfficeArena, OfficeNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::volume::VolumeAggregator;

/// Fraction of the grand total that forms the distributable pool (2.5%).
pub const DEFAULT_OVERALL_RATE: Decimal = dec!(0.025);

/// Fractional digits of every amount the allocator emits.
pub const AMOUNT_SCALE: u32 = 2;

/// Round half-to-even to two decimal places, always carrying scale 2.
///
/// Child pools are rounded from `remainder * volume / sibling_total`, and the
/// division itself already rounds to 28 significant digits. Once sibling
/// volumes reach about 1e13 that first rounding can reach the cent digit and
/// the result may differ from an exact half-even division by one cent.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// One office's part in a distribution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationLine {
    pub office: Index,
    pub name: String,
    /// Distance from the distribution root (root = 0)
    pub depth: usize,
    /// Transaction volume of the office and all its descendants
    pub volume: Decimal,
    /// Pool entering the office
    pub pool: Decimal,
    /// Amount credited to the office
    pub credited: Decimal,
}

/// Full result of a distribution run, lines in depth-first pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub grand_total: Decimal,
    pub pool: Decimal,
    pub lines: Vec<AllocationLine>,
}

impl Allocation {
    /// Name-keyed credits. A repeated name keeps the value written last.
    pub fn shares(&self) -> BTreeMap<String, Decimal> {
        self.lines
            .iter()
            .map(|line| (line.name.clone(), line.credited))
            .collect()
    }

    /// Sum of all credited amounts.
    pub fn credited_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.credited).sum()
    }
}

/// Splits a commission pool across an office hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitAllocator {
    overall_rate: Decimal,
}

impl Default for ProfitAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERALL_RATE)
    }
}

impl ProfitAllocator {
    pub fn new(overall_rate: Decimal) -> Self {
        Self { overall_rate }
    }

    pub fn overall_rate(&self) -> Decimal {
        self.overall_rate
    }

    /// Distribute the pool of the whole tree and return credits keyed by office name.
    ///
    /// Every office reachable from the root gets an entry, zero credits included.
    ///
    /// # Errors
    ///
    /// * `DomainError::InvalidArgument` if the tree has no root.
    /// * `DomainError::ArithmeticOverflow` if an amount exceeds the decimal range.
    pub fn distribute(&self, tree: &OfficeArena) -> DomainResult<BTreeMap<String, Decimal>> {
        Ok(self.breakdown(tree)?.shares())
    }

    /// Same as [`distribute`](Self::distribute), treating `start` as the root.
    pub fn distribute_from(
        &self,
        tree: &OfficeArena,
        start: Index,
    ) -> DomainResult<BTreeMap<String, Decimal>> {
        Ok(self.breakdown_from(tree, start)?.shares())
    }

    /// Distribution run over the whole tree with per-office detail.
    pub fn breakdown(&self, tree: &OfficeArena) -> DomainResult<Allocation> {
        let root = tree.root().ok_or_else(|| {
            DomainError::InvalidArgument("hierarchy has no root office to distribute from".into())
        })?;
        self.breakdown_from(tree, root)
    }

    #[instrument(level = "debug", skip(self, tree))]
    pub fn breakdown_from(&self, tree: &OfficeArena, start: Index) -> DomainResult<Allocation> {
        let root = tree.get_node(start).ok_or_else(|| {
            DomainError::InvalidArgument(format!("office {:?} is not part of the hierarchy", start))
        })?;

        let volumes = VolumeAggregator::cached(tree)?;
        let grand_total = volumes.total_volume(start)?;
        let pool = round2(
            grand_total
                .checked_mul(self.overall_rate)
                .ok_or_else(|| overflow(root))?,
        );
        debug!(
            "distributing from {}: grand_total={} rate={} pool={}",
            root.data.name, grand_total, self.overall_rate, pool
        );

        let mut lines = Vec::with_capacity(tree.len());
        self.allocate(tree, &volumes, start, pool, 0, &mut lines)?;

        Ok(Allocation {
            grand_total,
            pool,
            lines,
        })
    }

    fn allocate(
        &self,
        tree: &OfficeArena,
        volumes: &VolumeAggregator<'_>,
        idx: Index,
        pool: Decimal,
        depth: usize,
        lines: &mut Vec<AllocationLine>,
    ) -> DomainResult<()> {
        let Some(node) = tree.get_node(idx) else {
            return Ok(());
        };
        let volume = volumes.total_volume(idx)?;

        if node.is_leaf() {
            // Leaves collect the whole pool; their own rate is not applied.
            lines.push(line(idx, node, depth, volume, pool, round2(pool)));
            return Ok(());
        }

        let node_share = pool
            .checked_mul(node.data.commission_rate)
            .ok_or_else(|| overflow(node))?;
        lines.push(line(idx, node, depth, volume, pool, round2(node_share)));

        // Remainder comes from the unrounded share so rounding does not compound.
        let remainder = pool.checked_sub(node_share).ok_or_else(|| overflow(node))?;
        let sibling_total = volumes.descendant_volume(idx)?;
        trace!(
            "{}: share={} remainder={} sibling_total={}",
            node.data.name,
            node_share,
            remainder,
            sibling_total
        );

        for &child in &node.children {
            let child_pool = if sibling_total.is_zero() {
                Decimal::new(0, AMOUNT_SCALE)
            } else {
                let child_volume = volumes.total_volume(child)?;
                let weighted = remainder
                    .checked_mul(child_volume)
                    .and_then(|v| v.checked_div(sibling_total))
                    .ok_or_else(|| overflow(node))?;
                round2(weighted)
            };
            self.allocate(tree, volumes, child, child_pool, depth + 1, lines)?;
        }
        Ok(())
    }
}

fn line(
    idx: Index,
    node: &OfficeNode,
    depth: usize,
    volume: Decimal,
    pool: Decimal,
    credited: Decimal,
) -> AllocationLine {
    AllocationLine {
        office: idx,
        name: node.data.name.clone(),
        depth,
        volume,
        pool,
        credited,
    }
}

fn overflow(node: &OfficeNode) -> DomainError {
    DomainError::ArithmeticOverflow {
        office: node.data.name.clone(),
    }
}
