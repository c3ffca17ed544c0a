//! Distribution service
//!
//! Loads hierarchy description files and runs the profit allocator over them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::application::{ApplicationResult, IoResultExt, ParseResultExt};
use crate::domain::{
    duplicate_names, Allocation, DomainError, HierarchyBuilder, OfficeArena, OfficeSpec,
    ProfitAllocator, VolumeAggregator,
};
use crate::infrastructure::traits::FileSystem;

/// Serialization format of a hierarchy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyFormat {
    Toml,
    Json,
}

impl HierarchyFormat {
    /// `.json` files are JSON, everything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => HierarchyFormat::Json,
            _ => HierarchyFormat::Toml,
        }
    }
}

/// Result of distributing one hierarchy file.
#[derive(Debug, Clone)]
pub struct DistributionOutput {
    /// File the hierarchy was read from
    pub source: PathBuf,
    /// Per-office breakdown in depth-first order
    pub allocation: Allocation,
    /// Credits keyed by office name
    pub shares: BTreeMap<String, Decimal>,
    /// Office names that occur more than once (their entries collide in `shares`)
    pub duplicates: Vec<String>,
}

/// Transaction volume of one office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeReport {
    pub office: String,
    /// Own transactions plus all descendants
    pub total: Decimal,
    /// Descendants only
    pub descendants: Decimal,
}

/// Service for loading hierarchies and distributing commission pools.
pub struct DistributionService {
    fs: Arc<dyn FileSystem>,
    allocator: ProfitAllocator,
}

impl DistributionService {
    /// Create a new distribution service applying `overall_rate` to each grand total.
    pub fn new(fs: Arc<dyn FileSystem>, overall_rate: Decimal) -> Self {
        Self {
            fs,
            allocator: ProfitAllocator::new(overall_rate),
        }
    }

    /// Same service with a different overall rate.
    pub fn with_rate(&self, overall_rate: Decimal) -> Self {
        Self::new(self.fs.clone(), overall_rate)
    }

    pub fn allocator(&self) -> &ProfitAllocator {
        &self.allocator
    }

    /// Parse a hierarchy description.
    ///
    /// `path` is only used for error messages.
    pub fn parse_spec(
        &self,
        content: &str,
        format: HierarchyFormat,
        path: &Path,
    ) -> ApplicationResult<OfficeSpec> {
        match format {
            HierarchyFormat::Toml => toml::from_str(content).with_parse_context(path),
            HierarchyFormat::Json => serde_json::from_str(content).with_parse_context(path),
        }
    }

    /// Read and parse a hierarchy file.
    pub fn load_spec(&self, path: &Path) -> ApplicationResult<OfficeSpec> {
        debug!("load_spec: path={}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read hierarchy", path)?;
        self.parse_spec(&content, HierarchyFormat::from_path(path), path)
    }

    /// Read a hierarchy file and build its arena.
    pub fn load_hierarchy(&self, path: &Path) -> ApplicationResult<OfficeArena> {
        let spec = self.load_spec(path)?;
        Ok(HierarchyBuilder::new().build(&spec))
    }

    /// Distribute the pool of an already built hierarchy.
    pub fn distribute_tree(
        &self,
        tree: &OfficeArena,
        source: &Path,
    ) -> ApplicationResult<DistributionOutput> {
        let duplicates = duplicate_names(tree);
        if !duplicates.is_empty() {
            warn!(
                "{}: duplicate office names collide in the result: {}",
                source.display(),
                duplicates.join(", ")
            );
        }

        let allocation = self.allocator.breakdown(tree)?;
        let shares = allocation.shares();
        debug!(
            "distribute: {} offices, pool={}, credited={}",
            shares.len(),
            allocation.pool,
            allocation.credited_total()
        );

        Ok(DistributionOutput {
            source: source.to_path_buf(),
            allocation,
            shares,
            duplicates,
        })
    }

    /// Load one hierarchy file and distribute its pool.
    pub fn distribute(&self, path: &Path) -> ApplicationResult<DistributionOutput> {
        let tree = self.load_hierarchy(path)?;
        self.distribute_tree(&tree, path)
    }

    /// Distribute several independent hierarchy files in parallel.
    ///
    /// Results are returned in input order, one per file.
    pub fn distribute_many(&self, paths: &[PathBuf]) -> Vec<ApplicationResult<DistributionOutput>> {
        debug!("distribute_many: {} files", paths.len());
        paths.par_iter().map(|path| self.distribute(path)).collect()
    }

    /// Volumes of the root, or of the first office called `office`.
    pub fn volume(&self, path: &Path, office: Option<&str>) -> ApplicationResult<VolumeReport> {
        let tree = self.load_hierarchy(path)?;
        let idx = match office {
            Some(name) => tree
                .find_by_name(name)
                .ok_or_else(|| DomainError::OfficeNotFound(name.to_string()))?,
            None => tree.root().ok_or_else(|| {
                DomainError::InvalidArgument("hierarchy has no root office".to_string())
            })?,
        };
        let name = tree
            .get_node(idx)
            .map(|node| node.data.name.clone())
            .unwrap_or_default();

        let volumes = VolumeAggregator::new(&tree);
        Ok(VolumeReport {
            office: name,
            total: volumes.total_volume(idx)?,
            descendants: volumes.descendant_volume(idx)?,
        })
    }
}
