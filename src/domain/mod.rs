//! Domain layer: office hierarchy and commission distribution
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod allocator;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod volume;

pub use allocator::{
    round2, Allocation, AllocationLine, ProfitAllocator, AMOUNT_SCALE, DEFAULT_OVERALL_RATE,
};
pub use arena::{OfficeArena, OfficeData, OfficeNode};
pub use builder::{duplicate_names, HierarchyBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use volume::VolumeAggregator;
