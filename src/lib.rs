//! Commission pool distribution across hierarchies of revenue-collecting offices.
//!
//! A hierarchy is an [`OfficeArena`](domain::OfficeArena). The
//! [`ProfitAllocator`](domain::ProfitAllocator) applies an overall rate to the
//! grand total of all transactions, lets every internal office keep its
//! commission share and splits the rest among its children by subtree volume.
//! All amounts are exact decimals rounded half-to-even to two places.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
