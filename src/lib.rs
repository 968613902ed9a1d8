//! Branch-aware rendering of a forking, hash-linked ledger.
//!
//! Each ledger change produces one [`Snapshot`](timeline::Snapshot): every
//! branch head is walked back toward genesis, blocks shared between branches
//! are drawn once under the branch that reached them first (the local branch
//! always goes first), and the snapshot is appended to a
//! [`Timeline`](timeline::Timeline) that drives a frame-by-frame animation.
pub mod block;
pub mod claims;
pub mod config;
pub mod detail;
pub mod error;
pub mod graph;
pub mod label;
pub mod ledger;
pub mod plotter;
pub mod timeline;
pub mod walker;

#[cfg(feature = "export")]
pub mod dump;
#[cfg(feature = "export")]
pub mod export;

pub use block::{Block, GENESIS_ID, Hash, Transaction};
pub use config::PlotConfig;
pub use error::{PlotError, Result};
pub use graph::{Graph, GraphBuilder, RenderEdge, RenderNode};
pub use label::BranchLabel;
pub use ledger::{LedgerView, MemoryLedger};
pub use plotter::Plotter;
pub use timeline::{Snapshot, Timeline};
