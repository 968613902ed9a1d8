//! Ledger dumps: JSON documents listing blocks in insertion order.
use crate::block::{Block, Hash, Transaction};
use crate::error::PlotError;
use crate::ledger::{LedgerView, LinkError, MemoryLedger};
use crate::plotter::Plotter;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: bad {field} hex")]
    BadHex { row: usize, field: &'static str },
    #[error("row {row}: declared hash does not match block contents")]
    HashMismatch { row: usize },
    #[error("row {row}: {source}")]
    Link { row: usize, source: LinkError },
    #[error("local head {0} is not a block of the dump")]
    UnknownLocalHead(String),
    #[error(transparent)]
    Plot(#[from] PlotError),
}

#[derive(Debug, Deserialize)]
pub struct DumpHeader {
    pub node_id: String,
    /// Pinned local head; the ledger's own rule applies when absent.
    #[serde(default)]
    pub local_head: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockRow {
    pub id: u64,
    pub creator_id: String,
    pub timestamp: u64,
    #[serde(default)]
    pub predecessor_hash: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Checked against the recomputed content hash when present.
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerDump {
    pub header: DumpHeader,
    pub blocks: Vec<BlockRow>,
}

impl LedgerDump {
    pub fn from_path(path: &Path) -> Result<Self, DumpError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Rebuild every row into a block, verifying declared hashes.
    pub fn blocks(&self) -> Result<Vec<Block>, DumpError> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.blocks
                .par_iter()
                .enumerate()
                .map(|(row, r)| parse_row(row, r))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.blocks
                .iter()
                .enumerate()
                .map(|(row, r)| parse_row(row, r))
                .collect()
        }
    }

    /// Ledger holding every block of the dump.
    pub fn load(&self) -> Result<MemoryLedger, DumpError> {
        self.replay(|_| Ok(()))
    }

    /// Link blocks one at a time, invoking the plotter after each link the
    /// way a node would on every ledger change.
    pub fn replay_into(&self, plotter: &Plotter) -> Result<MemoryLedger, DumpError> {
        self.replay(|ledger| {
            plotter.on_ledger_event(ledger)?;
            Ok(())
        })
    }

    fn replay<F>(&self, mut on_link: F) -> Result<MemoryLedger, DumpError>
    where
        F: FnMut(&MemoryLedger) -> Result<(), DumpError>,
    {
        let local = match &self.header.local_head {
            Some(text) => Some(
                hex32(text).ok_or_else(|| DumpError::UnknownLocalHead(text.clone()))?,
            ),
            None => None,
        };

        let mut ledger = MemoryLedger::new();
        let mut pinned = false;
        for (row, block) in self.blocks()?.into_iter().enumerate() {
            let hash = ledger
                .link(block)
                .map_err(|source| DumpError::Link { row, source })?;
            if local == Some(hash) {
                ledger
                    .set_local_head(hash)
                    .map_err(|source| DumpError::Link { row, source })?;
                pinned = true;
            }
            debug!(row, blocks = ledger.block_count(), "linked dump row");
            on_link(&ledger)?;
        }

        if let Some(text) = &self.header.local_head
            && !pinned
        {
            return Err(DumpError::UnknownLocalHead(text.clone()));
        }
        Ok(ledger)
    }
}

fn hex32(s: &str) -> Option<Hash> {
    hex::decode(s).ok()?.try_into().ok()
}

fn parse_row(row: usize, r: &BlockRow) -> Result<Block, DumpError> {
    let predecessor = match &r.predecessor_hash {
        Some(text) => Some(hex32(text).ok_or(DumpError::BadHex {
            row,
            field: "predecessor_hash",
        })?),
        None => None,
    };
    let block = Block::new(
        r.id,
        r.creator_id.clone(),
        r.timestamp,
        predecessor,
        r.transactions.clone(),
    );
    if let Some(text) = &r.hash {
        let declared = hex32(text).ok_or(DumpError::BadHex { row, field: "hash" })?;
        if declared != *block.content_hash() {
            return Err(DumpError::HashMismatch { row });
        }
    }
    Ok(block)
}
