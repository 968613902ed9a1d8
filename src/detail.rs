// Per-block record handed to the detail page renderer.
use crate::block::{Block, Hash, Transaction, hash_to_hex};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct BlockDetail {
    #[cfg_attr(feature = "export", serde(with = "crate::block::serde_hash"))]
    pub block_hash: Hash,
    pub block_id: u64,
    pub block_creator_id: String,
    pub timestamp: u64,
    #[cfg_attr(feature = "export", serde(serialize_with = "crate::block::serde_hash::option::serialize"))]
    pub predecessor_hash: Option<Hash>,
    /// `None` rather than an empty list when the block carries no transactions.
    pub transactions: Option<Vec<Transaction>>,
}

impl BlockDetail {
    pub fn from_block(block: &Block) -> Self {
        let transactions = match block.transactions() {
            [] => None,
            txs => Some(txs.to_vec()),
        };
        BlockDetail {
            block_hash: *block.content_hash(),
            block_id: block.id(),
            block_creator_id: block.creator_id().to_string(),
            timestamp: block.timestamp(),
            predecessor_hash: block.predecessor_hash().copied(),
            transactions,
        }
    }

    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.block_hash)
    }
}
