// Read-only ledger view consumed by the graph core, plus an in-memory ledger.
use crate::block::{Block, Hash, short_hex};
use std::collections::HashMap;
use thiserror::Error;

/// Block store adapter. Implementations must not change while borrowed for a
/// render pass; hosts with concurrent writers hold a read guard for the pass.
pub trait LedgerView {
    /// Block with this content hash, if present.
    fn lookup(&self, hash: &Hash) -> Option<&Block>;

    /// Hashes of blocks without a known successor, in ledger order.
    fn branch_heads(&self) -> Vec<Hash>;

    /// Head owned by the rendering node. `None` only for an empty ledger.
    fn local_head(&self) -> Option<Hash>;

    fn block_count(&self) -> usize;
}

impl<T: LedgerView + ?Sized> LedgerView for &T {
    fn lookup(&self, hash: &Hash) -> Option<&Block> {
        (**self).lookup(hash)
    }

    fn branch_heads(&self) -> Vec<Hash> {
        (**self).branch_heads()
    }

    fn local_head(&self) -> Option<Hash> {
        (**self).local_head()
    }

    fn block_count(&self) -> usize {
        (**self).block_count()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("block {} already present", short_hex(.0))]
    Duplicate(Hash),
    #[error("a genesis block is already present")]
    MultipleGenesis,
    #[error("block {} has no predecessor but id {id}", short_hex(.block))]
    RootNotGenesis { block: Hash, id: u64 },
    #[error("parent {} of block {} is unknown", short_hex(.parent), short_hex(.block))]
    MissingParent { block: Hash, parent: Hash },
    #[error("block {} is not in the ledger", short_hex(.0))]
    UnknownBlock(Hash),
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    blocks: HashMap<Hash, Block>,
    heads: Vec<Hash>,
    genesis: Option<Hash>,
    local_head: Option<Hash>,
    pinned: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding only `genesis`.
    pub fn with_genesis(genesis: Block) -> Result<Self, LinkError> {
        let mut ledger = Self::new();
        ledger.link(genesis)?;
        Ok(ledger)
    }

    /// Add a block whose parent is already present (or which is the genesis).
    /// The parent stops being a head; the new block is appended to the heads.
    pub fn link(&mut self, block: Block) -> Result<Hash, LinkError> {
        let hash = *block.content_hash();
        if self.blocks.contains_key(&hash) {
            return Err(LinkError::Duplicate(hash));
        }
        match block.predecessor_hash() {
            None => {
                if !block.is_genesis() {
                    return Err(LinkError::RootNotGenesis {
                        block: hash,
                        id: block.id(),
                    });
                }
                if self.genesis.is_some() {
                    return Err(LinkError::MultipleGenesis);
                }
                self.genesis = Some(hash);
            }
            Some(parent) => {
                if !self.blocks.contains_key(parent) {
                    return Err(LinkError::MissingParent {
                        block: hash,
                        parent: *parent,
                    });
                }
                let parent = *parent;
                self.heads.retain(|h| *h != parent);
            }
        }

        self.heads.push(hash);
        if !self.pinned && self.extends_longest(&block) {
            self.local_head = Some(hash);
        }
        self.blocks.insert(hash, block);
        Ok(hash)
    }

    fn extends_longest(&self, block: &Block) -> bool {
        match self.local_head.and_then(|h| self.blocks.get(&h)) {
            None => true,
            Some(current) => block.id() > current.id(),
        }
    }

    /// Pin the local head. Without a pin it follows the longest chain,
    /// first seen winning ties.
    pub fn set_local_head(&mut self, hash: Hash) -> Result<(), LinkError> {
        if !self.blocks.contains_key(&hash) {
            return Err(LinkError::UnknownBlock(hash));
        }
        self.local_head = Some(hash);
        self.pinned = true;
        Ok(())
    }

    /// Drop a block without relinking its children, as premature pruning would.
    /// A parent left without any known successor becomes a head again.
    pub fn prune(&mut self, hash: &Hash) -> Option<Block> {
        let removed = self.blocks.remove(hash)?;
        self.heads.retain(|h| h != hash);
        if let Some(parent) = removed.predecessor_hash()
            && self.blocks.contains_key(parent)
            && !self.heads.contains(parent)
            && !self.blocks.values().any(|b| b.predecessor_hash() == Some(parent))
        {
            self.heads.push(*parent);
        }
        if self.genesis.as_ref() == Some(hash) {
            self.genesis = None;
        }
        if self.local_head.as_ref() == Some(hash) {
            self.local_head = removed.predecessor_hash().copied();
        }
        Some(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl LedgerView for MemoryLedger {
    fn lookup(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    fn branch_heads(&self) -> Vec<Hash> {
        self.heads.clone()
    }

    fn local_head(&self) -> Option<Hash> {
        self.local_head
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_tracks_heads_in_order() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        assert_eq!(ledger.branch_heads(), vec![*g.content_hash()]);

        let b1 = g.child("a", 2, Vec::new());
        let b2 = g.child("b", 3, Vec::new());
        ledger.link(b1.clone()).unwrap();
        ledger.link(b2.clone()).unwrap();
        assert_eq!(
            ledger.branch_heads(),
            vec![*b1.content_hash(), *b2.content_hash()]
        );
        assert_eq!(ledger.block_count(), 3);
        assert_eq!(ledger.local_head(), Some(*b1.content_hash()));
    }

    #[test]
    fn local_head_follows_longest_unless_pinned() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        let a1 = g.child("a", 2, Vec::new());
        let b1 = g.child("b", 2, Vec::new());
        let b2 = b1.child("b", 3, Vec::new());
        ledger.link(a1.clone()).unwrap();
        ledger.link(b1).unwrap();
        ledger.link(b2.clone()).unwrap();
        assert_eq!(ledger.local_head(), Some(*b2.content_hash()));

        ledger.set_local_head(*a1.content_hash()).unwrap();
        let b3 = b2.child("b", 4, Vec::new());
        ledger.link(b3).unwrap();
        assert_eq!(ledger.local_head(), Some(*a1.content_hash()));
    }

    #[test]
    fn link_rejects_bad_blocks() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        assert_eq!(
            ledger.link(g.clone()),
            Err(LinkError::Duplicate(*g.content_hash()))
        );
        assert_eq!(
            ledger.link(Block::genesis("b", 1)),
            Err(LinkError::MultipleGenesis)
        );
        let root = Block::new(2, "a", 5, None, Vec::new());
        assert_eq!(
            MemoryLedger::new().link(root.clone()),
            Err(LinkError::RootNotGenesis {
                block: *root.content_hash(),
                id: 2,
            })
        );
        let orphan = Block::new(3, "a", 5, Some([9u8; 32]), Vec::new());
        assert!(matches!(
            ledger.link(orphan),
            Err(LinkError::MissingParent { parent, .. }) if parent == [9u8; 32]
        ));
        assert_eq!(
            ledger.set_local_head([7u8; 32]),
            Err(LinkError::UnknownBlock([7u8; 32]))
        );
    }

    #[test]
    fn prune_removes_block_but_keeps_children() {
        let g = Block::genesis("a", 1);
        let b1 = g.child("a", 2, Vec::new());
        let b2 = b1.child("a", 3, Vec::new());
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        ledger.link(b1.clone()).unwrap();
        ledger.link(b2.clone()).unwrap();

        assert!(ledger.prune(b1.content_hash()).is_some());
        assert!(ledger.lookup(b1.content_hash()).is_none());
        assert!(ledger.lookup(b2.content_hash()).is_some());
        // genesis lost its only known successor
        assert_eq!(
            ledger.branch_heads(),
            vec![*b2.content_hash(), *g.content_hash()]
        );
        assert!(ledger.prune(b1.content_hash()).is_none());
    }

    #[test]
    fn pruned_head_hands_head_to_parent() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        let a1 = g.child("a", 2, Vec::new());
        let a2 = a1.child("a", 3, Vec::new());
        let b1 = g.child("b", 2, Vec::new());
        let b2 = b1.child("b", 3, Vec::new());
        for b in [&a1, &a2, &b1, &b2] {
            ledger.link(b.clone()).unwrap();
        }

        ledger.prune(b2.content_hash());
        assert_eq!(
            ledger.branch_heads(),
            vec![*a2.content_hash(), *b1.content_hash()]
        );

        // b1 is gone too; g still has a1, so it stays off the head list
        ledger.prune(b1.content_hash());
        assert_eq!(ledger.branch_heads(), vec![*a2.content_hash()]);
    }
}
