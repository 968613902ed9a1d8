//! Per-pass ownership of block hashes.
use crate::block::{Hash, short_hex};
use crate::label::BranchLabel;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("block {} owned by {owner} was claimed again by {claimant}", short_hex(.hash))]
    Conflict {
        hash: Hash,
        owner: BranchLabel,
        claimant: BranchLabel,
    },
}

/// Which branch first rendered each block. Build one per render pass and
/// drop it afterwards; it is never shared between passes.
#[derive(Debug, Default)]
pub struct ClaimMap {
    owners: HashMap<Hash, BranchLabel>,
}

impl ClaimMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, hash: &Hash) -> Option<BranchLabel> {
        self.owners.get(hash).copied()
    }

    pub fn is_claimed(&self, hash: &Hash) -> bool {
        self.owners.contains_key(hash)
    }

    /// Repeating a claim for the same branch is a no-op. A claim by another
    /// branch breaks single ownership and is returned as an error.
    pub fn claim(&mut self, hash: &Hash, label: BranchLabel) -> Result<(), ClaimError> {
        match self.owners.get(hash) {
            Some(owner) if *owner != label => Err(ClaimError::Conflict {
                hash: *hash,
                owner: *owner,
                claimant: label,
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(*hash, label);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
