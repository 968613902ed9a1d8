//! Head-to-genesis traversal over a [`LedgerView`].
use crate::block::{Block, Hash, short_hex};
use crate::ledger::LedgerView;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("branch head {} is not in the ledger", short_hex(.0))]
    UnknownHead(Hash),
    #[error("block {} references missing ancestor {}", short_hex(.block), short_hex(.missing))]
    MissingAncestor { block: Hash, missing: Hash },
    #[error("block {} has no predecessor but is not the genesis", short_hex(.0))]
    RootlessBlock(Hash),
    #[error("walk from {} did not terminate within the ledger size", short_hex(.head))]
    Cycle { head: Hash },
}

/// Blocks from `head` back to genesis, newest first.
pub fn walk<'a, L>(ledger: &'a L, head: &Hash) -> Result<Vec<&'a Block>, WalkError>
where
    L: LedgerView + ?Sized,
{
    walk_until(ledger, head, |_| false)
}

/// Like [`walk`], but stops after the first block for which `stop` returns
/// true. That block is included.
///
/// A missing predecessor ends the walk only at the genesis block; anywhere
/// else it is reported as [`WalkError::MissingAncestor`], or as
/// [`WalkError::RootlessBlock`] when the block names no predecessor at all.
pub fn walk_until<'a, L, F>(
    ledger: &'a L,
    head: &Hash,
    mut stop: F,
) -> Result<Vec<&'a Block>, WalkError>
where
    L: LedgerView + ?Sized,
    F: FnMut(&Block) -> bool,
{
    let limit = ledger.block_count();
    let mut out = Vec::new();
    let mut cur = ledger.lookup(head).ok_or(WalkError::UnknownHead(*head))?;

    loop {
        if out.len() >= limit {
            return Err(WalkError::Cycle { head: *head });
        }
        out.push(cur);
        if stop(cur) {
            break;
        }
        let Some(prev_hash) = cur.predecessor_hash() else {
            if cur.is_genesis() {
                break;
            }
            return Err(WalkError::RootlessBlock(*cur.content_hash()));
        };
        match ledger.lookup(prev_hash) {
            Some(prev) => cur = prev,
            None if cur.is_genesis() => break,
            None => {
                return Err(WalkError::MissingAncestor {
                    block: *cur.content_hash(),
                    missing: *prev_hash,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn chain(len: usize) -> (MemoryLedger, Vec<Block>) {
        let mut blocks = vec![Block::genesis("a", 10)];
        for i in 1..len {
            let next = blocks[i - 1].child("a", 10 + i as u64, Vec::new());
            blocks.push(next);
        }
        let mut ledger = MemoryLedger::new();
        for b in &blocks {
            ledger.link(b.clone()).unwrap();
        }
        (ledger, blocks)
    }

    // Ledger that accepts any blocks; the last one is the only head.
    struct Fixed(Vec<Block>);

    impl LedgerView for Fixed {
        fn lookup(&self, hash: &Hash) -> Option<&Block> {
            self.0.iter().find(|b| b.content_hash() == hash)
        }
        fn branch_heads(&self) -> Vec<Hash> {
            self.0.last().map(|b| *b.content_hash()).into_iter().collect()
        }
        fn local_head(&self) -> Option<Hash> {
            self.branch_heads().first().copied()
        }
        fn block_count(&self) -> usize {
            self.0.len()
        }
    }

    fn ids(walked: &[&Block]) -> Vec<u64> {
        walked.iter().map(|b| b.id()).collect()
    }

    #[test]
    fn walks_head_to_genesis() {
        let (ledger, blocks) = chain(5);
        let walked = walk(&ledger, blocks[4].content_hash()).unwrap();
        assert_eq!(ids(&walked), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn genesis_only_branch_has_one_block() {
        let (ledger, blocks) = chain(1);
        let walked = walk(&ledger, blocks[0].content_hash()).unwrap();
        assert_eq!(ids(&walked), vec![1]);
    }

    #[test]
    fn stop_is_inclusive() {
        let (ledger, blocks) = chain(5);
        let bound = *blocks[2].content_hash();
        let walked = walk_until(&ledger, blocks[4].content_hash(), |b| {
            *b.content_hash() == bound
        })
        .unwrap();
        assert_eq!(ids(&walked), vec![5, 4, 3]);
    }

    #[test]
    fn missing_ancestor_is_reported() {
        let (mut ledger, blocks) = chain(4);
        ledger.prune(blocks[1].content_hash());
        let err = walk(&ledger, blocks[3].content_hash()).unwrap_err();
        assert_eq!(
            err,
            WalkError::MissingAncestor {
                block: *blocks[2].content_hash(),
                missing: *blocks[1].content_hash(),
            }
        );
    }

    #[test]
    fn unknown_head_is_reported() {
        let (ledger, _) = chain(2);
        assert_eq!(
            walk(&ledger, &[3u8; 32]).unwrap_err(),
            WalkError::UnknownHead([3u8; 32])
        );
    }

    #[test]
    fn genesis_with_dangling_predecessor_is_a_boundary() {
        let g = Block::new(1, "a", 10, Some([0u8; 32]), Vec::new());
        let b2 = g.child("a", 11, Vec::new());

        let ledger = Fixed(vec![g, b2.clone()]);
        let walked = walk(&ledger, b2.content_hash()).unwrap();
        assert_eq!(ids(&walked), vec![2, 1]);
    }

    #[test]
    fn root_other_than_genesis_is_reported() {
        let root = Block::new(2, "a", 10, None, Vec::new());
        let b3 = root.child("a", 11, Vec::new());
        let ledger = Fixed(vec![root.clone(), b3.clone()]);
        assert_eq!(
            walk(&ledger, b3.content_hash()).unwrap_err(),
            WalkError::RootlessBlock(*root.content_hash())
        );
    }
}
