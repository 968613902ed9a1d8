//! One render pass: every branch head walked, shared history drawn once.
//!
//! The local branch is walked first, so it owns every block it shares with
//! other branches. A later branch stops at the first block that is already
//! claimed, and its last edge is drawn from that block under the owner's
//! label; that edge is the fork point.
use crate::block::{Block, Hash, short_hex};
use crate::claims::{ClaimError, ClaimMap};
use crate::error::{PlotError, Result};
use crate::label::{BranchLabel, plan_branches};
use crate::ledger::LedgerView;
use crate::walker::{WalkError, walk_until};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Timestamps below one day of epoch time are raised to this value.
pub const DAY_SECONDS: u64 = 86_400;

/// Time coordinate of a block. Clamps, never fails.
pub fn normalize_timestamp(timestamp: u64) -> DateTime<Utc> {
    let secs = i64::try_from(timestamp.max(DAY_SECONDS)).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Point {
    pub x: DateTime<Utc>,
    pub y: BranchLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct RenderNode {
    #[cfg_attr(feature = "export", serde(with = "crate::block::serde_hash"))]
    pub hash: Hash,
    pub display_id: u64,
    pub x: DateTime<Utc>,
    pub y: BranchLabel,
}

/// Edge from a block's predecessor to the block. `from.y` is the label of
/// the branch owning the predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct RenderEdge {
    #[cfg_attr(feature = "export", serde(with = "crate::block::serde_hash"))]
    pub from_hash: Hash,
    #[cfg_attr(feature = "export", serde(with = "crate::block::serde_hash"))]
    pub to_hash: Hash,
    pub from: Point,
    pub to: Point,
}

/// A branch left out of the pass because its walk failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct BranchFault {
    pub label: BranchLabel,
    #[cfg_attr(feature = "export", serde(with = "crate::block::serde_hash"))]
    pub head: Hash,
    #[cfg_attr(feature = "export", serde(serialize_with = "crate::label::serialize_display"))]
    pub error: WalkError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub faults: Vec<BranchFault>,
}

impl Graph {
    pub fn node(&self, hash: &Hash) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.hash == *hash)
    }
}

/// Earliest and latest time coordinate among `nodes`.
pub fn x_range(nodes: &[RenderNode]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let min = nodes.iter().map(|n| n.x).min()?;
    let max = nodes.iter().map(|n| n.x).max()?;
    Some((min, max))
}

pub struct GraphBuilder<'a, L: ?Sized> {
    ledger: &'a L,
}

impl<'a, L> GraphBuilder<'a, L>
where
    L: LedgerView + ?Sized,
{
    pub fn new(ledger: &'a L) -> Self {
        GraphBuilder { ledger }
    }

    /// Walks every branch head once. A failed walk drops that branch and is
    /// recorded in [`Graph::faults`]; a claim conflict aborts the pass.
    pub fn build(&self) -> Result<Graph> {
        let local = self.ledger.local_head().ok_or(PlotError::NoLocalHead)?;
        let heads = self.ledger.branch_heads();
        let mut pass = Pass::default();

        for branch in plan_branches(&heads, &local) {
            let walked = walk_until(self.ledger, &branch.head, |b| {
                pass.claims.is_claimed(b.content_hash())
            });
            match walked {
                Ok(blocks) => {
                    debug!(
                        branch = %branch.label,
                        head = %short_hex(&branch.head),
                        walked = blocks.len(),
                        "rendering branch"
                    );
                    pass.render_branch(branch.label, &blocks)?;
                }
                Err(error) => {
                    warn!(branch = %branch.label, %error, "skipping branch");
                    pass.faults.push(BranchFault {
                        label: branch.label,
                        head: branch.head,
                        error,
                    });
                }
            }
        }

        Ok(Graph {
            nodes: pass.nodes,
            edges: pass.edges,
            faults: pass.faults,
        })
    }
}

#[derive(Default)]
struct Pass {
    claims: ClaimMap,
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    faults: Vec<BranchFault>,
}

impl Pass {
    fn render_branch(
        &mut self,
        label: BranchLabel,
        blocks: &[&Block],
    ) -> std::result::Result<(), ClaimError> {
        for (block, previous) in pairwise(blocks) {
            let hash = block.content_hash();
            if self.claims.is_claimed(hash) {
                break;
            }
            self.claims.claim(hash, label)?;
            let to = Point {
                x: normalize_timestamp(block.timestamp()),
                y: label,
            };
            self.push_node(block, &to);

            let Some(previous) = previous else {
                continue;
            };
            let prev_hash = previous.content_hash();
            let from = Point {
                x: normalize_timestamp(previous.timestamp()),
                y: self.claims.owner(prev_hash).unwrap_or(label),
            };
            self.edges.push(RenderEdge {
                from_hash: *prev_hash,
                to_hash: *hash,
                from: from.clone(),
                to,
            });

            // Genesis is only ever the older half of a pair.
            if previous.is_genesis() && !self.claims.is_claimed(prev_hash) {
                self.claims.claim(prev_hash, label)?;
                self.push_node(previous, &from);
            }
        }
        Ok(())
    }

    fn push_node(&mut self, block: &Block, at: &Point) {
        self.nodes.push(RenderNode {
            hash: *block.content_hash(),
            display_id: block.id(),
            x: at.x,
            y: at.y,
        });
    }
}

/// `[b0, b1, b2]` -> `(b0, b1), (b1, b2)`; a single block pairs with nothing.
fn pairwise<'b>(blocks: &[&'b Block]) -> Vec<(&'b Block, Option<&'b Block>)> {
    match blocks {
        [] => Vec::new(),
        [only] => vec![(*only, None)],
        _ => blocks.windows(2).map(|w| (w[0], Some(w[1]))).collect(),
    }
}
