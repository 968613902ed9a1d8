//! Display names for branches and the order they are rendered in.
use crate::block::Hash;
use std::fmt;

pub const LOCAL_BRANCH_NAME: &str = "My Branch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BranchLabel {
    /// Branch ending at the rendering node's own head.
    Local,
    /// Any other head, numbered from 1.
    Numbered(usize),
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchLabel::Local => f.write_str(LOCAL_BRANCH_NAME),
            BranchLabel::Numbered(k) => write!(f, "Branch #{}", k),
        }
    }
}

#[cfg(feature = "export")]
impl serde::Serialize for BranchLabel {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[cfg(feature = "export")]
pub(crate) fn serialize_display<T, S>(value: &T, s: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: serde::Serializer,
{
    s.collect_str(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub label: BranchLabel,
    pub head: Hash,
}

/// Render order for one pass: the local branch first, then every other head
/// in `heads` order. Repeated heads keep their first label, so a number is
/// never given to two hashes.
pub fn plan_branches(heads: &[Hash], local: &Hash) -> Vec<Branch> {
    let mut plan = vec![Branch {
        label: BranchLabel::Local,
        head: *local,
    }];
    let mut next = 1;
    for head in heads {
        if plan.iter().any(|b| b.head == *head) {
            continue;
        }
        plan.push(Branch {
            label: BranchLabel::Numbered(next),
            head: *head,
        });
        next += 1;
    }
    plan
}
