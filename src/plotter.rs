//! Plotting session: turns ledger-change events into timeline snapshots.
use crate::block::Block;
use crate::config::PlotConfig;
use crate::detail::BlockDetail;
use crate::error::Result;
use crate::graph::GraphBuilder;
use crate::ledger::LedgerView;
use crate::timeline::{Snapshot, Timeline};
use chrono::{Local, NaiveDateTime};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Owns the timeline for the life of the session. Passes may run from
/// several threads; only the append is serialized.
#[derive(Debug)]
pub struct Plotter {
    node_id: String,
    config: PlotConfig,
    timeline: Mutex<Timeline>,
}

impl Plotter {
    pub fn new(node_id: impl Into<String>, config: PlotConfig) -> Self {
        let timeline = Timeline::with_format(config.snapshot_name_format.clone());
        Plotter {
            node_id: node_id.into(),
            config,
            timeline: Mutex::new(timeline),
        }
    }

    /// Render the ledger and append a snapshot named after the local clock.
    /// Returns `None` while the ledger holds nothing beyond genesis.
    ///
    /// The clock is read under the timeline lock, so names of concurrent
    /// passes follow append order.
    pub fn on_ledger_event<L>(&self, ledger: &L) -> Result<Option<Snapshot>>
    where
        L: LedgerView + ?Sized,
    {
        self.plot(ledger, || Local::now().naive_local())
    }

    /// Like [`Plotter::on_ledger_event`] with a caller-supplied name time.
    /// Snapshots keep append order whatever `at` says.
    pub fn on_ledger_event_at<L>(&self, ledger: &L, at: NaiveDateTime) -> Result<Option<Snapshot>>
    where
        L: LedgerView + ?Sized,
    {
        self.plot(ledger, || at)
    }

    fn plot<L, F>(&self, ledger: &L, now: F) -> Result<Option<Snapshot>>
    where
        L: LedgerView + ?Sized,
        F: FnOnce() -> NaiveDateTime,
    {
        if ledger.block_count() <= 1 {
            debug!(blocks = ledger.block_count(), "nothing beyond genesis, not plotting");
            return Ok(None);
        }
        let graph = GraphBuilder::new(ledger).build()?;
        let mut timeline = self.lock();
        let at = now();
        Ok(Some(timeline.record_at(graph, at).clone()))
    }

    pub fn block_detail(&self, block: &Block) -> BlockDetail {
        BlockDetail::from_block(block)
    }

    pub fn with_timeline<R>(&self, f: impl FnOnce(&Timeline) -> R) -> R {
        f(&self.lock())
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    // Appends never leave the timeline half-written, so a poisoned lock is
    // still safe to read.
    fn lock(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::thread;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, s)
            .unwrap()
    }

    #[test]
    fn genesis_only_is_a_no_op() {
        let ledger = MemoryLedger::with_genesis(Block::genesis("a", 1)).unwrap();
        let plotter = Plotter::new("a", PlotConfig::default());
        assert!(plotter.on_ledger_event(&ledger).unwrap().is_none());
        assert!(plotter.with_timeline(|t| t.is_empty()));
    }

    #[test]
    fn repeated_events_repeat_content_not_names() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        ledger.link(g.child("a", 100_000, Vec::new())).unwrap();
        let plotter = Plotter::new("a", PlotConfig::default());

        let first = plotter.on_ledger_event_at(&ledger, at(5)).unwrap().unwrap();
        let second = plotter.on_ledger_event_at(&ledger, at(6)).unwrap().unwrap();
        assert_ne!(first.name, second.name);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
        assert_eq!(plotter.with_timeline(|t| t.len()), 2);
    }

    #[test]
    fn clock_names_follow_append_order() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        ledger.link(g.child("a", 100_000, Vec::new())).unwrap();
        let ledger = Arc::new(ledger);
        let config = PlotConfig {
            snapshot_name_format: "%Y-%m-%d %H:%M:%S%.9f".into(),
            ..PlotConfig::default()
        };
        let plotter = Arc::new(Plotter::new("a", config));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let plotter = Arc::clone(&plotter);
                thread::spawn(move || {
                    plotter.on_ledger_event(&*ledger).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        plotter.with_timeline(|t| {
            let names: Vec<_> = t.snapshots().iter().map(|s| s.name.clone()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        });
    }

    #[test]
    fn concurrent_passes_each_append_once() {
        let g = Block::genesis("a", 1);
        let mut ledger = MemoryLedger::with_genesis(g.clone()).unwrap();
        ledger.link(g.child("a", 100_000, Vec::new())).unwrap();
        let ledger = Arc::new(ledger);
        let plotter = Arc::new(Plotter::new("a", PlotConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let plotter = Arc::clone(&plotter);
                thread::spawn(move || {
                    plotter.on_ledger_event_at(&*ledger, at(7)).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        plotter.with_timeline(|t| {
            assert_eq!(t.len(), 8);
            let mut names: Vec<_> = t.snapshots().iter().map(|s| s.name.clone()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 8);
        });
    }
}
