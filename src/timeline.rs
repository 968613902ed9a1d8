//! Append-only history of render passes, one snapshot per pass.
use crate::graph::{BranchFault, Graph, RenderEdge, RenderNode, x_range};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{info, warn};

pub const DEFAULT_NAME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Snapshot {
    pub name: String,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    #[cfg_attr(feature = "export", serde(skip_serializing_if = "Vec::is_empty"))]
    pub faults: Vec<BranchFault>,
}

#[derive(Debug)]
pub struct Timeline {
    snapshots: Vec<Snapshot>,
    name_format: String,
    name_uses: HashMap<String, usize>,
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::with_format(DEFAULT_NAME_FORMAT)
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name_format` is a `chrono` strftime pattern for snapshot names.
    pub fn with_format(name_format: impl Into<String>) -> Self {
        Timeline {
            snapshots: Vec::new(),
            name_format: name_format.into(),
            name_uses: HashMap::new(),
        }
    }

    /// Append `graph`, named after the local wall clock.
    pub fn record(&mut self, graph: Graph) -> &Snapshot {
        self.record_at(graph, Local::now().naive_local())
    }

    /// Append `graph`, named after `at`. A name already used in this
    /// timeline gets a ` #n` suffix, n counting uses of that name.
    pub fn record_at(&mut self, graph: Graph, at: NaiveDateTime) -> &Snapshot {
        let mut base = String::new();
        if write!(base, "{}", at.format(&self.name_format)).is_err() {
            warn!(format = %self.name_format, "bad snapshot name format, using default");
            base = at.format(DEFAULT_NAME_FORMAT).to_string();
        }
        let uses = self.name_uses.entry(base.clone()).or_insert(0);
        *uses += 1;
        let name = match *uses {
            1 => base,
            n => format!("{} #{}", base, n),
        };

        info!(
            snapshot = %name,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            faults = graph.faults.len(),
            "recorded snapshot"
        );
        self.snapshots.push(Snapshot {
            name,
            nodes: graph.nodes,
            edges: graph.edges,
            faults: graph.faults,
        });
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Axis bounds over the most recent snapshot's nodes.
    pub fn current_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        x_range(&self.latest()?.nodes)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
