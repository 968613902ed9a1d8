//! Renderer-facing figure model and JSON writers.
//!
//! The model mirrors what a charting front-end needs for an animated figure:
//! one frame per snapshot, a slider step per frame and a fixed x axis taken
//! from the latest snapshot.
use crate::config::PlotConfig;
use crate::detail::BlockDetail;
use crate::error::Result;
use crate::timeline::{Snapshot, Timeline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Animation<'t> {
    pub title: String,
    /// Fixed for the whole animation.
    pub x_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub frames: &'t [Snapshot],
    pub slider: Slider,
    pub buttons: [Button; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub prefix: String,
    pub steps: Vec<SliderStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderStep {
    /// Frame name; doubles as the step label.
    pub label: String,
    pub frame_duration_ms: u64,
    pub transition_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    pub label: &'static str,
    pub frame_duration_ms: u64,
    pub from_current: bool,
}

impl<'t> Animation<'t> {
    pub fn from_timeline(timeline: &'t Timeline, node_id: &str, config: &PlotConfig) -> Self {
        let latest = timeline.latest().map(|s| s.name.as_str()).unwrap_or("-");
        let steps = timeline
            .snapshots()
            .iter()
            .map(|s| SliderStep {
                label: s.name.clone(),
                frame_duration_ms: config.step_duration_ms,
                transition_duration_ms: config.transition_duration_ms,
            })
            .collect();

        Animation {
            title: format!(
                "Animated Blockchain state at {} from node {}",
                latest, node_id
            ),
            x_range: timeline.current_range(),
            frames: timeline.snapshots(),
            slider: Slider {
                prefix: config.slider_prefix.clone(),
                steps,
            },
            buttons: [
                Button {
                    label: "Play",
                    frame_duration_ms: config.play_frame_duration_ms,
                    from_current: true,
                },
                Button {
                    label: "Pause",
                    frame_duration_ms: 0,
                    from_current: false,
                },
            ],
        }
    }
}

pub fn write_animation<W: Write>(animation: &Animation<'_>, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, animation)?;
    Ok(())
}

pub fn write_block_detail<W: Write>(detail: &BlockDetail, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, detail)?;
    Ok(())
}
