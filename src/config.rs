use crate::timeline::DEFAULT_NAME_FORMAT;

/// Presentation settings for a plotting session. The graph core itself has
/// no knobs: labels, clamping and ordering are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "export", serde(default))]
pub struct PlotConfig {
    /// strftime pattern for snapshot names.
    pub snapshot_name_format: String,
    pub slider_prefix: String,
    /// Per-frame duration when stepping through the slider.
    pub step_duration_ms: u64,
    /// Per-frame duration while playing.
    pub play_frame_duration_ms: u64,
    pub transition_duration_ms: u64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            snapshot_name_format: DEFAULT_NAME_FORMAT.to_string(),
            slider_prefix: "Block insertion at ".to_string(),
            step_duration_ms: 200,
            play_frame_duration_ms: 50,
            transition_duration_ms: 200,
        }
    }
}
