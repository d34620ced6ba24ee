use crate::style::ColorPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Complete engine configuration. Every field has a default, so a config
/// file only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub zoom: ZoomPolicy,
    pub slider: SliderConfig,
    pub metrics: NodeMetrics,
    pub style: ColorPolicy,

    /// Statuses that mark a node disabled at load time
    pub terminal_statuses: Vec<String>,

    /// Whether selected nodes can be dragged right after startup
    pub edit_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomPolicy::default(),
            slider: SliderConfig::default(),
            metrics: NodeMetrics::default(),
            style: ColorPolicy::default(),
            terminal_statuses: vec![
                "succeeded".to_string(),
                "completed".to_string(),
                "disabled".to_string(),
            ],
            edit_mode: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config from: {}", path.display()))
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal_statuses.iter().any(|s| s == status)
    }
}

/// Zoom bounds and fit parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomPolicy {
    /// Relative zooms are refused beyond these
    pub min_zoom: f64,
    pub max_zoom: f64,

    /// Clamp for the scale chosen by reset-to-fit
    pub min_scale_on_reset: f64,
    pub max_scale_on_reset: f64,

    /// Fraction of the viewport height the graph occupies after a fit
    pub fit_ratio: f64,

    /// Screen distance from the viewport top to the graph top after a fit
    pub top_margin: f64,

    /// Per-notch wheel factors
    pub wheel_in_factor: f64,
    pub wheel_out_factor: f64,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 10.0,
            min_scale_on_reset: 0.6,
            max_scale_on_reset: 2.0,
            fit_ratio: 0.8,
            top_margin: 30.0,
            wheel_in_factor: 1.05,
            wheel_out_factor: 0.95,
        }
    }
}

/// Zoom slider geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SliderConfig {
    /// Track length in slider units
    pub track_length: f64,

    /// Distance moved by one zoom button click
    pub click_step: f64,

    /// Substituted for a zero percentage so the scale never collapses
    pub min_percent: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            track_length: 200.0,
            click_step: 10.0,
            min_percent: 0.0001,
        }
    }
}

/// Node footprint sizing derived from labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeMetrics {
    /// Estimated advance of one label character
    pub char_width: f64,
    pub horizontal_padding: f64,
    pub node_height: f64,

    /// Added to both dimensions of the box edges are clipped against
    pub border: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            char_width: 6.0,
            horizontal_padding: 20.0,
            node_height: 30.0,
            border: 3.0,
        }
    }
}
