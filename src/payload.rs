use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Graph handed to the engine by the surrounding application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<NodePayload>,

    #[serde(default, alias = "dependencies")]
    pub edges: Vec<EdgePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodePayload {
    #[serde(alias = "name")]
    pub id: String,

    /// Defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub x: f64,
    pub y: f64,

    #[serde(default)]
    pub status: String,
}

impl NodePayload {
    pub fn new(id: impl Into<String>, x: f64, y: f64, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            x,
            y,
            status: status.into(),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// `from` must finish before `to` runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgePayload {
    #[serde(alias = "dependency")]
    pub from: String,

    #[serde(alias = "dependent")]
    pub to: String,

    #[serde(default)]
    pub status: String,
}

impl EdgePayload {
    pub fn new(from: impl Into<String>, to: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            status: status.into(),
        }
    }
}

impl GraphPayload {
    /// Parse a payload from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse graph payload")
    }

    /// Load a payload from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open payload file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse payload from: {}", path.display()))
    }

    /// Small ETL flow used when no payload file is given
    pub fn sample() -> Self {
        Self {
            nodes: vec![
                NodePayload::new("fetch-orders", 80.0, 40.0, "succeeded"),
                NodePayload::new("fetch-customers", 300.0, 40.0, "succeeded"),
                NodePayload::new("join", 190.0, 140.0, "failed"),
                NodePayload::new("aggregate", 190.0, 240.0, "ready"),
                NodePayload::new("publish-report", 80.0, 340.0, "ready"),
                NodePayload::new("notify", 300.0, 340.0, "ready"),
            ],
            edges: vec![
                EdgePayload::new("fetch-orders", "join", "succeeded"),
                EdgePayload::new("fetch-customers", "join", "succeeded"),
                EdgePayload::new("join", "aggregate", "failed"),
                EdgePayload::new("aggregate", "publish-report", "ready"),
                EdgePayload::new("aggregate", "notify", "ready"),
            ],
        }
    }
}
