use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scene event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl SceneEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Changes the surrounding application may want to forward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    NodeAdded {
        id: String,
        status: String,
    },

    EdgeAdded {
        from: String,
        to: String,
    },

    SelectionChanged {
        old_id: Option<String>,
        new_id: Option<String>,
    },

    EnabledChanged {
        ids: Vec<String>,
        enabled: bool,
    },

    StatusChanged {
        ids: Vec<String>,
        status: String,
    },
}
