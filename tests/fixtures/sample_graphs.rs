// Helper functions to build test graphs with various shapes

use flow_canvas::{DiagramEngine, EdgePayload, EngineConfig, GraphPayload, NodePayload};

/// Five nodes in a diamond plus a straggler; `extract` and `clean` succeeded
pub fn five_node_flow() -> GraphPayload {
    GraphPayload {
        nodes: vec![
            NodePayload::new("extract", 0.0, 0.0, "succeeded"),
            NodePayload::new("validate", -80.0, 100.0, "failed"),
            NodePayload::new("clean", 80.0, 100.0, "succeeded"),
            NodePayload::new("load", 0.0, 200.0, "ready"),
            NodePayload::new("report", 200.0, 200.0, "ready"),
        ],
        edges: vec![
            EdgePayload::new("extract", "validate", "succeeded"),
            EdgePayload::new("extract", "clean", "succeeded"),
            EdgePayload::new("validate", "load", "failed"),
            EdgePayload::new("clean", "load", "succeeded"),
        ],
    }
}

/// One node and nothing else
pub fn single_node(x: f64, y: f64) -> GraphPayload {
    GraphPayload {
        nodes: vec![NodePayload::new("only", x, y, "ready")],
        edges: vec![],
    }
}

/// Two nodes joined by one edge
pub fn two_node_edge() -> GraphPayload {
    GraphPayload {
        nodes: vec![
            NodePayload::new("a", 0.0, 0.0, "ready"),
            NodePayload::new("b", 240.0, 60.0, "ready"),
        ],
        edges: vec![EdgePayload::new("a", "b", "ready")],
    }
}

/// Engine loaded with `payload` and fitted to an 800 x 600 viewport
pub fn fitted_engine(payload: &GraphPayload) -> DiagramEngine {
    let mut engine = DiagramEngine::with_payload(EngineConfig::default(), payload).unwrap();
    engine.reset_to_fit(800.0, 600.0);
    engine
}
