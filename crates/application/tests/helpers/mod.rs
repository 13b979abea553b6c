#![allow(dead_code)]

mod mock_node_manager;

pub use mock_node_manager::{MockNode, MockNodeManager, RecordedCall};
