// Construction error types
//
// Every failure that can stop a graph or scene from being built lands here.
// Picking misses and redundant teardowns are not errors and never appear.

use crate::topology::{NodeId, NodeStatus};
use thiserror::Error;

/// Fatal error for a single graph or scene build attempt
///
/// The caller must not mount a viewport after receiving one of these;
/// no partially built scene is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    /// Two nodes in the same snapshot share an id
    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),

    /// A `connections` entry names a node that is not in the snapshot
    #[error("node `{from}` connects to unknown node `{to}`")]
    DanglingConnection { from: NodeId, to: NodeId },

    /// A position component is NaN or infinite
    #[error("node `{id}` has a non-finite position {position:?}")]
    NonFinitePosition { id: NodeId, position: [f32; 3] },

    /// The style table has no entry for a node's status
    #[error("no style registered for status `{status}` used by node `{id}`")]
    UnstyledStatus { id: NodeId, status: NodeStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_node() {
        let err = ConstructionError::DanglingConnection {
            from: NodeId::from("router-1"),
            to: NodeId::from("ghost"),
        };
        assert_eq!(
            err.to_string(),
            "node `router-1` connects to unknown node `ghost`"
        );

        let err = ConstructionError::UnstyledStatus {
            id: NodeId::from("server-2"),
            status: NodeStatus::Compromised,
        };
        assert!(err.to_string().contains("compromised"));
        assert!(err.to_string().contains("server-2"));
    }
}
