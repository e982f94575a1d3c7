// Scene builder
//
// Turns a validated Graph into renderable primitives: one proxy per node,
// one line per deduplicated edge. All styles are resolved before anything
// is allocated, so a failed build never leaves resources behind.

pub mod resources;
pub mod style;

pub use resources::{ResourceId, ResourceKind, ResourceLedger};
pub use style::{edge_status, NodeStyle, Rgb, StyleTable, HIT_RADIUS};

use crate::error::ConstructionError;
use crate::topology::{Graph, NodeCategory, NodeId, NodeStatus};
use glam::{Vec2, Vec3};

/// Renderable stand-in for one node
#[derive(Debug, Clone)]
pub struct NodeProxy {
    pub id: NodeId,
    pub label: String,
    pub ip: String,
    pub category: NodeCategory,
    pub status: NodeStatus,
    pub position: Vec3,
    pub style: NodeStyle,
    /// Accumulated idle rotation around the x and y axes, in radians
    pub rotation: Vec2,
    /// Current emphasis intensity (emissive strength)
    pub emphasis: f32,
    resource: ResourceId,
}

/// Line primitive for one edge
#[derive(Debug, Clone)]
pub struct EdgePrimitive {
    /// Index of the first endpoint in `SceneHandle::proxies()`
    pub from: usize,
    /// Index of the second endpoint in `SceneHandle::proxies()`
    pub to: usize,
    /// Worse of the two endpoint statuses
    pub status: NodeStatus,
    pub color: Rgb,
    pub dashed: bool,
    resource: ResourceId,
}

/// Owner of every primitive built for one graph
///
/// Proxies keep the graph's insertion order, which picking relies on for
/// deterministic tie-breaks. Dropping the handle disposes it.
#[derive(Debug)]
pub struct SceneHandle {
    proxies: Vec<NodeProxy>,
    edges: Vec<EdgePrimitive>,
    ledger: ResourceLedger,
    disposed: bool,
}

impl SceneHandle {
    pub fn proxies(&self) -> &[NodeProxy] {
        &self.proxies
    }

    pub fn proxies_mut(&mut self) -> &mut [NodeProxy] {
        &mut self.proxies
    }

    pub fn edges(&self) -> &[EdgePrimitive] {
        &self.edges
    }

    pub fn proxy(&self, id: &str) -> Option<&NodeProxy> {
        self.proxies.iter().find(|p| p.id.as_str() == id)
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every primitive; calling it again does nothing
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        let ledger = &self.ledger;
        let released = self
            .proxies
            .drain(..)
            .map(|p| p.resource)
            .chain(self.edges.drain(..).map(|e| e.resource))
            .filter(|id| ledger.release(*id))
            .count();
        self.disposed = true;

        tracing::debug!(released, live = self.ledger.live(), "Disposed scene");
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Build a scene with the default style table
pub fn build(graph: &Graph, ledger: &ResourceLedger) -> Result<SceneHandle, ConstructionError> {
    build_with_styles(graph, &StyleTable::default(), ledger)
}

/// Build a scene with a caller-supplied style table
///
/// Fails with `UnstyledStatus` if any node's status has no entry.
pub fn build_with_styles(
    graph: &Graph,
    styles: &StyleTable,
    ledger: &ResourceLedger,
) -> Result<SceneHandle, ConstructionError> {
    // Resolve every style up front so failure allocates nothing
    let node_styles = graph
        .nodes()
        .iter()
        .map(|node| {
            styles
                .get(node.status)
                .copied()
                .ok_or_else(|| ConstructionError::UnstyledStatus {
                    id: node.id.clone(),
                    status: node.status,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let proxies: Vec<NodeProxy> = graph
        .nodes()
        .iter()
        .zip(node_styles)
        .map(|(node, style)| NodeProxy {
            id: node.id.clone(),
            label: node.label.clone(),
            ip: node.ip.clone(),
            category: node.category,
            status: node.status,
            position: node.position,
            style,
            rotation: Vec2::ZERO,
            emphasis: style.base_emphasis,
            resource: ledger.allocate(ResourceKind::NodeProxy),
        })
        .collect();

    let edges: Vec<EdgePrimitive> = graph
        .edges()
        .iter()
        .map(|edge| {
            let status = edge_status(proxies[edge.a].status, proxies[edge.b].status);
            // Both endpoint styles resolved above, and status is one of them
            let style = if status == proxies[edge.a].status {
                proxies[edge.a].style
            } else {
                proxies[edge.b].style
            };
            EdgePrimitive {
                from: edge.a,
                to: edge.b,
                status,
                color: style.color,
                dashed: style.dashed_links,
                resource: ledger.allocate(ResourceKind::EdgeLine),
            }
        })
        .collect();

    tracing::debug!(
        proxies = proxies.len(),
        edges = edges.len(),
        live = ledger.live(),
        "Built scene"
    );

    Ok(SceneHandle {
        proxies,
        edges,
        ledger: ledger.clone(),
        disposed: false,
    })
}
