// Scene projection
//
// The "render" step of a frame: projects the scene through the camera into
// a backend-neutral draw list in normalized device coordinates. Drawing
// backends only need to map the [-1, 1] square onto their surface.

use crate::camera::Camera;
use crate::scene::{Rgb, SceneHandle};
use crate::topology::{NodeCategory, NodeId, NodeStatus};
use glam::{Vec2, Vec3};

/// One edge clipped to the visible half-space
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Rgb,
    pub dashed: bool,
    pub status: NodeStatus,
}

/// One projected node proxy
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub id: NodeId,
    pub label: String,
    pub ip: String,
    pub category: NodeCategory,
    pub status: NodeStatus,
    pub ndc: Vec2,
    pub depth: f32,
    /// Vertical radius of the proxy in device units
    pub radius: f32,
    pub color: Rgb,
    pub emphasis: f32,
    /// Idle rotation around the vertical axis, in radians
    pub spin: f32,
    pub selected: bool,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub edges: Vec<EdgeSegment>,
    /// Sorted far to near, so later sprites overdraw earlier ones
    pub nodes: Vec<NodeSprite>,
}

impl DrawList {
    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&NodeSprite> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

/// Project the whole scene for the current camera
pub fn project_scene(scene: &SceneHandle, camera: &Camera, selected: Option<&NodeId>) -> DrawList {
    let view = camera.view_matrix();
    let projection = camera.projection_matrix();
    let proxies = scene.proxies();

    let edges = scene
        .edges()
        .iter()
        .filter_map(|edge| {
            let a = view.transform_point3(proxies[edge.from].position);
            let b = view.transform_point3(proxies[edge.to].position);
            let (a, b) = clip_to_near(a, b, camera.near)?;
            Some(EdgeSegment {
                from: projection.project_point3(a).truncate(),
                to: projection.project_point3(b).truncate(),
                color: edge.color,
                dashed: edge.dashed,
                status: edge.status,
            })
        })
        .collect();

    let mut nodes: Vec<NodeSprite> = proxies
        .iter()
        .filter_map(|proxy| {
            let projected = camera.project(proxy.position)?;
            Some(NodeSprite {
                id: proxy.id.clone(),
                label: proxy.label.clone(),
                ip: proxy.ip.clone(),
                category: proxy.category,
                status: proxy.status,
                ndc: projected.ndc,
                depth: projected.depth,
                radius: camera.projected_radius(proxy.style.radius, projected.depth),
                color: proxy.style.color,
                emphasis: proxy.emphasis,
                spin: proxy.rotation.y,
                selected: selected == Some(&proxy.id),
            })
        })
        .collect();

    nodes.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    DrawList { edges, nodes }
}

/// Clip a view-space segment against the near plane
///
/// View space looks down -z, so a point is visible when `-z > near`.
fn clip_to_near(a: Vec3, b: Vec3, near: f32) -> Option<(Vec3, Vec3)> {
    // Nudge past the plane so the clipped point still projects
    let plane = -(near * 1.001);
    let a_visible = a.z < plane;
    let b_visible = b.z < plane;

    match (a_visible, b_visible) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, a.lerp(b, (plane - a.z) / (b.z - a.z)))),
        (false, true) => Some((b.lerp(a, (plane - b.z) / (a.z - b.z)), b)),
    }
}
