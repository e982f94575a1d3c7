// Picking engine
//
// Converts a pointer position on the viewport into a world-space ray and
// finds the nearest node proxy it hits. A miss is a normal outcome (None),
// handled by callers exactly like an explicit deselect.

use crate::camera::{Camera, ViewportSize};
use crate::scene::{SceneHandle, HIT_RADIUS};
use crate::topology::NodeId;
use glam::{Vec2, Vec3};

/// Hits closer together than this are treated as equidistant
pub const TIE_EPSILON: f32 = 1e-4;

/// Half-line in world space; `direction` is unit length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Map a pointer position (origin top-left, y down) to device coordinates
///
/// Returns None for an empty viewport or a pointer outside it.
pub fn normalize_pointer(x: f32, y: f32, viewport: ViewportSize) -> Option<Vec2> {
    if viewport.is_empty() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let ndc = Vec2::new(
        (x / viewport.width) * 2.0 - 1.0,
        -(y / viewport.height) * 2.0 + 1.0,
    );
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }
    Some(ndc)
}

/// Smallest non-negative ray parameter at which the ray meets the sphere
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    // Origin inside the sphere
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

/// Nearest proxy hit by the ray through `ndc`
///
/// Equidistant hits resolve to the proxy inserted first.
pub fn pick_ndc(ndc: Vec2, camera: &Camera, scene: &SceneHandle) -> Option<NodeId> {
    let ray = camera.ray_from_ndc(ndc);

    let mut best: Option<(f32, &NodeId)> = None;
    for proxy in scene.proxies() {
        let radius = HIT_RADIUS.max(proxy.style.radius);
        let Some(t) = intersect_sphere(&ray, proxy.position, radius) else {
            continue;
        };
        match best {
            Some((best_t, _)) if t >= best_t - TIE_EPSILON => {}
            _ => best = Some((t, &proxy.id)),
        }
    }

    best.map(|(_, id)| id.clone())
}

/// Resolve a pointer position on the viewport to a node id
pub fn pick(
    pointer_x: f32,
    pointer_y: f32,
    viewport: ViewportSize,
    camera: &Camera,
    scene: &SceneHandle,
) -> Option<NodeId> {
    let ndc = normalize_pointer(pointer_x, pointer_y, viewport)?;
    pick_ndc(ndc, camera, scene)
}

// ============================================================================
// Pick coalescing
// ============================================================================

/// Pointer position waiting to be picked
///
/// Carries the surface size the position was measured against, so a
/// resize landing before the pick resolves cannot skew the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRequest {
    pub x: f32,
    pub y: f32,
    pub viewport: ViewportSize,
}

/// Holds at most one pending pick; newer requests replace older ones
///
/// The render loop takes the pending request once per frame, so no matter
/// how fast pointer events arrive, at most one pick resolves per frame.
#[derive(Debug, Default)]
pub struct PickQueue {
    pending: Option<PickRequest>,
    coalesced: u64,
}

impl PickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, x: f32, y: f32, viewport: ViewportSize) {
        if self.pending.replace(PickRequest { x, y, viewport }).is_some() {
            self.coalesced += 1;
        }
    }

    pub fn take(&mut self) -> Option<PickRequest> {
        self.pending.take()
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Requests dropped because a newer one replaced them
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{build, ResourceLedger};
    use crate::topology::{build_graph, NetworkNode, NodeCategory, NodeStatus};
    use proptest::prelude::*;

    const VIEWPORT: ViewportSize = ViewportSize {
        width: 200.0,
        height: 100.0,
    };

    fn camera() -> Camera {
        let mut camera = Camera::new(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO, 75.0, 0.1, 1000.0);
        camera.set_aspect(VIEWPORT.aspect());
        camera
    }

    fn scene_of(nodes: Vec<NetworkNode>) -> (SceneHandle, ResourceLedger) {
        let ledger = ResourceLedger::new();
        let graph = build_graph(nodes).unwrap();
        let scene = build(&graph, &ledger).unwrap();
        (scene, ledger)
    }

    fn rfs_scene() -> (SceneHandle, ResourceLedger) {
        scene_of(vec![
            NetworkNode::new("R", "Router", NodeCategory::Router, NodeStatus::Secure, [0.0, 0.0, 0.0])
                .with_connections(["F"]),
            NetworkNode::new("F", "Firewall", NodeCategory::Firewall, NodeStatus::Secure, [-3.0, 2.0, 0.0])
                .with_connections(["S"]),
            NetworkNode::new("S", "Server", NodeCategory::Server, NodeStatus::Secure, [-2.0, -2.0, 0.0]),
        ])
    }

    fn screen_position(camera: &Camera, world: Vec3) -> (f32, f32) {
        let ndc = camera.project(world).unwrap().ndc;
        (
            (ndc.x + 1.0) * 0.5 * VIEWPORT.width,
            (1.0 - ndc.y) * 0.5 * VIEWPORT.height,
        )
    }

    #[test]
    fn test_normalize_pointer_corners() {
        assert_eq!(normalize_pointer(0.0, 0.0, VIEWPORT), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(normalize_pointer(200.0, 100.0, VIEWPORT), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(normalize_pointer(100.0, 50.0, VIEWPORT), Some(Vec2::ZERO));
        assert_eq!(normalize_pointer(201.0, 50.0, VIEWPORT), None);
        assert_eq!(normalize_pointer(10.0, 10.0, ViewportSize::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_intersect_sphere() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert_eq!(intersect_sphere(&ray, Vec3::ZERO, 1.0), Some(9.0));
        assert_eq!(intersect_sphere(&ray, Vec3::new(5.0, 0.0, 0.0), 1.0), None);
        // Sphere behind the origin
        assert_eq!(intersect_sphere(&ray, Vec3::new(0.0, 0.0, 20.0), 1.0), None);
        // Origin inside the sphere
        let inside = intersect_sphere(&ray, Vec3::new(0.0, 0.0, 10.0), 2.0).unwrap();
        assert!((inside - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_click_over_node_picks_it() {
        let (scene, _ledger) = rfs_scene();
        let camera = camera();

        for id in ["R", "F", "S"] {
            let position = scene.proxy(id).unwrap().position;
            let (x, y) = screen_position(&camera, position);
            assert_eq!(
                pick(x, y, VIEWPORT, &camera, &scene).as_ref().map(NodeId::as_str),
                Some(id)
            );
        }
    }

    #[test]
    fn test_click_on_empty_space_misses() {
        let (scene, _ledger) = rfs_scene();
        let camera = camera();
        assert_eq!(pick(0.0, 0.0, VIEWPORT, &camera, &scene), None);
        assert_eq!(pick(199.0, 1.0, VIEWPORT, &camera, &scene), None);
    }

    #[test]
    fn test_nearest_proxy_wins() {
        // "far" sits at the origin, "near" on the line towards the camera
        let (scene, _ledger) = scene_of(vec![
            NetworkNode::new("far", "Far", NodeCategory::Server, NodeStatus::Secure, [0.0, 0.0, 0.0]),
            NetworkNode::new("near", "Near", NodeCategory::Server, NodeStatus::Secure, [4.0, 4.0, 4.0]),
        ]);
        let camera = camera();
        assert_eq!(
            pick_ndc(Vec2::ZERO, &camera, &scene).as_ref().map(NodeId::as_str),
            Some("near")
        );
    }

    #[test]
    fn test_equidistant_tie_goes_to_first_inserted() {
        let (scene, _ledger) = scene_of(vec![
            NetworkNode::new("b", "B", NodeCategory::Server, NodeStatus::Secure, [0.0, 0.0, 0.0]),
            NetworkNode::new("a", "A", NodeCategory::Server, NodeStatus::Warning, [0.0, 0.0, 0.0]),
        ]);
        let camera = camera();
        assert_eq!(
            pick_ndc(Vec2::ZERO, &camera, &scene).as_ref().map(NodeId::as_str),
            Some("b")
        );
    }

    #[test]
    fn test_pick_queue_keeps_latest() {
        let mut queue = PickQueue::new();
        assert!(queue.take().is_none());

        for i in 0..5 {
            queue.request(i as f32, 0.0, VIEWPORT);
        }
        assert!(queue.is_pending());
        assert_eq!(queue.coalesced(), 4);
        assert_eq!(
            queue.take(),
            Some(PickRequest {
                x: 4.0,
                y: 0.0,
                viewport: VIEWPORT
            })
        );
        assert!(queue.take().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Same camera, viewport and pointer always give the same answer.
        #[test]
        fn prop_pick_deterministic(x in 0.0f32..200.0, y in 0.0f32..100.0) {
            let (scene, _ledger) = rfs_scene();
            let camera = camera();
            let first = pick(x, y, VIEWPORT, &camera, &scene);
            for _ in 0..3 {
                prop_assert_eq!(&pick(x, y, VIEWPORT, &camera, &scene), &first);
            }
        }

        /// Any pointer position, even off-surface or non-finite, is a value
        /// and never a panic.
        #[test]
        fn prop_pick_total(x in proptest::num::f32::ANY, y in proptest::num::f32::ANY) {
            let (scene, _ledger) = rfs_scene();
            let camera = camera();
            let picked = pick(x, y, VIEWPORT, &camera, &scene);
            if let Some(id) = picked {
                prop_assert!(scene.proxy(id.as_str()).is_some());
            }
        }
    }
}
