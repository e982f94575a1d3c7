// Status style table
//
// Maps each node status to the look of its proxy and of the links touching
// it. Edge styling always takes the worse endpoint status, using the
// severity order encoded on NodeStatus.

use crate::topology::NodeStatus;
use std::collections::HashMap;

/// RGB color triple, independent of any drawing backend
pub type Rgb = (u8, u8, u8);

/// Drawn sphere radius of a node proxy in world units
pub const PROXY_RADIUS: f32 = 0.3;

/// Radius used for picking; wider than the drawn proxy so a single
/// terminal cell is a usable target
pub const HIT_RADIUS: f32 = 0.9;

/// Resting emphasis for proxies that do not pulse
pub const BASE_EMPHASIS: f32 = 0.2;

/// Visual style for one node status
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    /// Proxy and link color
    pub color: Rgb,
    /// Drawn radius in world units
    pub radius: f32,
    /// Emphasis when not pulsing
    pub base_emphasis: f32,
    /// Whether the render loop pulses this proxy
    pub pulse: bool,
    /// Whether links whose worst endpoint has this status are dashed
    pub dashed_links: bool,
}

/// Lookup table from status to style
///
/// Deliberately not total: a status missing from the table is a
/// construction error when a node with that status is built.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    styles: HashMap<NodeStatus, NodeStyle>,
}

impl StyleTable {
    /// Table with no entries
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    pub fn with(mut self, status: NodeStatus, style: NodeStyle) -> Self {
        self.styles.insert(status, style);
        self
    }

    #[cfg(test)]
    pub fn without(mut self, status: NodeStatus) -> Self {
        self.styles.remove(&status);
        self
    }

    pub fn get(&self, status: NodeStatus) -> Option<&NodeStyle> {
        self.styles.get(&status)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        let style = |color: Rgb, pulse: bool, dashed_links: bool| NodeStyle {
            color,
            radius: PROXY_RADIUS,
            base_emphasis: BASE_EMPHASIS,
            pulse,
            dashed_links,
        };

        Self::empty()
            .with(NodeStatus::Secure, style((0, 255, 65), false, false))
            .with(NodeStatus::Warning, style((255, 255, 0), false, false))
            .with(NodeStatus::Compromised, style((255, 0, 64), true, true))
            .with(NodeStatus::Offline, style((102, 102, 102), false, true))
    }
}

/// Status that decides an edge's style: the worse of its two endpoints
pub fn edge_status(a: NodeStatus, b: NodeStatus) -> NodeStatus {
    a.worse(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_every_status() {
        let table = StyleTable::default();
        for status in NodeStatus::ALL {
            assert!(table.get(status).is_some(), "missing style for {}", status);
        }
    }

    #[test]
    fn test_only_compromised_pulses_by_default() {
        let table = StyleTable::default();
        let pulsing: Vec<NodeStatus> = NodeStatus::ALL
            .into_iter()
            .filter(|s| table.get(*s).is_some_and(|style| style.pulse))
            .collect();
        assert_eq!(pulsing, vec![NodeStatus::Compromised]);
    }

    #[test]
    fn test_edge_status_takes_worse_endpoint() {
        use NodeStatus::*;
        assert_eq!(edge_status(Secure, Secure), Secure);
        assert_eq!(edge_status(Secure, Warning), Warning);
        assert_eq!(edge_status(Compromised, Warning), Compromised);
        assert_eq!(edge_status(Compromised, Offline), Offline);
        assert_eq!(edge_status(Offline, Secure), Offline);
    }

    #[test]
    fn test_without_removes_entry() {
        let table = StyleTable::default().without(NodeStatus::Offline);
        assert!(table.get(NodeStatus::Offline).is_none());
        assert!(table.get(NodeStatus::Secure).is_some());
    }
}
