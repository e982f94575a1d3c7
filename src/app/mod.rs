// Application state management
//
// AppState is the host around one mounted viewport: it owns the current
// graph snapshot, feeds the viewport frames and input, and keeps the side
// panels (node list, selection log) in step with selection changes.

pub mod config;
pub mod event;

pub use config::{DisplaySettings, FrameRateConfig, VisualizerConfig};

use crate::error::ConstructionError;
use crate::scene::{self, ResourceLedger};
use crate::topology::{build_graph, demo, Graph, NetworkNode, NodeId};
use crate::viewport::{FrameOutcome, TerminalSurface, ViewportEvent, ViewportHandle};
use config::SELECTION_LOG_CAPACITY;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

/// Which built-in snapshot is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoNetwork {
    #[default]
    Baseline,
    /// Same network with workstation-2 offline
    Degraded,
}

impl DemoNetwork {
    pub fn nodes(self) -> Vec<NetworkNode> {
        match self {
            DemoNetwork::Baseline => demo::demo_network(),
            DemoNetwork::Degraded => demo::demo_network_degraded(),
        }
    }

    pub fn other(self) -> Self {
        match self {
            DemoNetwork::Baseline => DemoNetwork::Degraded,
            DemoNetwork::Degraded => DemoNetwork::Baseline,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DemoNetwork::Baseline => "baseline",
            DemoNetwork::Degraded => "degraded",
        }
    }
}

/// One selection change as emitted by the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionLogEntry {
    /// Time since the application started
    pub at: Duration,
    pub selected: Option<NodeId>,
}

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Graph snapshot the current scene was built from
    pub graph: Graph,

    pub network: DemoNetwork,

    pub viewport: ViewportHandle<TerminalSurface>,

    /// Visual toggles (animations, labels)
    pub display: DisplaySettings,

    /// Frame-rate ceiling, adjustable at runtime
    pub frame_rate: FrameRateConfig,

    /// Selection changes, newest first
    pub selection_log: VecDeque<SelectionLogEntry>,

    /// List state for the node list (follows the selection)
    pub node_list_state: ListState,

    selection_rx: Receiver<Option<NodeId>>,
    ledger: ResourceLedger,
    started: Instant,
}

impl AppState {
    /// Build the baseline demo network and mount it into a terminal surface
    pub fn new(surface: TerminalSurface, now: Instant) -> Result<Self, ConstructionError> {
        let config = VisualizerConfig::default();
        let network = DemoNetwork::default();
        let ledger = ResourceLedger::new();

        let graph = build_graph(network.nodes())?;
        let scene = scene::build(&graph, &ledger)?;

        // Selection changes reach the side panels through a channel so the
        // viewport never borrows application state
        let (tx, selection_rx) = mpsc::channel();
        let viewport = ViewportHandle::mount(
            surface,
            scene,
            &config,
            Box::new(move |id: Option<&NodeId>| {
                if tx.send(id.cloned()).is_err() {
                    tracing::warn!(selected = ?id, "Selection change dropped, receiver gone");
                }
            }),
            now,
        );

        Ok(Self {
            running: true,
            graph,
            network,
            viewport,
            display: DisplaySettings::default(),
            frame_rate: FrameRateConfig::new(config.target_fps),
            selection_log: VecDeque::with_capacity(SELECTION_LOG_CAPACITY),
            node_list_state: ListState::default(),
            selection_rx,
            ledger,
            started: now,
        })
    }

    /// Drive the viewport and collect selection changes
    pub fn on_tick(&mut self, now: Instant) -> FrameOutcome {
        let outcome = self.viewport.advance(now);
        self.drain_selection_changes(now);
        outcome
    }

    /// Time the host loop may wait for input before the next tick
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.viewport.time_until_next_frame(now)
    }

    /// Point the map surface at a new cell area
    ///
    /// The viewport picks the new size up after its resize debounce.
    pub fn resize_map(&mut self, area: Rect, now: Instant) {
        if self.viewport.surface().area() == area {
            return;
        }
        self.viewport.surface_mut().set_area(area);
        self.viewport.dispatch(ViewportEvent::Resize, now);
    }

    /// Move selection down the node list (first node when nothing is selected)
    pub fn select_next_node(&mut self) {
        if self.graph.is_empty() {
            return;
        }
        let len = self.graph.len();
        let next = match self.selected_index() {
            Some(idx) => (idx + 1).min(len - 1),
            None => 0,
        };
        self.select_index(next);
    }

    /// Move selection up the node list (last node when nothing is selected)
    pub fn select_previous_node(&mut self) {
        if self.graph.is_empty() {
            return;
        }
        let len = self.graph.len();
        let previous = match self.selected_index() {
            Some(idx) => idx.saturating_sub(1),
            None => len - 1,
        };
        self.select_index(previous);
    }

    /// Index of the selected node in the graph's node list
    pub fn selected_index(&self) -> Option<usize> {
        self.viewport
            .selected()
            .and_then(|id| self.graph.index_of(id.as_str()))
    }

    /// Rebuild the scene from the other demo snapshot
    pub fn swap_network(&mut self, now: Instant) -> Result<(), ConstructionError> {
        let network = self.network.other();
        let graph = build_graph(network.nodes())?;
        let scene = scene::build(&graph, &self.ledger)?;

        self.viewport.rebuild(scene);
        self.graph = graph;
        self.network = network;
        self.drain_selection_changes(now);

        tracing::info!(
            network = network.name(),
            live_resources = self.ledger.live(),
            allocated_total = self.ledger.allocated_total(),
            "Swapped network snapshot"
        );
        Ok(())
    }

    pub fn toggle_animations(&mut self) {
        self.display.animations_enabled = !self.display.animations_enabled;
        self.viewport
            .set_animations_enabled(self.display.animations_enabled);
    }

    pub fn toggle_labels(&mut self) {
        self.display.labels_enabled = !self.display.labels_enabled;
    }

    pub fn increase_frame_rate(&mut self, now: Instant) {
        self.frame_rate.increase(now);
        self.viewport.set_target_fps(self.frame_rate.target_fps);
    }

    pub fn decrease_frame_rate(&mut self, now: Instant) {
        self.frame_rate.decrease(now);
        self.viewport.set_target_fps(self.frame_rate.target_fps);
    }

    /// Stop the loop and release everything the viewport holds
    pub fn quit(&mut self) {
        self.running = false;
        self.viewport.teardown();
    }

    /// Scene resources currently allocated
    #[cfg(test)]
    pub fn live_resources(&self) -> usize {
        self.ledger.live()
    }

    fn select_index(&mut self, idx: usize) {
        let id = self.graph.nodes().get(idx).map(|node| node.id.clone());
        if let Some(id) = id {
            self.viewport.select(Some(id.as_str()));
        }
        self.node_list_state.select(self.selected_index());
    }

    fn drain_selection_changes(&mut self, now: Instant) {
        let mut changed = false;
        while let Ok(selected) = self.selection_rx.try_recv() {
            if self.selection_log.len() == SELECTION_LOG_CAPACITY {
                self.selection_log.pop_back();
            }
            self.selection_log.push_front(SelectionLogEntry {
                at: now.saturating_duration_since(self.started),
                selected,
            });
            changed = true;
        }
        if changed {
            self.node_list_state.select(self.selected_index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeStatus;
    use crate::viewport::ViewportState;

    fn app() -> (AppState, Instant) {
        let now = Instant::now();
        let surface = TerminalSurface::headless(Rect::new(0, 0, 80, 30));
        (AppState::new(surface, now).unwrap(), now)
    }

    fn selected(app: &AppState) -> Option<&str> {
        app.viewport.selected().map(NodeId::as_str)
    }

    #[test]
    fn test_new_mounts_demo_network() {
        let (mut app, now) = app();
        assert_eq!(app.graph.len(), 7);
        assert_eq!(app.network, DemoNetwork::Baseline);
        assert_eq!(app.viewport.state(), ViewportState::Mounted);
        assert_eq!(app.live_resources(), 14);

        assert_eq!(app.on_tick(now), FrameOutcome::Rendered);
        let frame = app.viewport.surface().frame().unwrap();
        assert_eq!(frame.nodes.len(), 7);
    }

    #[test]
    fn test_selection_survives_closed_channel() {
        let (mut app, now) = app();

        // Swap in a fresh receiver so the viewport's sender has no peer
        let (_tx, rx) = mpsc::channel();
        app.selection_rx = rx;

        assert!(app.viewport.select(Some("router-1")));
        app.on_tick(now);
        assert_eq!(selected(&app), Some("router-1"));
        assert!(app.selection_log.is_empty());
    }

    #[test]
    fn test_node_navigation_walks_list() {
        let (mut app, now) = app();

        app.select_next_node();
        assert_eq!(app.selected_index(), Some(0));
        app.select_next_node();
        assert_eq!(app.selected_index(), Some(1));
        app.select_previous_node();
        app.select_previous_node();
        assert_eq!(app.selected_index(), Some(0));
        assert_eq!(app.node_list_state.selected(), Some(0));

        // Three changes: 0, 1, 0; the last "previous" at the top is a no-op
        app.on_tick(now);
        assert_eq!(app.selection_log.len(), 3);
        let newest = &app.selection_log[0];
        assert_eq!(
            newest.selected.as_ref().map(NodeId::as_str),
            Some(app.graph.nodes()[0].id.as_str())
        );
    }

    #[test]
    fn test_previous_from_nothing_selects_last() {
        let (mut app, _) = app();
        app.select_previous_node();
        assert_eq!(app.selected_index(), Some(6));
        app.select_next_node();
        assert_eq!(app.selected_index(), Some(6));
    }

    #[test]
    fn test_selection_log_is_bounded() {
        let (mut app, now) = app();
        for i in 0..(SELECTION_LOG_CAPACITY + 20) {
            if i % 2 == 0 {
                app.select_next_node();
            } else {
                app.select_previous_node();
            }
            app.on_tick(now);
        }
        assert_eq!(app.selection_log.len(), SELECTION_LOG_CAPACITY);
    }

    #[test]
    fn test_swap_network_rebuilds_scene() {
        let (mut app, now) = app();
        assert!(app.viewport.select(Some("workstation-2")));

        app.swap_network(now).unwrap();
        assert_eq!(app.network, DemoNetwork::Degraded);
        assert_eq!(app.live_resources(), 14);
        assert_eq!(selected(&app), Some("workstation-2"));
        assert_eq!(
            app.graph.get("workstation-2").map(|n| n.status),
            Some(NodeStatus::Offline)
        );

        app.swap_network(now).unwrap();
        assert_eq!(app.network, DemoNetwork::Baseline);
        assert_eq!(app.live_resources(), 14);
    }

    #[test]
    fn test_toggles_persist_across_ticks() {
        let (mut app, start) = app();
        app.toggle_animations();
        app.toggle_labels();

        let mut now = start;
        for _ in 0..10 {
            app.on_tick(now);
            now += Duration::from_millis(50);
        }

        assert!(!app.display.animations_enabled);
        assert!(!app.display.labels_enabled);
    }

    #[test]
    fn test_frame_rate_reaches_scheduler() {
        let (mut app, now) = app();
        app.increase_frame_rate(now);
        assert_eq!(app.frame_rate.target_fps, 35);
        assert!(app.frame_rate.recently_changed(now));

        app.on_tick(now);
        let wait = app.next_wakeup(now).unwrap();
        assert_eq!(wait, Duration::from_secs(1) / 35);
    }

    #[test]
    fn test_resize_map_debounces() {
        let (mut app, start) = app();
        app.on_tick(start);

        app.resize_map(Rect::new(0, 0, 100, 40), start);
        app.resize_map(Rect::new(0, 0, 100, 40), start);
        app.on_tick(start + Duration::from_millis(100));
        assert_eq!(app.viewport.resize_recomputes(), 0);

        app.on_tick(start + Duration::from_millis(300));
        assert_eq!(app.viewport.resize_recomputes(), 1);
        assert_eq!(app.viewport.camera().aspect, 100.0 / 80.0);
    }

    #[test]
    fn test_quit_tears_down() {
        let (mut app, now) = app();
        app.quit();
        assert!(!app.running);
        assert_eq!(app.live_resources(), 0);
        assert_eq!(app.on_tick(now), FrameOutcome::Stopped);
        assert!(!app.viewport.surface().is_listening());
    }
}
