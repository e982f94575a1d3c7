// Viewport lifecycle
//
// A ViewportHandle owns everything one mounted visualizer needs: the host
// surface, the scene, camera and controls, the frame scheduler, and the
// pending pick and resize work. Its state machine is Unmounted -> Mounted
// -> Unmounted. Input arrives as typed events through a single dispatcher,
// so teardown only has to detach one set of listeners.

pub mod debounce;
pub mod surface;

pub use debounce::Debouncer;
pub use surface::{HostSurface, TerminalSurface};

use crate::app::config::VisualizerConfig;
use crate::camera::{Camera, OrbitControls, ViewportSize};
use crate::picking::{self, PickQueue};
use crate::render;
use crate::scene::SceneHandle;
use crate::scheduler::{self, AnimationConfig, AnimationFlags, FrameScheduler};
use crate::topology::NodeId;
use glam::Vec2;
use std::time::{Duration, Instant};

/// Largest pointer travel, in viewport pixels, that still counts as a click
pub const CLICK_SLOP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Mounted,
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input delivered to a mounted viewport
///
/// Pointer coordinates are viewport pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    PointerDown { x: f32, y: f32, button: PointerButton },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32, button: PointerButton },
    /// Wheel notches; positive zooms in
    Wheel { notches: f32 },
    /// The host surface changed size
    Resize,
}

/// What one call to `advance` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Too early for the next frame
    Skipped,
    /// Scheduler cancelled or viewport unmounted
    Stopped,
}

/// Receives every selection change, by value
pub type SelectionCallback = Box<dyn FnMut(Option<&NodeId>)>;

#[derive(Debug, Clone, Copy)]
struct DragState {
    button: PointerButton,
    origin: Vec2,
    last: Vec2,
    moved: bool,
}

pub struct ViewportHandle<S: HostSurface> {
    state: ViewportState,
    surface: S,
    scene: Option<SceneHandle>,
    camera: Camera,
    controls: OrbitControls,
    scheduler: FrameScheduler,
    picks: PickQueue,
    resize: Debouncer,
    drag: Option<DragState>,
    size: ViewportSize,
    selected: Option<NodeId>,
    on_selection_change: SelectionCallback,
    animation: AnimationConfig,
    animations_enabled: bool,
    mounted_at: Instant,
    resize_recomputes: u64,
}

impl<S: HostSurface> ViewportHandle<S> {
    /// Mount a built scene into a host surface
    ///
    /// Sizes the output to the surface, attaches listeners and starts the
    /// frame scheduler. The first frame is due immediately.
    pub fn mount(
        mut surface: S,
        scene: SceneHandle,
        config: &VisualizerConfig,
        on_selection_change: SelectionCallback,
        now: Instant,
    ) -> Self {
        let size = surface.size();
        let mut camera = Camera::new(
            config.camera.position,
            config.camera.target,
            config.camera.fov_y_degrees,
            config.camera.near,
            config.camera.far,
        );
        camera.set_aspect(size.aspect());
        let controls = OrbitControls::new(&camera, config.damping);

        surface.attach_output(size);
        surface.attach_listeners();

        tracing::info!(
            width = size.width,
            height = size.height,
            nodes = scene.proxies().len(),
            edges = scene.edges().len(),
            "Mounted viewport"
        );

        Self {
            state: ViewportState::Mounted,
            surface,
            scene: Some(scene),
            camera,
            controls,
            scheduler: FrameScheduler::new(config.target_fps),
            picks: PickQueue::new(),
            resize: Debouncer::new(config.resize_debounce),
            drag: None,
            size,
            selected: None,
            on_selection_change,
            animation: config.animation,
            animations_enabled: true,
            mounted_at: now,
            resize_recomputes: 0,
        }
    }

    /// Route one input event; ignored once unmounted
    pub fn dispatch(&mut self, event: ViewportEvent, now: Instant) {
        if self.state == ViewportState::Unmounted {
            return;
        }

        match event {
            ViewportEvent::PointerDown { x, y, button } => {
                let at = Vec2::new(x, y);
                self.drag = Some(DragState {
                    button,
                    origin: at,
                    last: at,
                    moved: false,
                });
            }
            ViewportEvent::PointerMove { x, y } => {
                let Some(drag) = self.drag.as_mut() else {
                    return;
                };
                let at = Vec2::new(x, y);
                let delta = at - drag.last;
                drag.last = at;
                if at.distance(drag.origin) >= CLICK_SLOP {
                    drag.moved = true;
                }

                match drag.button {
                    PointerButton::Primary => self.controls.rotate(delta.x, delta.y, self.size),
                    PointerButton::Secondary | PointerButton::Middle => {
                        self.controls.pan(delta.x, delta.y, self.size, &self.camera)
                    }
                }
            }
            ViewportEvent::PointerUp { x, y, button } => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                let is_click = button == PointerButton::Primary
                    && drag.button == PointerButton::Primary
                    && !drag.moved
                    && Vec2::new(x, y).distance(drag.origin) < CLICK_SLOP;
                if is_click {
                    // Measured against the surface as it is now, which may be
                    // ahead of a pending debounced resize
                    self.picks.request(x, y, self.surface.size());
                }
            }
            ViewportEvent::Wheel { notches } => self.controls.zoom(notches),
            ViewportEvent::Resize => self.resize.trigger(now),
        }
    }

    /// Run whatever is due at `now`: a debounced resize, then one frame
    ///
    /// A frame services at most one pending pick, steps the orbit controls,
    /// animates proxies and presents the projected scene.
    pub fn advance(&mut self, now: Instant) -> FrameOutcome {
        if self.state == ViewportState::Unmounted {
            return FrameOutcome::Stopped;
        }

        if self.resize.poll(now) {
            self.recompute_size();
        }

        if !self.scheduler.try_begin_frame(now) {
            return if self.scheduler.is_cancelled() {
                FrameOutcome::Stopped
            } else {
                FrameOutcome::Skipped
            };
        }

        if let Some(request) = self.picks.take() {
            let hit = self.scene.as_ref().and_then(|scene| {
                picking::pick(request.x, request.y, request.viewport, &self.camera, scene)
            });
            self.set_selection(hit);
        }

        self.controls.update(&mut self.camera, self.scheduler.frame_gap());

        let flags = self.animation_flags();
        let Some(scene) = self.scene.as_mut() else {
            return FrameOutcome::Stopped;
        };
        let elapsed = now.saturating_duration_since(self.mounted_at).as_secs_f32();
        scheduler::animate(scene, elapsed, &self.animation, flags);

        let frame = render::project_scene(scene, &self.camera, self.selected.as_ref());
        self.surface.present(frame);

        FrameOutcome::Rendered
    }

    /// Select a node by id, or clear the selection with None
    ///
    /// Returns false, changing nothing, for an id not in the scene.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        if self.state == ViewportState::Unmounted {
            return false;
        }
        let next = match id {
            Some(id) => match self.scene.as_ref().and_then(|scene| scene.proxy(id)) {
                Some(proxy) => Some(proxy.id.clone()),
                None => return false,
            },
            None => None,
        };
        self.set_selection(next);
        true
    }

    /// Swap in a scene built from a new graph snapshot
    ///
    /// The old scene is disposed first. A selection that no longer exists in
    /// the new scene is cleared.
    pub fn rebuild(&mut self, scene: SceneHandle) {
        if self.state == ViewportState::Unmounted {
            return;
        }

        if let Some(mut old) = self.scene.take() {
            old.dispose();
        }

        let keep_selection = self
            .selected
            .as_ref()
            .is_some_and(|id| scene.proxy(id.as_str()).is_some());

        tracing::debug!(
            nodes = scene.proxies().len(),
            edges = scene.edges().len(),
            "Rebuilt scene"
        );
        self.scene = Some(scene);

        if !keep_selection {
            self.set_selection(None);
        }
    }

    /// Unmount: stop the scheduler, detach listeners, dispose the scene,
    /// detach output
    ///
    /// The scheduler always stops before disposal. Calling this on an
    /// unmounted viewport does nothing.
    pub fn teardown(&mut self) {
        if self.state == ViewportState::Unmounted {
            return;
        }

        self.scheduler.cancel();
        self.surface.detach_listeners();
        if let Some(mut scene) = self.scene.take() {
            scene.dispose();
        }
        self.surface.detach_output();

        self.picks.clear();
        self.resize.cancel();
        self.drag = None;
        self.selected = None;
        self.state = ViewportState::Unmounted;

        tracing::info!(
            frames = self.scheduler.frames(),
            coalesced_picks = self.picks.coalesced(),
            resize_recomputes = self.resize_recomputes,
            "Tore down viewport"
        );
    }

    /// Queue an orbit as if dragged by (dx, dy) pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.controls.rotate(dx, dy, self.size);
    }

    /// Zoom by wheel notches; positive zooms in
    pub fn zoom(&mut self, notches: f32) {
        self.controls.zoom(notches);
    }

    pub fn reset_camera(&mut self) {
        self.controls.reset(&mut self.camera);
    }

    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.scheduler.set_target_fps(target_fps);
    }

    /// Turn idle rotation and pulse on or off; also clears any automatic
    /// reduction
    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.animations_enabled = enabled;
        self.scheduler.reset_reduction();
    }

    /// Time until `advance` has work to do, or None once stopped
    pub fn time_until_next_frame(&self, now: Instant) -> Option<Duration> {
        let frame = self.scheduler.time_until_next_frame(now)?;
        let resize = self
            .resize
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(now));
        Some(resize.map_or(frame, |resize| resize.min(frame)))
    }

    #[cfg(test)]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[cfg(test)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[cfg(test)]
    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }

    #[cfg(test)]
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Whether slow frames have reduced animation
    pub fn is_animation_reduced(&self) -> bool {
        self.scheduler.is_reduced()
    }

    /// Number of debounced size recomputes applied
    #[cfg(test)]
    pub fn resize_recomputes(&self) -> u64 {
        self.resize_recomputes
    }

    fn animation_flags(&self) -> AnimationFlags {
        if !self.animations_enabled {
            AnimationFlags::NONE
        } else if self.scheduler.is_reduced() {
            // Keep the pulse: it carries status, rotation is decoration
            AnimationFlags {
                idle_rotation: false,
                pulse: true,
            }
        } else {
            AnimationFlags::ALL
        }
    }

    fn recompute_size(&mut self) {
        let size = self.surface.size();
        self.size = size;
        self.camera.set_aspect(size.aspect());
        self.surface.resize_output(size);
        self.resize_recomputes += 1;

        tracing::debug!(
            width = size.width,
            height = size.height,
            "Applied debounced resize"
        );
    }

    fn set_selection(&mut self, next: Option<NodeId>) {
        if self.selected == next {
            return;
        }
        self.selected = next;
        tracing::debug!(selected = ?self.selected, "Selection changed");
        (self.on_selection_change)(self.selected.as_ref());
    }
}

impl<S: HostSurface> Drop for ViewportHandle<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
