// Application configuration types
//
// This module contains configuration structs and constants for:
// - The visualizer itself (frame rate, debounce, camera, animation)
// - Runtime frame-rate adjustment
// - Display toggles

use crate::camera::DAMPING_FACTOR;
use crate::scheduler::{AnimationConfig, DEFAULT_TARGET_FPS};
use crate::viewport::debounce::RESIZE_DEBOUNCE;
use glam::Vec3;
use std::time::{Duration, Instant};

// ============================================================================
// Constants
// ============================================================================

/// Lowest selectable frame-rate ceiling
pub const MIN_TARGET_FPS: u32 = 5;

/// Highest selectable frame-rate ceiling
pub const MAX_TARGET_FPS: u32 = 60;

/// Frame-rate adjustment step
pub const FPS_STEP: u32 = 5;

/// Duration to highlight a recently changed frame rate
pub const CHANGE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(500);

/// Number of selection changes kept in the activity log
pub const SELECTION_LOG_CAPACITY: usize = 50;

/// Horizontal drag, in viewport pixels, applied per orbit key press
pub const KEY_ORBIT_PIXELS: f32 = 4.0;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Camera pose and projection at mount time
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Everything a viewport needs at mount
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    /// Frame-rate ceiling for the render loop
    pub target_fps: u32,
    /// Quiet period before a resize burst is applied
    pub resize_debounce: Duration,
    /// Share of pending orbit input applied per sixtieth of a second
    pub damping: f32,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            resize_debounce: RESIZE_DEBOUNCE,
            damping: DAMPING_FACTOR,
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Runtime frame-rate setting, adjustable from the keyboard
#[derive(Debug, Clone)]
pub struct FrameRateConfig {
    pub target_fps: u32,

    /// Timestamp of last change (for visual feedback)
    pub last_change: Option<Instant>,
}

impl FrameRateConfig {
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_fps: target_fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS),
            last_change: None,
        }
    }

    pub fn increase(&mut self, now: Instant) {
        self.target_fps = (self.target_fps + FPS_STEP).min(MAX_TARGET_FPS);
        self.last_change = Some(now);
    }

    pub fn decrease(&mut self, now: Instant) {
        self.target_fps = self
            .target_fps
            .saturating_sub(FPS_STEP)
            .max(MIN_TARGET_FPS);
        self.last_change = Some(now);
    }

    pub fn recently_changed(&self, now: Instant) -> bool {
        self.last_change
            .is_some_and(|at| now.saturating_duration_since(at) < CHANGE_HIGHLIGHT_DURATION)
    }
}

impl Default for FrameRateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

/// Visual toggles for the map panel
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    /// Idle rotation and status pulse (toggle with 'a')
    pub animations_enabled: bool,

    /// Node name and IP next to each node (toggle with 't')
    pub labels_enabled: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            labels_enabled: true,
        }
    }
}
