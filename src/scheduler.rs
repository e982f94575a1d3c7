// Render loop scheduler
//
// Gates frames to a target rate and applies the per-frame animation step.
// Time always comes in as an explicit parameter so the loop can be driven by
// synthetic timestamps. The scheduler is the single cancellation point for
// per-frame work: once cancelled it never begins another frame.

use crate::scene::SceneHandle;
use glam::Vec2;
use std::time::{Duration, Instant};

/// Default frame-rate ceiling
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Frame gap that counts as slow for automatic animation reduction
pub const FRAME_TIME_THRESHOLD: Duration = Duration::from_millis(100);

/// Consecutive slow frames before animation is reduced
pub const SLOW_FRAME_COUNT_THRESHOLD: u32 = 5;

// ============================================================================
// Animation
// ============================================================================

/// Tunables for idle rotation and status pulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Radians added per frame around the x and y axes
    pub rotation_step: Vec2,
    /// Center of the pulse
    pub pulse_base: f32,
    /// Pulse swing above and below the base
    pub pulse_amplitude: f32,
    /// Pulse angular rate in radians per second
    pub pulse_rate: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_step: Vec2::new(0.005, 0.01),
            pulse_base: 0.3,
            pulse_amplitude: 0.2,
            pulse_rate: 3.0,
        }
    }
}

/// Which parts of the animation step run this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFlags {
    pub idle_rotation: bool,
    pub pulse: bool,
}

impl AnimationFlags {
    pub const ALL: AnimationFlags = AnimationFlags {
        idle_rotation: true,
        pulse: true,
    };
    pub const NONE: AnimationFlags = AnimationFlags {
        idle_rotation: false,
        pulse: false,
    };
}

/// Pulse intensity at `elapsed` seconds
pub fn pulse_intensity(elapsed: f32, config: &AnimationConfig) -> f32 {
    config.pulse_base + (elapsed * config.pulse_rate).sin() * config.pulse_amplitude
}

/// Advance every proxy by one frame
///
/// Idle rotation is a fixed per-frame increment. Proxies whose style pulses
/// get their emphasis from wall-clock time; all others rest at their base.
pub fn animate(
    scene: &mut SceneHandle,
    elapsed: f32,
    config: &AnimationConfig,
    flags: AnimationFlags,
) {
    let pulse = pulse_intensity(elapsed, config);

    for proxy in scene.proxies_mut() {
        if flags.idle_rotation {
            proxy.rotation += config.rotation_step;
        }
        proxy.emphasis = if flags.pulse && proxy.style.pulse {
            pulse
        } else {
            proxy.style.base_emphasis
        };
    }
}

// ============================================================================
// Frame gating
// ============================================================================

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    last_frame: Option<Instant>,
    last_gap: Duration,
    cancelled: bool,
    frames: u64,
    slow_frame_count: u32,
    reduced: bool,
}

impl FrameScheduler {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: fps_interval(target_fps),
            last_frame: None,
            last_gap: fps_interval(target_fps),
            cancelled: false,
            frames: 0,
            slow_frame_count: 0,
            reduced: false,
        }
    }

    /// Minimum time between two frames
    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.interval = fps_interval(target_fps);
    }

    /// Decide whether a frame runs at `now`
    ///
    /// A frame runs only if at least one interval has passed since the last
    /// one that ran. Frames may come slower than the target, never faster.
    pub fn try_begin_frame(&mut self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }

        if let Some(last) = self.last_frame {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                return false;
            }
            self.track_frame_gap(elapsed);
            self.last_gap = elapsed;
        }

        self.last_frame = Some(now);
        self.frames += 1;
        true
    }

    /// How long the host may sleep before the next frame is due
    ///
    /// None once cancelled.
    pub fn time_until_next_frame(&self, now: Instant) -> Option<Duration> {
        if self.cancelled {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        })
    }

    /// Time covered by the frame that began last
    ///
    /// The first frame counts as one interval long.
    pub fn frame_gap(&self) -> Duration {
        self.last_gap
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Frames begun since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether slow frames have switched animation to reduced mode
    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Let the next frames try full animation again
    pub fn reset_reduction(&mut self) {
        self.reduced = false;
        self.slow_frame_count = 0;
    }

    fn track_frame_gap(&mut self, gap: Duration) {
        if gap > FRAME_TIME_THRESHOLD {
            self.slow_frame_count += 1;

            if self.slow_frame_count >= SLOW_FRAME_COUNT_THRESHOLD && !self.reduced {
                self.reduced = true;
                tracing::info!(
                    frame_gap_ms = gap.as_millis() as u64,
                    slow_frame_count = self.slow_frame_count,
                    "Reducing animation due to slow frames"
                );
            }
        } else if !self.reduced {
            self.slow_frame_count = 0;
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

fn fps_interval(target_fps: u32) -> Duration {
    Duration::from_secs(1) / target_fps.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{build, style::BASE_EMPHASIS, ResourceLedger};
    use crate::topology::{build_graph, NetworkNode, NodeCategory, NodeStatus};
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_runs_immediately() {
        let mut scheduler = FrameScheduler::new(30);
        let now = Instant::now();
        assert_eq!(scheduler.time_until_next_frame(now), Some(Duration::ZERO));
        assert!(scheduler.try_begin_frame(now));
        assert!(!scheduler.try_begin_frame(now));
        assert!(!scheduler.try_begin_frame(now + Duration::from_millis(20)));
        assert!(scheduler.try_begin_frame(now + Duration::from_millis(34)));
        assert_eq!(scheduler.frames(), 2);
    }

    #[test]
    fn test_frame_gap_tracks_started_frames() {
        let mut scheduler = FrameScheduler::new(30);
        let now = Instant::now();
        assert!(scheduler.try_begin_frame(now));
        assert_eq!(scheduler.frame_gap(), scheduler.interval());

        assert!(!scheduler.try_begin_frame(now + Duration::from_millis(10)));
        assert!(scheduler.try_begin_frame(now + Duration::from_millis(70)));
        assert_eq!(scheduler.frame_gap(), Duration::from_millis(70));
    }

    #[test]
    fn test_interval_from_fps() {
        assert_eq!(FrameScheduler::new(30).interval(), Duration::from_secs(1) / 30);
        // Zero fps is clamped rather than dividing by zero
        assert_eq!(FrameScheduler::new(0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_cancelled_scheduler_never_runs() {
        let mut scheduler = FrameScheduler::new(30);
        let start = Instant::now();
        assert!(scheduler.try_begin_frame(start));

        scheduler.cancel();
        assert!(scheduler.is_cancelled());
        assert_eq!(scheduler.time_until_next_frame(start), None);
        for i in 1..10 {
            assert!(!scheduler.try_begin_frame(start + Duration::from_secs(i)));
        }
        assert_eq!(scheduler.frames(), 1);
    }

    #[test]
    fn test_slow_frames_reduce_animation() {
        let mut scheduler = FrameScheduler::new(30);
        let mut now = Instant::now();
        scheduler.try_begin_frame(now);

        for _ in 0..SLOW_FRAME_COUNT_THRESHOLD {
            now += Duration::from_millis(250);
            assert!(scheduler.try_begin_frame(now));
        }
        assert!(scheduler.is_reduced());

        // Fast frames do not undo the reduction on their own
        for _ in 0..10 {
            now += Duration::from_millis(40);
            scheduler.try_begin_frame(now);
        }
        assert!(scheduler.is_reduced());

        scheduler.reset_reduction();
        assert!(!scheduler.is_reduced());
    }

    #[test]
    fn test_isolated_slow_frame_does_not_reduce() {
        let mut scheduler = FrameScheduler::new(30);
        let mut now = Instant::now();
        scheduler.try_begin_frame(now);

        for i in 0..20 {
            now += if i % 2 == 0 {
                Duration::from_millis(250)
            } else {
                Duration::from_millis(40)
            };
            scheduler.try_begin_frame(now);
        }
        assert!(!scheduler.is_reduced());
    }

    fn pulse_scene() -> (SceneHandle, ResourceLedger) {
        let ledger = ResourceLedger::new();
        let graph = build_graph(vec![
            NetworkNode::new("S", "Server", NodeCategory::Server, NodeStatus::Compromised, [-2.0, -2.0, 0.0]),
            NetworkNode::new("R", "Router", NodeCategory::Router, NodeStatus::Secure, [0.0, 0.0, 0.0])
                .with_connections(["S"]),
        ])
        .unwrap();
        let scene = build(&graph, &ledger).unwrap();
        (scene, ledger)
    }

    #[test]
    fn test_compromised_pulses_secure_stays_constant() {
        let (mut scene, _ledger) = pulse_scene();
        let config = AnimationConfig::default();
        let mut scheduler = FrameScheduler::new(30);
        let start = Instant::now();

        let mut compromised = Vec::new();
        let mut secure = Vec::new();
        let mut now = start;
        while now <= start + Duration::from_millis(1200) {
            if scheduler.try_begin_frame(now) {
                let elapsed = now.duration_since(start).as_secs_f32();
                animate(&mut scene, elapsed, &config, AnimationFlags::ALL);
                compromised.push(scene.proxy("S").unwrap().emphasis);
                secure.push(scene.proxy("R").unwrap().emphasis);
            }
            now += Duration::from_millis(5);
        }

        assert!(compromised.len() > 30);
        let min = compromised.iter().cloned().fold(f32::MAX, f32::min);
        let max = compromised.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.1, "pulse range too small: {}..{}", min, max);
        assert!(min >= 0.1 - 1e-6 && max <= 0.5 + 1e-6);
        assert!(secure.iter().all(|e| *e == BASE_EMPHASIS));
    }

    #[test]
    fn test_idle_rotation_accumulates_per_frame() {
        let (mut scene, _ledger) = pulse_scene();
        let config = AnimationConfig::default();
        for frame in 0..10 {
            animate(&mut scene, frame as f32 / 30.0, &config, AnimationFlags::ALL);
        }
        let rotation = scene.proxies()[0].rotation;
        assert!((rotation.y - 0.1).abs() < 1e-5);
        assert!((rotation.x - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_disabled_animation_rests_at_base() {
        let (mut scene, _ledger) = pulse_scene();
        let config = AnimationConfig::default();
        animate(&mut scene, 0.5, &config, AnimationFlags::ALL);
        animate(&mut scene, 0.6, &config, AnimationFlags::NONE);

        let server = scene.proxy("S").unwrap();
        assert_eq!(server.emphasis, server.style.base_emphasis);
        assert!((server.rotation.y - 0.01).abs() < 1e-6);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Over any stretch of wall-clock time, frames never exceed the
        /// ceiling by more than one.
        #[test]
        fn prop_frame_ceiling(
            fps in 1u32..120,
            steps in proptest::collection::vec(0u64..40, 1..400),
        ) {
            let mut scheduler = FrameScheduler::new(fps);
            let start = Instant::now();
            let mut now = start;
            let mut ran = 0u64;

            for step in steps {
                now += Duration::from_millis(step);
                if scheduler.try_begin_frame(now) {
                    ran += 1;
                }
            }

            let interval = now.duration_since(start).as_secs_f64();
            let ceiling = interval * fps as f64;
            // Integer-nanosecond intervals run a hair short of 1/fps
            prop_assert!(ran as f64 <= ceiling + 1.0 + 1e-3, "ran {} frames, ceiling {}", ran, ceiling);
        }
    }
}
