//! Swipe-to-act Gesture Tracking
//!
//! Turns raw single-touch events into a horizontal swipe with a clamped
//! offset, or hands the gesture back to the platform as a vertical scroll:
//! - Axis lock decided once, on the first move (ties go to scroll)
//! - Offset clamped to `±max_swipe`
//! - Progress normalized against `threshold`, clamped to [0, 1]
//! - Release past `threshold` fires the callback for that direction

use std::fmt;
use std::rc::Rc;

use super::capability::{self, Capabilities, NoCapabilities};

/// Length of the haptic pulse sent on a committed swipe.
pub const HAPTIC_PULSE_MS: u32 = 10;

/// Touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// First active contact of a touch list. Extra contacts are ignored.
    pub fn first(points: &[TouchPoint]) -> Option<TouchPoint> {
        points.first().copied()
    }

    /// Non-finite coordinates count as missing data.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    None,
}

/// One-time classification of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    Undetermined,
    Horizontal,
    Vertical,
}

/// What the host must do with the move event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResponse {
    /// No gesture is live; nothing to do.
    Ignored,
    /// Vertical gesture: let the platform scroll.
    Scroll,
    /// Horizontal gesture: suppress the platform's default scrolling.
    Swipe,
}

impl MoveResponse {
    pub fn suppresses_scroll(self) -> bool {
        self == MoveResponse::Swipe
    }
}

/// Tracker thresholds, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Minimum horizontal distance at release to fire a callback
    pub threshold: f32,
    /// Maximum magnitude of the visual offset
    pub max_swipe: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            max_swipe: 120.0,
        }
    }
}

/// Per-gesture state. Zeroed on every begin and after every end/cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureState {
    start_x: f32,
    start_y: f32,
    current_x: f32,
    current_y: f32,
    swiping: bool,
    direction: SwipeDirection,
    axis_lock: AxisLock,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            current_x: 0.0,
            current_y: 0.0,
            swiping: false,
            direction: SwipeDirection::None,
            axis_lock: AxisLock::Undetermined,
        }
    }
}

type SwipeCallback = Box<dyn FnMut()>;

/// Swipe gesture state machine.
///
/// Single-threaded and single-touch: one instance tracks at most one live
/// gesture. Events must arrive in order `begin`, zero or more `update`,
/// then exactly one of `end` / `cancel`.
pub struct SwipeTracker {
    config: SwipeConfig,
    state: GestureState,
    on_swipe_left: Option<SwipeCallback>,
    on_swipe_right: Option<SwipeCallback>,
    capabilities: Rc<dyn Capabilities>,
}

impl SwipeTracker {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
            on_swipe_left: None,
            on_swipe_right: None,
            capabilities: Rc::new(NoCapabilities),
        }
    }

    /// Register the left-swipe callback. Without one, left swipes never commit.
    pub fn on_swipe_left(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_swipe_left = Some(Box::new(callback));
        self
    }

    /// Register the right-swipe callback. Without one, right swipes never commit.
    pub fn on_swipe_right(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_swipe_right = Some(Box::new(callback));
        self
    }

    /// Provider used for the haptic pulse on commit.
    pub fn with_capabilities(mut self, capabilities: Rc<dyn Capabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn config(&self) -> SwipeConfig {
        self.config
    }

    /// Process touch start. An invalid point starts nothing and drops any
    /// gesture still open.
    pub fn begin(&mut self, point: TouchPoint) {
        if !point.is_valid() {
            self.state = GestureState::default();
            return;
        }
        self.state = GestureState {
            start_x: point.x,
            start_y: point.y,
            current_x: point.x,
            current_y: point.y,
            swiping: true,
            direction: SwipeDirection::None,
            axis_lock: AxisLock::Undetermined,
        };
    }

    /// Process touch move. The caller must honor the returned [`MoveResponse`].
    pub fn update(&mut self, point: TouchPoint) -> MoveResponse {
        if !self.state.swiping || !point.is_valid() {
            return MoveResponse::Ignored;
        }

        let delta_x = point.x - self.state.start_x;
        let delta_y = point.y - self.state.start_y;

        if self.state.axis_lock == AxisLock::Undetermined {
            // Equal magnitudes lock to vertical: scroll wins ties.
            self.state.axis_lock = if delta_y.abs() >= delta_x.abs() {
                AxisLock::Vertical
            } else {
                AxisLock::Horizontal
            };
            log::trace!(
                "axis locked to {:?} (dx={:.1}, dy={:.1})",
                self.state.axis_lock,
                delta_x,
                delta_y
            );
        }

        match self.state.axis_lock {
            AxisLock::Horizontal => {
                let max = self.config.max_swipe.max(0.0);
                let clamped_x = delta_x.clamp(-max, max);
                self.state.current_x = self.state.start_x + clamped_x;
                self.state.current_y = point.y;
                self.state.direction = if clamped_x < 0.0 {
                    SwipeDirection::Left
                } else if clamped_x > 0.0 {
                    SwipeDirection::Right
                } else {
                    SwipeDirection::None
                };
                MoveResponse::Swipe
            }
            _ => {
                self.state.current_y = point.y;
                MoveResponse::Scroll
            }
        }
    }

    /// Process touch end. Returns the direction whose callback fired.
    pub fn end(&mut self) -> Option<SwipeDirection> {
        if !self.state.swiping {
            return None;
        }

        let delta_x = self.state.current_x - self.state.start_x;
        let mut fired = None;

        if delta_x.abs() >= self.config.threshold && delta_x != 0.0 {
            capability::pulse(self.capabilities.as_ref(), HAPTIC_PULSE_MS);

            let (direction, callback) = if delta_x < 0.0 {
                (SwipeDirection::Left, self.on_swipe_left.as_mut())
            } else {
                (SwipeDirection::Right, self.on_swipe_right.as_mut())
            };
            if let Some(callback) = callback {
                log::debug!("swipe committed: {:?} ({:.1}px)", direction, delta_x);
                callback();
                fired = Some(direction);
            }
        }

        self.state = GestureState::default();
        fired
    }

    /// Process touch cancel. Never fires a callback.
    pub fn cancel(&mut self) {
        if self.state.swiping {
            log::trace!("gesture cancelled");
        }
        self.state = GestureState::default();
    }

    /// Clamped horizontal displacement; 0 unless a horizontal swipe is live.
    pub fn offset(&self) -> f32 {
        if !self.state.swiping || self.state.axis_lock != AxisLock::Horizontal {
            return 0.0;
        }
        self.state.current_x - self.state.start_x
    }

    /// `|offset| / threshold`, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        if self.config.threshold <= 0.0 {
            return if self.offset() != 0.0 { 1.0 } else { 0.0 };
        }
        (self.offset().abs() / self.config.threshold).min(1.0)
    }

    pub fn direction(&self) -> SwipeDirection {
        self.state.direction
    }

    pub fn is_swiping(&self) -> bool {
        self.state.swiping
    }

    pub fn axis_lock(&self) -> AxisLock {
        self.state.axis_lock
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

impl fmt::Debug for SwipeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeTracker")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("left_enabled", &self.on_swipe_left.is_some())
            .field("right_enabled", &self.on_swipe_right.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mobile::capability::CapabilityError;
    use std::cell::{Cell, RefCell};

    fn counting_tracker() -> (SwipeTracker, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let left = Rc::new(Cell::new(0));
        let right = Rc::new(Cell::new(0));
        let l = left.clone();
        let r = right.clone();
        let tracker = SwipeTracker::default()
            .on_swipe_left(move || l.set(l.get() + 1))
            .on_swipe_right(move || r.set(r.get() + 1));
        (tracker, left, right)
    }

    fn p(x: f32, y: f32) -> TouchPoint {
        TouchPoint::new(x, y)
    }

    #[test]
    fn test_vertical_gesture_never_swipes() {
        let (mut t, left, right) = counting_tracker();
        t.begin(p(200.0, 400.0));
        assert_eq!(t.update(p(205.0, 430.0)), MoveResponse::Scroll);
        assert_eq!(t.axis_lock(), AxisLock::Vertical);
        // Later horizontal travel cannot re-lock the gesture
        assert_eq!(t.update(p(-300.0, 432.0)), MoveResponse::Scroll);
        assert_eq!(t.offset(), 0.0);
        assert_eq!(t.direction(), SwipeDirection::None);
        assert_eq!(t.end(), None);
        assert_eq!(left.get() + right.get(), 0);
    }

    #[test]
    fn test_tie_locks_vertical() {
        let mut t = SwipeTracker::default();
        t.begin(p(100.0, 100.0));
        assert_eq!(t.update(p(110.0, 110.0)), MoveResponse::Scroll);
        assert_eq!(t.axis_lock(), AxisLock::Vertical);
    }

    #[test]
    fn test_zero_first_move_locks_vertical() {
        let mut t = SwipeTracker::default();
        t.begin(p(100.0, 100.0));
        t.update(p(100.0, 100.0));
        assert_eq!(t.axis_lock(), AxisLock::Vertical);
    }

    #[test]
    fn test_horizontal_suppresses_scroll() {
        let mut t = SwipeTracker::default();
        t.begin(p(100.0, 100.0));
        let resp = t.update(p(130.0, 105.0));
        assert!(resp.suppresses_scroll());
        assert_eq!(t.axis_lock(), AxisLock::Horizontal);
        assert_eq!(t.direction(), SwipeDirection::Right);
        assert!((t.offset() - 30.0).abs() < 1e-6);
        // Vertical drift after the lock keeps the swipe
        assert!(t.update(p(140.0, 300.0)).suppresses_scroll());
        assert!((t.offset() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_offset_clamped_to_max_swipe() {
        let mut t = SwipeTracker::default();
        t.begin(p(0.0, 0.0));
        t.update(p(500.0, 0.0));
        assert!((t.offset() - 120.0).abs() < 1e-6);
        t.update(p(-500.0, 0.0));
        assert!((t.offset() + 120.0).abs() < 1e-6);
        assert_eq!(t.direction(), SwipeDirection::Left);
    }

    #[test]
    fn test_progress_scales_linearly() {
        let mut t = SwipeTracker::default();
        t.begin(p(0.0, 0.0));
        t.update(p(40.0, 0.0));
        assert!((t.progress() - 0.5).abs() < 1e-6);
        t.update(p(80.0, 0.0));
        assert!((t.progress() - 1.0).abs() < 1e-6);
        t.update(p(119.0, 0.0));
        assert!((t.progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_release_past_threshold_fires_left_once() {
        let (mut t, left, right) = counting_tracker();
        t.begin(p(200.0, 50.0));
        t.update(p(110.0, 50.0));
        assert_eq!(t.end(), Some(SwipeDirection::Left));
        assert_eq!(left.get(), 1);
        assert_eq!(right.get(), 0);
        assert!(!t.is_swiping());
        assert_eq!(t.offset(), 0.0);
        assert_eq!(t.axis_lock(), AxisLock::Undetermined);
    }

    #[test]
    fn test_release_at_exact_threshold_fires() {
        let (mut t, _left, right) = counting_tracker();
        t.begin(p(0.0, 0.0));
        t.update(p(80.0, 0.0));
        assert_eq!(t.end(), Some(SwipeDirection::Right));
        assert_eq!(right.get(), 1);
    }

    #[test]
    fn test_release_below_threshold_resets_without_firing() {
        let (mut t, left, right) = counting_tracker();
        t.begin(p(0.0, 0.0));
        t.update(p(70.0, 0.0));
        assert_eq!(t.end(), None);
        assert_eq!(left.get() + right.get(), 0);
        assert!(!t.is_swiping());
        assert_eq!(t.offset(), 0.0);
    }

    #[test]
    fn test_cancel_never_fires() {
        let (mut t, left, right) = counting_tracker();
        t.begin(p(0.0, 0.0));
        t.update(p(200.0, 0.0));
        t.cancel();
        assert_eq!(left.get() + right.get(), 0);
        assert!(!t.is_swiping());
        assert_eq!(t.end(), None);
    }

    #[test]
    fn test_missing_callback_disables_direction() {
        let right = Rc::new(Cell::new(0));
        let r = right.clone();
        let mut t = SwipeTracker::default().on_swipe_right(move || r.set(r.get() + 1));
        t.begin(p(200.0, 0.0));
        t.update(p(50.0, 0.0));
        assert_eq!(t.end(), None);
        assert_eq!(right.get(), 0);
    }

    #[test]
    fn test_no_active_gesture_is_noop() {
        let (mut t, left, right) = counting_tracker();
        assert_eq!(t.update(p(300.0, 0.0)), MoveResponse::Ignored);
        assert_eq!(t.end(), None);
        assert!(!t.is_swiping());
        assert_eq!(left.get() + right.get(), 0);
    }

    #[test]
    fn test_double_end_is_idempotent() {
        let (mut t, left, _right) = counting_tracker();
        t.begin(p(200.0, 0.0));
        t.update(p(100.0, 0.0));
        assert_eq!(t.end(), Some(SwipeDirection::Left));
        assert_eq!(t.end(), None);
        assert_eq!(left.get(), 1);
    }

    #[test]
    fn test_invalid_points_are_ignored() {
        let mut t = SwipeTracker::default();
        t.begin(p(f32::NAN, 0.0));
        assert!(!t.is_swiping());

        t.begin(p(0.0, 0.0));
        assert_eq!(t.update(p(f32::INFINITY, 0.0)), MoveResponse::Ignored);
        assert_eq!(t.axis_lock(), AxisLock::Undetermined);
        assert_eq!(t.end(), None);
    }

    #[test]
    fn test_invalid_begin_closes_open_gesture() {
        let (mut t, left, right) = counting_tracker();
        t.begin(p(0.0, 0.0));
        t.update(p(100.0, 0.0));
        assert!(t.is_swiping());

        t.begin(p(f32::NAN, f32::NAN));
        assert!(!t.is_swiping());
        assert_eq!(t.offset(), 0.0);
        assert_eq!(t.axis_lock(), AxisLock::Undetermined);
        assert_eq!(t.end(), None);
        assert_eq!(left.get() + right.get(), 0);
    }

    #[test]
    fn test_first_touch_only() {
        let touches = [p(10.0, 20.0), p(300.0, 300.0)];
        assert_eq!(TouchPoint::first(&touches), Some(p(10.0, 20.0)));
        assert_eq!(TouchPoint::first(&[]), None);
    }

    #[test]
    fn test_begin_restarts_gesture() {
        let mut t = SwipeTracker::default();
        t.begin(p(0.0, 0.0));
        t.update(p(0.0, 50.0));
        assert_eq!(t.axis_lock(), AxisLock::Vertical);
        t.begin(p(0.0, 0.0));
        assert_eq!(t.axis_lock(), AxisLock::Undetermined);
        assert!(t.update(p(50.0, 0.0)).suppresses_scroll());
    }

    struct RecordingHaptics {
        pulses: RefCell<Vec<u32>>,
        fail: bool,
    }

    impl Capabilities for RecordingHaptics {
        fn vibrate(&self, duration_ms: u32) -> Result<(), CapabilityError> {
            self.pulses.borrow_mut().push(duration_ms);
            if self.fail {
                Err(CapabilityError::Failed("motor busy".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_haptic_pulse_on_commit_only() {
        let haptics = Rc::new(RecordingHaptics { pulses: RefCell::new(Vec::new()), fail: false });
        let mut t = SwipeTracker::default()
            .on_swipe_right(|| {})
            .with_capabilities(haptics.clone());
        t.begin(p(0.0, 0.0));
        t.update(p(30.0, 0.0));
        t.end();
        assert!(haptics.pulses.borrow().is_empty());

        t.begin(p(0.0, 0.0));
        t.update(p(90.0, 0.0));
        t.end();
        assert_eq!(*haptics.pulses.borrow(), vec![HAPTIC_PULSE_MS]);
    }

    #[test]
    fn test_haptic_pulse_without_callback() {
        let haptics = Rc::new(RecordingHaptics { pulses: RefCell::new(Vec::new()), fail: false });
        let right = Rc::new(Cell::new(0));
        let r = right.clone();
        let mut t = SwipeTracker::default()
            .on_swipe_right(move || r.set(r.get() + 1))
            .with_capabilities(haptics.clone());
        t.begin(p(200.0, 0.0));
        t.update(p(100.0, 0.0));
        // Left has no callback: nothing fires, but the release still pulses
        assert_eq!(t.end(), None);
        assert_eq!(right.get(), 0);
        assert_eq!(*haptics.pulses.borrow(), vec![HAPTIC_PULSE_MS]);
        assert!(!t.is_swiping());
    }

    #[test]
    fn test_haptic_failure_is_swallowed() {
        let haptics = Rc::new(RecordingHaptics { pulses: RefCell::new(Vec::new()), fail: true });
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let mut t = SwipeTracker::default()
            .on_swipe_left(move || f.set(true))
            .with_capabilities(haptics);
        t.begin(p(100.0, 0.0));
        t.update(p(0.0, 0.0));
        assert_eq!(t.end(), Some(SwipeDirection::Left));
        assert!(fired.get());
    }
}
