//! Pull-to-Refresh Controller
//!
//! Turns a vertical drag on a scrollable surface into a bounded, damped
//! "pull distance" and fires a background refresh when the pull is released
//! past the activation threshold:
//! - Idle → Dragging: pointer down while the surface is scrolled to the top
//! - Dragging ⇄ ThresholdMet: pull distance crosses the activation threshold
//! - ThresholdMet → Refreshing: pointer released past the threshold
//! - Refreshing → Idle: refresh task settles (success, failure or panic)
//!
//! The refresh task runs on a worker thread. Its result comes back over a
//! channel that the UI thread drains with [`GestureRefreshController::poll`],
//! the same way page loads are delivered to the app shell.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use super::touch::PointerEvent;

/// Failure reported by a refresh task.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshError {
    pub message: String,
}

impl RefreshError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RefreshError {}

/// Invalid controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Refresh task signature: no arguments, no value, may fail.
pub type RefreshFn = dyn Fn() -> Result<(), RefreshError> + Send + Sync + 'static;

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshConfig {
    /// Pull distance required at release to trigger a refresh
    pub activation_threshold: f32,
    /// Visual cap on the pull distance
    pub max_pull_distance: f32,
    /// Multiplier applied to the raw drag (rubber-band resistance)
    pub damping_factor: f32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 80.0,
            max_pull_distance: 120.0,
            damping_factor: 0.5,
        }
    }
}

impl RefreshConfig {
    pub fn with_activation_threshold(mut self, threshold: f32) -> Self {
        self.activation_threshold = threshold;
        self
    }

    pub fn with_max_pull_distance(mut self, max: f32) -> Self {
        self.max_pull_distance = max;
        self
    }

    pub fn with_damping_factor(mut self, damping: f32) -> Self {
        self.damping_factor = damping;
        self
    }

    /// Check that the threshold is reachable and the damping is a resistance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.activation_threshold.is_finite() || self.activation_threshold <= 0.0 {
            return Err(ConfigError {
                field: "activation_threshold",
                message: format!("must be positive, got {}", self.activation_threshold),
            });
        }
        if !self.max_pull_distance.is_finite()
            || self.max_pull_distance < self.activation_threshold
        {
            return Err(ConfigError {
                field: "max_pull_distance",
                message: format!(
                    "must be at least the activation threshold ({}), got {}",
                    self.activation_threshold, self.max_pull_distance
                ),
            });
        }
        if !self.damping_factor.is_finite()
            || self.damping_factor <= 0.0
            || self.damping_factor > 1.0
        {
            return Err(ConfigError {
                field: "damping_factor",
                message: format!("must be in (0, 1], got {}", self.damping_factor),
            });
        }
        Ok(())
    }
}

/// Observable triple for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PullState {
    /// Damped drag distance; held at the activation threshold while refreshing
    pub pull_distance: f32,
    pub is_refreshing: bool,
    /// `pull_distance / activation_threshold`, clamped to [0, 1]
    pub pull_progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Dragging,
    ThresholdMet,
    Refreshing,
}

/// How a refresh settled. Surfacing failures is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed,
    Failed(RefreshError),
}

impl RefreshOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RefreshOutcome::Failed(_))
    }
}

/// Pointer data for the gesture in progress.
#[derive(Debug, Clone, Copy)]
struct GestureSample {
    start_y: f32,
    last_y: f32,
    /// Scroll offset when the gesture began; non-zero means "not ours"
    scroll_top: f32,
}

impl GestureSample {
    fn tracks_pull(&self) -> bool {
        self.scroll_top <= 0.0
    }
}

/// Handle returned by [`GestureRefreshController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&PullState)>;
type Waker = Arc<dyn Fn() + Send + Sync>;

/// Pull-to-refresh gesture state machine.
///
/// Owned by the UI thread. Pointer handlers never block; the refresh task is
/// the only work that leaves this thread.
pub struct GestureRefreshController {
    config: RefreshConfig,
    refresh: Arc<RefreshFn>,
    state: PullState,
    phase: RefreshPhase,
    gesture: Option<GestureSample>,
    refresh_rx: Option<mpsc::Receiver<Result<(), RefreshError>>>,
    waker: Option<Waker>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl GestureRefreshController {
    /// Create a controller with a validated config and a refresh task.
    pub fn new<F>(config: RefreshConfig, refresh: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<(), RefreshError> + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            refresh: Arc::new(refresh),
            state: PullState::default(),
            phase: RefreshPhase::Idle,
            gesture: None,
            refresh_rx: None,
            waker: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Called from the worker thread after the refresh result is sent,
    /// typically `egui::Context::request_repaint`.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn state(&self) -> PullState {
        self.state
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn pull_distance(&self) -> f32 {
        self.state.pull_distance
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.is_refreshing
    }

    pub fn pull_progress(&self) -> f32 {
        self.state.pull_progress
    }

    /// Whether a pointer gesture is currently being tracked.
    pub fn is_tracking(&self) -> bool {
        self.gesture.is_some()
    }

    /// Register a callback invoked with the new state after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(&PullState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Dispatch a normalized pointer event.
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { y, scroll_top, .. } => self.pointer_down(y, scroll_top),
            PointerEvent::Move { y, .. } => self.pointer_move(y),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Cancel { .. } => self.pointer_cancel(),
        }
    }

    /// Begin a gesture. Only a surface scrolled to its top edge can be pulled.
    pub fn pointer_down(&mut self, y: f32, scroll_top: f32) {
        if !y.is_finite() || !scroll_top.is_finite() {
            return;
        }
        self.gesture = Some(GestureSample {
            start_y: y,
            last_y: y,
            scroll_top,
        });

        if self.phase == RefreshPhase::Refreshing {
            log::debug!("pointer down during refresh, gesture recorded without effect");
            return;
        }
        if scroll_top > 0.0 {
            log::trace!("pointer down at scroll offset {}, not pulling", scroll_top);
            // A pull whose release never arrived must not carry over
            if matches!(self.phase, RefreshPhase::Dragging | RefreshPhase::ThresholdMet) {
                self.reset_to_idle();
            }
            return;
        }
        self.set_phase(RefreshPhase::Dragging);
        self.set_pull_distance(0.0);
    }

    /// Track the drag. Cheap enough to run at pointer-move frequency.
    pub fn pointer_move(&mut self, y: f32) {
        if !y.is_finite() {
            return;
        }
        let Some(sample) = self.gesture.as_mut() else {
            return;
        };
        sample.last_y = y;
        let sample = *sample;

        if self.phase == RefreshPhase::Refreshing || !sample.tracks_pull() {
            return;
        }

        let raw = sample.last_y - sample.start_y;
        let distance = if raw <= 0.0 {
            0.0
        } else {
            (raw * self.config.damping_factor).min(self.config.max_pull_distance)
        };

        if distance >= self.config.activation_threshold {
            self.set_phase(RefreshPhase::ThresholdMet);
        } else {
            self.set_phase(RefreshPhase::Dragging);
        }
        self.set_pull_distance(distance);
    }

    /// Release: refresh if the threshold was met, otherwise spring back.
    pub fn pointer_up(&mut self) {
        if self.gesture.take().is_none() {
            return;
        }
        match self.phase {
            RefreshPhase::ThresholdMet => self.start_refresh(),
            RefreshPhase::Dragging => {
                log::debug!(
                    "released below threshold ({:.1} < {:.1})",
                    self.state.pull_distance,
                    self.config.activation_threshold
                );
                self.reset_to_idle();
            }
            RefreshPhase::Idle | RefreshPhase::Refreshing => {}
        }
    }

    /// The platform took the gesture away; never refreshes.
    pub fn pointer_cancel(&mut self) {
        if self.gesture.take().is_none() {
            return;
        }
        if matches!(self.phase, RefreshPhase::Dragging | RefreshPhase::ThresholdMet) {
            log::debug!("gesture cancelled at pull distance {:.1}", self.state.pull_distance);
            self.reset_to_idle();
        }
    }

    /// The surface is going away mid-gesture: discard it like a cancel.
    /// An in-flight refresh keeps running; the caller drops its result along
    /// with the controller.
    pub fn detach(&mut self) {
        self.pointer_cancel();
    }

    /// Drain the refresh result, if it has arrived. Call once per frame.
    pub fn poll(&mut self) -> Option<RefreshOutcome> {
        let rx = self.refresh_rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(RefreshError::new("refresh task terminated without a result"))
            }
        };
        Some(self.finish_refresh(result))
    }

    /// Block until the in-flight refresh settles or `timeout` elapses.
    /// Returns `None` when nothing is in flight or on timeout.
    pub fn wait_for_refresh(&mut self, timeout: Duration) -> Option<RefreshOutcome> {
        let rx = self.refresh_rx.as_ref()?;
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => {
                Err(RefreshError::new("refresh task terminated without a result"))
            }
        };
        Some(self.finish_refresh(result))
    }

    fn start_refresh(&mut self) {
        if self.refresh_rx.is_some() {
            return;
        }
        log::info!(
            "pull released at {:.1}, starting refresh",
            self.state.pull_distance
        );

        let (tx, rx) = mpsc::channel();
        self.refresh_rx = Some(rx);

        let refresh = Arc::clone(&self.refresh);
        let waker = self.waker.clone();
        std::thread::spawn(move || {
            let result = refresh();
            // Receiver is gone if the surface was torn down
            let _ = tx.send(result);
            if let Some(wake) = waker {
                wake();
            }
        });

        // Park the pull at the threshold while the spinner runs
        self.phase = RefreshPhase::Refreshing;
        self.state.pull_distance = self.config.activation_threshold;
        self.state.pull_progress = 1.0;
        self.state.is_refreshing = true;
        self.notify();
    }

    fn finish_refresh(&mut self, result: Result<(), RefreshError>) -> RefreshOutcome {
        self.refresh_rx = None;
        // Gestures recorded during the refresh do not survive it
        self.gesture = None;

        let outcome = match result {
            Ok(()) => {
                log::info!("refresh completed");
                RefreshOutcome::Completed
            }
            Err(e) => {
                log::warn!("refresh failed: {}", e);
                RefreshOutcome::Failed(e)
            }
        };

        self.phase = RefreshPhase::Idle;
        self.state = PullState::default();
        self.notify();
        outcome
    }

    fn reset_to_idle(&mut self) {
        self.set_phase(RefreshPhase::Idle);
        self.set_pull_distance(0.0);
    }

    fn set_phase(&mut self, phase: RefreshPhase) {
        if self.phase != phase {
            log::trace!("pull phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn set_pull_distance(&mut self, distance: f32) {
        let progress = (distance / self.config.activation_threshold).clamp(0.0, 1.0);
        if self.state.pull_distance == distance && self.state.pull_progress == progress {
            return;
        }
        self.state.pull_distance = distance;
        self.state.pull_progress = progress;
        self.notify();
    }

    fn notify(&mut self) {
        let state = self.state;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&state);
        }
    }
}
