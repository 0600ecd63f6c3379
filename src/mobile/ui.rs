//! Pull-to-Refresh Surface for egui
//!
//! ┌─────────────────────────┐
//! │          (◠)            │  ← Indicator (grows with the pull)
//! ├─────────────────────────┤
//! │                          │
//! │   Scrollable content     │  ← Pushed down by the pull distance
//! │                          │
//! └─────────────────────────┘
//!
//! Feeds primary-pointer input and the scroll offset of the wrapped
//! `ScrollArea` into a [`GestureRefreshController`] and paints the spinner.

use std::time::Instant;

use super::indicator::{ease_toward, indicator_style, IndicatorStyle, INDICATOR_SIZE};
use super::pull_refresh::{
    ConfigError, GestureRefreshController, RefreshConfig, RefreshError, RefreshOutcome,
};
use super::touch::{PointerEvent, TouchTracker, MOUSE_POINTER_ID};

/// Time for the content to spring back after a release below threshold.
pub const SPRING_BACK_SECS: f32 = 0.18;

/// Result of one frame of [`PullToRefresh::show`].
pub struct PullOutput<R> {
    pub inner: R,
    /// Set on the frame a refresh settles
    pub outcome: Option<RefreshOutcome>,
}

/// Scroll container with pull-to-refresh.
pub struct PullToRefresh {
    controller: GestureRefreshController,
    touches: TouchTracker,
    /// Scroll offset of the wrapped area, as of the previous frame
    scroll_top: f32,
    /// When the current refresh started (drives the spinner)
    refresh_started: Option<Instant>,
    /// Offset actually drawn; lags the pull distance after a release
    shown_offset: f32,
}

impl PullToRefresh {
    /// Build a surface whose refresh completion repaints `ctx`.
    pub fn new<F>(
        ctx: &egui::Context,
        config: RefreshConfig,
        refresh: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<(), RefreshError> + Send + Sync + 'static,
    {
        let repaint = ctx.clone();
        let controller = GestureRefreshController::new(config, refresh)?
            .with_waker(move || repaint.request_repaint());
        Ok(Self::with_controller(controller))
    }

    pub fn with_controller(controller: GestureRefreshController) -> Self {
        Self {
            controller,
            touches: TouchTracker::new(),
            scroll_top: 0.0,
            refresh_started: None,
            shown_offset: 0.0,
        }
    }

    pub fn controller(&self) -> &GestureRefreshController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GestureRefreshController {
        &mut self.controller
    }

    /// Scroll offset of the wrapped area after the last frame.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Forward a pointer event through the primary-touch filter.
    pub fn handle(&mut self, event: PointerEvent) {
        if let Some(event) = self.touches.filter(event) {
            self.controller.handle(event);
        }
    }

    /// Drop any gesture in progress; the surface is leaving the screen.
    pub fn detach(&mut self) {
        if let Some(cancel) = self.touches.reset() {
            self.controller.handle(cancel);
        }
        self.controller.detach();
    }

    /// Render `add_contents` inside a vertical scroll area with the pull
    /// indicator above it.
    pub fn show<R>(
        &mut self,
        ui: &mut egui::Ui,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> PullOutput<R> {
        let outcome = self.controller.poll();
        if outcome.is_some() {
            self.refresh_started = None;
        }

        let area = ui.available_rect_before_wrap();
        self.feed_pointer(ui, area);

        if self.controller.is_refreshing() && self.refresh_started.is_none() {
            self.refresh_started = Some(Instant::now());
        }
        let spin_secs = self
            .refresh_started
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);

        let style = indicator_style(&self.controller.state(), self.controller.config(), spin_secs);

        // Follow the finger exactly while tracking, ease back otherwise
        if self.controller.is_tracking() || self.controller.is_refreshing() {
            self.shown_offset = style.content_offset;
        } else {
            let dt = ui.input(|i| i.stable_dt);
            self.shown_offset =
                ease_toward(self.shown_offset, style.content_offset, dt, SPRING_BACK_SECS);
            if self.shown_offset != style.content_offset {
                ui.ctx().request_repaint();
            }
        }
        let shown = self.shown_offset;

        let (pull_rect, _) =
            ui.allocate_exact_size(egui::vec2(area.width(), shown), egui::Sense::hover());
        if style.is_visible() {
            paint_indicator(ui.painter(), pull_rect, &style);
        }

        let scroll = egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, add_contents);
        self.scroll_top = scroll.state.offset.y;

        if self.controller.is_refreshing() {
            ui.ctx().request_repaint();
        }

        PullOutput {
            inner: scroll.inner,
            outcome,
        }
    }

    fn feed_pointer(&mut self, ui: &egui::Ui, area: egui::Rect) {
        let (pressed, down, released, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });

        if pressed {
            if let Some(pos) = pos.filter(|p| area.contains(*p)) {
                self.handle(PointerEvent::Down {
                    id: MOUSE_POINTER_ID,
                    y: pos.y,
                    scroll_top: self.scroll_top,
                });
            }
        } else if down {
            if let Some(pos) = pos {
                self.handle(PointerEvent::Move {
                    id: MOUSE_POINTER_ID,
                    y: pos.y,
                });
            }
        }

        if released {
            self.handle(PointerEvent::Up {
                id: MOUSE_POINTER_ID,
            });
        }
    }
}

impl Drop for PullToRefresh {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Three-quarter arc spinner, green like the status bar accents.
fn paint_indicator(painter: &egui::Painter, pull_rect: egui::Rect, style: &IndicatorStyle) {
    let radius = INDICATOR_SIZE * 0.5 - 3.0;
    let center = egui::pos2(pull_rect.center().x, pull_rect.top() + style.center_y);
    let color = egui::Color32::from_rgb(76, 175, 80).gamma_multiply(style.opacity);

    const SEGMENTS: usize = 24;
    let start = style.rotation_deg.to_radians();
    let sweep = 1.5 * std::f32::consts::PI;
    let points: Vec<egui::Pos2> = (0..=SEGMENTS)
        .map(|i| {
            let a = start + sweep * i as f32 / SEGMENTS as f32;
            center + egui::vec2(a.cos(), a.sin()) * radius
        })
        .collect();

    painter.add(egui::Shape::line(points, egui::Stroke::new(2.5, color)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mobile::RefreshPhase;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn surface(calls: Arc<AtomicUsize>) -> PullToRefresh {
        let controller = GestureRefreshController::new(RefreshConfig::default(), move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        PullToRefresh::with_controller(controller)
    }

    #[test]
    fn test_second_finger_cannot_trigger_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());

        s.handle(PointerEvent::Down { id: 1, y: 0.0, scroll_top: 0.0 });
        s.handle(PointerEvent::Down { id: 2, y: 0.0, scroll_top: 0.0 });
        s.handle(PointerEvent::Move { id: 2, y: 400.0 });
        assert_eq!(s.controller().pull_distance(), 0.0);

        s.handle(PointerEvent::Move { id: 1, y: 60.0 });
        assert!((s.controller().pull_distance() - 30.0).abs() < 1e-6);
        s.handle(PointerEvent::Up { id: 2 });
        assert!(s.controller().is_tracking());

        s.handle(PointerEvent::Up { id: 1 });
        assert!(!s.controller().is_refreshing());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_pull_through_surface() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());

        s.handle(PointerEvent::Down { id: 1, y: 10.0, scroll_top: 0.0 });
        s.handle(PointerEvent::Move { id: 1, y: 210.0 });
        s.handle(PointerEvent::Up { id: 1 });
        assert!(s.controller().is_refreshing());

        let outcome = s.controller_mut().wait_for_refresh(Duration::from_secs(5));
        assert_eq!(outcome, Some(RefreshOutcome::Completed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_mid_gesture_discards_pull() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());

        s.handle(PointerEvent::Down { id: 1, y: 0.0, scroll_top: 0.0 });
        s.handle(PointerEvent::Move { id: 1, y: 300.0 });
        s.detach();
        assert_eq!(s.controller().pull_distance(), 0.0);
        assert!(!s.controller().is_tracking());

        // A stale release after teardown does nothing
        s.handle(PointerEvent::Up { id: 1 });
        assert!(!s.controller().is_refreshing());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // ── Headless egui frames ─────────────────────────────────────────────────

    struct Harness {
        ctx: egui::Context,
        time: f64,
        /// Sub-rect the surface is laid out in; whole panel when `None`
        region: Option<egui::Rect>,
        content_height: f32,
    }

    impl Harness {
        fn new(region: Option<egui::Rect>, content_height: f32) -> Self {
            Self {
                ctx: egui::Context::default(),
                time: 0.0,
                region,
                content_height,
            }
        }

        fn frame(&mut self, s: &mut PullToRefresh, events: Vec<egui::Event>) {
            self.time += 1.0 / 60.0;
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(400.0, 800.0),
                )),
                time: Some(self.time),
                events,
                ..Default::default()
            };
            let region = self.region;
            let height = self.content_height;
            let _ = self.ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| match region {
                    Some(rect) => {
                        ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
                            s.show(ui, |ui| ui.add_space(height));
                        });
                    }
                    None => {
                        s.show(ui, |ui| ui.add_space(height));
                    }
                });
            });
        }
    }

    fn moved(y: f32) -> egui::Event {
        egui::Event::PointerMoved(egui::pos2(200.0, y))
    }

    fn button(y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(200.0, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_egui_frames_drive_pull_and_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());
        let mut h = Harness::new(None, 200.0);

        h.frame(&mut s, vec![]);
        h.frame(&mut s, vec![moved(100.0), button(100.0, true)]);
        assert!(s.controller().is_tracking());

        h.frame(&mut s, vec![moved(150.0)]);
        assert!((s.controller().pull_distance() - 25.0).abs() < 1e-3);

        h.frame(&mut s, vec![moved(300.0)]);
        assert!((s.controller().pull_distance() - 100.0).abs() < 1e-3);
        assert_eq!(s.controller().phase(), RefreshPhase::ThresholdMet);

        h.frame(&mut s, vec![button(300.0, false)]);
        assert!(s.controller().is_refreshing());
        assert!(!s.controller().is_tracking());

        let outcome = s.controller_mut().wait_for_refresh(Duration::from_secs(5));
        assert_eq!(outcome, Some(RefreshOutcome::Completed));
        h.frame(&mut s, vec![]);
        assert_eq!(s.controller().pull_distance(), 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_egui_press_outside_surface_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());
        let region = egui::Rect::from_min_max(egui::pos2(0.0, 400.0), egui::pos2(400.0, 800.0));
        let mut h = Harness::new(Some(region), 100.0);

        h.frame(&mut s, vec![]);
        h.frame(&mut s, vec![moved(100.0), button(100.0, true)]);
        h.frame(&mut s, vec![moved(400.0)]);
        assert!(!s.controller().is_tracking());
        assert_eq!(s.controller().pull_distance(), 0.0);
        h.frame(&mut s, vec![button(400.0, false)]);

        // Same drag inside the surface does pull
        h.frame(&mut s, vec![moved(450.0), button(450.0, true)]);
        h.frame(&mut s, vec![moved(650.0)]);
        assert!((s.controller().pull_distance() - 100.0).abs() < 1e-3);
        h.frame(&mut s, vec![button(650.0, false)]);
        s.controller_mut().wait_for_refresh(Duration::from_secs(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_egui_scrolled_content_is_not_pulled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut s = surface(calls.clone());
        let mut h = Harness::new(None, 3000.0);

        // Drag the content up so the scroll area leaves its top edge
        h.frame(&mut s, vec![]);
        h.frame(&mut s, vec![moved(700.0), button(700.0, true)]);
        for y in [650.0, 550.0, 400.0, 250.0, 100.0] {
            h.frame(&mut s, vec![moved(y)]);
        }
        h.frame(&mut s, vec![button(100.0, false)]);
        for _ in 0..3 {
            h.frame(&mut s, vec![]);
        }
        assert!(s.scroll_top() > 0.0);
        assert_eq!(s.controller().phase(), RefreshPhase::Idle);

        // Pulling down now scrolls content instead of pulling
        h.frame(&mut s, vec![moved(100.0), button(100.0, true)]);
        h.frame(&mut s, vec![moved(400.0)]);
        assert_eq!(s.controller().pull_distance(), 0.0);
        assert_eq!(s.controller().phase(), RefreshPhase::Idle);
        h.frame(&mut s, vec![button(400.0, false)]);
        assert!(!s.controller().is_refreshing());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
