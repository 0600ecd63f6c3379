//! `WorkoutApp` — the top-level egui application state.
//!
//! - `feed`    — refresh task and shared feed state
//! - `content` — feed list, header and failure notice

pub mod content;
pub mod feed;

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;

use pull_refresh::mobile::{ConfigError, PullToRefresh, RefreshConfig, RefreshOutcome};

use content::{draw_feed, draw_notice};
use feed::{refresh_task, FeedSource, SharedFeed};

/// How long a refresh failure stays on screen.
pub const NOTICE_SECS: f32 = 4.0;

/// Failure surfaced to the user after a refresh.
pub struct Notice {
    pub message: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed().as_secs_f32() >= NOTICE_SECS
    }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct WorkoutApp {
    pub source: FeedSource,
    pub feed: SharedFeed,
    pub surface: PullToRefresh,
    pub notice: Option<Notice>,
    pub dark_mode: bool,
}

impl WorkoutApp {
    pub fn new(
        ctx: &egui::Context,
        source: FeedSource,
        config: RefreshConfig,
    ) -> Result<Self, ConfigError> {
        let feed = SharedFeed::default();
        let task = refresh_task(source.clone(), Arc::clone(&feed));
        let surface = PullToRefresh::new(ctx, config, task)?;
        log::info!("workout feed from {}", source.describe());

        Ok(Self {
            source,
            feed,
            surface,
            notice: None,
            dark_mode: true,
        })
    }

    /// Surface the refresh outcome; the controller leaves that to us.
    fn apply_outcome(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Completed => self.notice = None,
            RefreshOutcome::Failed(e) => {
                self.notice = Some(Notice {
                    message: format!("Refresh failed: {}", e),
                    shown_at: Instant::now(),
                });
            }
        }
    }
}

impl eframe::App for WorkoutApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        if self.notice.as_ref().is_some_and(Notice::is_expired) {
            self.notice = None;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.draw_header(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let feed = Arc::clone(&self.feed);
            let output = self.surface.show(ui, |ui| draw_feed(ui, &feed));
            if let Some(outcome) = output.outcome {
                self.apply_outcome(outcome);
            }
        });

        if let Some(notice) = &self.notice {
            draw_notice(ctx, notice);
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
