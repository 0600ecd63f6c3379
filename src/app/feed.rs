//! Workout feed refresh for `WorkoutApp`.
//!
//! Builds the refresh task handed to the pull-to-refresh surface. The task
//! runs on a worker thread, loads the feed and swaps it into the shared
//! `FeedState`; the UI reads that state every frame.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pull_refresh::mobile::RefreshError;
use pull_refresh::net::fetch::{fetch_feed, FeedEntry};

/// Environment variable naming a remote plain-text feed.
pub const FEED_URL_ENV: &str = "PULL_REFRESH_FEED_URL";

/// Where refreshed entries come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    Remote(String),
    /// Local generator with artificial latency; every `fail_every`-th load
    /// fails so the error notice can be seen.
    Simulated { latency: Duration, fail_every: u32 },
}

impl FeedSource {
    pub fn from_env() -> Self {
        match std::env::var(FEED_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => FeedSource::Remote(url),
            _ => FeedSource::Simulated {
                latency: Duration::from_millis(900),
                fail_every: 4,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedSource::Remote(url) => url.clone(),
            FeedSource::Simulated { .. } => "simulated feed".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedState {
    pub entries: Vec<FeedEntry>,
    /// Refresh attempts, including failed ones
    pub attempts: u32,
    /// Successful loads
    pub loads: u32,
    pub refreshed_at: Option<Instant>,
}

pub type SharedFeed = Arc<Mutex<FeedState>>;

/// Refresh task for `source` writing into `feed`.
pub fn refresh_task(
    source: FeedSource,
    feed: SharedFeed,
) -> impl Fn() -> Result<(), RefreshError> + Send + Sync + 'static {
    move || {
        let attempt = {
            let mut state = feed
                .lock()
                .map_err(|_| RefreshError::new("feed state poisoned"))?;
            state.attempts += 1;
            state.attempts
        };

        let entries = match &source {
            FeedSource::Remote(url) => fetch_feed(url)
                .map_err(|e| RefreshError::new(e.to_string()))?
                .entries,
            FeedSource::Simulated {
                latency,
                fail_every,
            } => {
                std::thread::sleep(*latency);
                if *fail_every > 0 && attempt % fail_every == 0 {
                    return Err(RefreshError::new("Could not reach the workout server"));
                }
                simulated_entries(attempt)
            }
        };

        let mut state = feed
            .lock()
            .map_err(|_| RefreshError::new("feed state poisoned"))?;
        state.entries = entries;
        state.loads += 1;
        state.refreshed_at = Some(Instant::now());
        log::debug!("feed refreshed, {} entries", state.entries.len());
        Ok(())
    }
}

const SESSIONS: [(&str, &str); 6] = [
    ("Upper body", "Bench press 4x8, rows 4x10"),
    ("Leg day", "Squat 5x5, lunges 3x12"),
    ("Easy run", "5 km @ 6:00/km"),
    ("Mobility", "20 min flow"),
    ("Intervals", "8x400 m"),
    ("Core", "Plank 3x60 s, dead bugs"),
];

/// Deterministic feed that rotates with each load.
pub fn simulated_entries(load: u32) -> Vec<FeedEntry> {
    (0..SESSIONS.len())
        .map(|i| {
            let (title, detail) = SESSIONS[(i + load as usize) % SESSIONS.len()];
            FeedEntry {
                title: title.to_string(),
                detail: Some(detail.to_string()),
            }
        })
        .collect()
}
