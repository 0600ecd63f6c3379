//! Mobile Pull-to-Refresh
//!
//! - `pull_refresh`: gesture state machine and background refresh
//! - `touch`: primary-touch filtering of raw pointer events
//! - `indicator`: spinner geometry derived from the pull state
//! - `ui`: egui scroll surface wiring it all together

pub mod indicator;
pub mod pull_refresh;
pub mod touch;
pub mod ui;

pub use pull_refresh::{
    ConfigError, GestureRefreshController, PullState, RefreshConfig, RefreshError,
    RefreshOutcome, RefreshPhase, SubscriptionId,
};
pub use touch::{PointerEvent, TouchTracker};
pub use ui::{PullOutput, PullToRefresh};
