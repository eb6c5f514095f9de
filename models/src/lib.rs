use std::time::Duration;

pub mod auth;
pub mod conditions;
pub mod config;
pub mod editor;
pub mod heating_cooling;
pub mod sync;
pub mod units;
pub mod view;

/// Quiet period after the last edit before the pending config is written back.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1500);

/// How often the dashboard re-pulls config, state and weather.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60);
