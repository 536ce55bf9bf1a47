//! sitedemo - simulated AI demo playback for construction product pages
//!
//! The [`playback`] module is the engine: an ordered list of timed steps
//! advanced by a single cancellable timer, observed through snapshots and
//! lifecycle events. The remaining modules host it in a terminal.

pub mod app;
pub mod config;
pub mod demos;
pub mod env_vars;
pub mod format;
pub mod headless;
pub mod logging;
pub mod playback;
pub mod seen;
pub mod ui;
