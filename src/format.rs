//! Display helpers derived from playback state

use std::time::Duration;

use crate::playback::{PlaybackPhase, PlaybackSession};

/// Format elapsed time as seconds with one decimal: "12.3s"
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

/// Format a percentage, rounded down so "100%" only shows when done
pub fn format_percent(percent: f64) -> String {
    format!("{}%", percent.clamp(0.0, 100.0).floor() as u8)
}

/// Text progress bar like "[#####-----]"
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).floor() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Short status line for a session header
pub fn status_line(session: &PlaybackSession) -> String {
    match session.phase() {
        PlaybackPhase::Idle => "Ready".to_string(),
        PlaybackPhase::Running { step } => format!(
            "Step {}/{} · {}",
            step + 1,
            session.steps().len(),
            format_elapsed(session.total_elapsed())
        ),
        PlaybackPhase::Complete => {
            format!("Complete in {}", format_elapsed(session.total_elapsed()))
        }
    }
}
