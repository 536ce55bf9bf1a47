//! Headless playback: prints lifecycle events as plain lines.
//!
//! Useful for checking demo timing without a terminal UI.

use anyhow::Result;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::demos::DemoDefinition;
use crate::format::{format_elapsed, progress_bar};
use crate::playback::{PlaybackController, PlaybackEvent, PlaybackTiming};

const BAR_WIDTH: usize = 20;

/// Overall percent once steps `0..=index` are done, weighted by duration
fn overall_after(demo: &DemoDefinition, index: usize) -> f64 {
    let total = demo.nominal_total().as_secs_f64();
    if total <= 0.0 {
        return 0.0;
    }
    let done: f64 = demo
        .steps
        .iter()
        .take(index + 1)
        .map(|s| s.nominal_duration().as_secs_f64())
        .sum();
    (done / total * 100.0).min(100.0)
}

/// Text line for an event, or `None` for events that print nothing
pub fn describe_event(demo: &DemoDefinition, event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::Started { run_id } => Some(format!("▶ {} (run {})", demo.name, run_id)),
        PlaybackEvent::StepStarted { index, .. } => demo.steps.get(*index).map(|step| {
            format!(
                "  [{}/{}] {}: {}",
                index + 1,
                demo.steps.len(),
                step.title,
                step.description
            )
        }),
        PlaybackEvent::StepCompleted { index, .. } => demo.steps.get(*index).map(|step| {
            let bar = progress_bar(overall_after(demo, *index), BAR_WIDTH);
            if step.impact.is_empty() {
                format!("  ✔ {} {}", bar, step.title)
            } else {
                format!("  ✔ {} {} · {}", bar, step.title, step.impact)
            }
        }),
        PlaybackEvent::Completed { total_elapsed, .. } => {
            let mut out = format!("■ Complete in {}", format_elapsed(*total_elapsed));
            for metric in &demo.results {
                out.push_str(&format!("\n  {}: {}", metric.label, metric.value));
            }
            Some(out)
        }
        PlaybackEvent::Reset => Some("■ Reset".to_string()),
    }
}

/// Play a demo once, writing lines to `out`. Returns early on Ctrl-C.
pub async fn run_headless(config: &Config, demo: &DemoDefinition, out: &mut impl Write) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut controller =
        PlaybackController::new(&demo.steps, PlaybackTiming::from(&config.playback))?
            .with_event_sender(tx);

    // Headless runs always start, regardless of auto_start
    controller.on_request_start();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = describe_event(demo, &event) {
                    writeln!(out, "{}", line)?;
                }
                if event.is_completion() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, resetting playback");
                controller.on_request_reset();
                writeln!(out, "■ Interrupted")?;
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::DemoRegistry;
    use std::time::Duration;

    fn bid_review() -> DemoDefinition {
        DemoRegistry::builtin().get("bid-review").unwrap().clone()
    }

    #[test]
    fn test_describe_step_events() {
        let demo = bid_review();
        let started = describe_event(&demo, &PlaybackEvent::StepStarted { run_id: 1, index: 1 });
        assert_eq!(
            started.as_deref(),
            Some("  [2/3] Extracting scope: Reading inclusions, exclusions and alternates from each proposal.")
        );

        let completed =
            describe_event(&demo, &PlaybackEvent::StepCompleted { run_id: 1, index: 0 });
        assert_eq!(
            completed.as_deref(),
            Some("  ✔ [####----------------] Collecting bids · 7 bids collected across 3 trades")
        );
    }

    #[test]
    fn test_describe_out_of_range_step() {
        let demo = bid_review();
        assert!(describe_event(&demo, &PlaybackEvent::StepStarted { run_id: 1, index: 9 }).is_none());
    }

    #[test]
    fn test_describe_completion_lists_results() {
        let demo = bid_review();
        let line = describe_event(
            &demo,
            &PlaybackEvent::Completed {
                run_id: 1,
                total_elapsed: Duration::from_secs(9),
            },
        )
        .unwrap();
        assert!(line.starts_with("■ Complete in 9.0s"));
        assert!(line.contains("Recommended bidder: Ridgeline Mechanical"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_run_prints_every_step() {
        let demo = bid_review();
        let mut out = Vec::new();
        run_headless(&Config::default(), &demo, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("▶ Subcontractor Bid Review (run 1)"));
        for step in &demo.steps {
            assert!(text.contains(&step.title));
        }
        assert!(text.contains("✔ [####################] "));
        assert!(text.contains("■ Complete in 9.0s"));
    }
}
