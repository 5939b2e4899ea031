use super::phases::phase_for;
use super::DisplaySink;
use crate::model::{now_rfc3339, RunOutcome, RunReport, SimConfig};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Parameters for one run of the tick loop.
pub(crate) struct TickerParams {
    pub cfg: SimConfig,
    pub sink: Option<Arc<dyn DisplaySink>>,
    pub cancel_rx: watch::Receiver<bool>,
}

/// Resolves once cancellation is requested or the owning simulator is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Drive the counter from 0 to 100, settle, then hand the report to `on_complete`.
pub(crate) async fn run_ticker<F>(params: TickerParams, on_complete: F) -> RunOutcome
where
    F: FnOnce(RunReport) + Send + 'static,
{
    let TickerParams {
        cfg,
        sink,
        mut cancel_rx,
    } = params;

    let started_at = now_rfc3339();
    let start = Instant::now();
    let mut interval = tokio::time::interval_at(start + cfg.tick_interval, cfg.tick_interval);
    // A late tick shifts the schedule; ticks are never skipped or bunched up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut progress: u8 = 0;
    let mut ticks: u32 = 0;
    let mut last_tick = start;
    let mut tick_intervals_ms = Vec::with_capacity(100usize.div_ceil(cfg.step.max(1) as usize));

    while progress < 100 {
        // biased: a pending stop always wins over a tick that is due at the same time.
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel_rx) => {
                debug!(progress, ticks, "run cancelled before next tick");
                return RunOutcome::Cancelled { progress, ticks };
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        tick_intervals_ms.push(now.duration_since(last_tick).as_secs_f64() * 1000.0);
        last_tick = now;

        ticks += 1;
        progress = progress.saturating_add(cfg.step).min(100);

        if let Some(sink) = sink.as_deref() {
            sink.set_progress(progress);
            if let Some(phase) = phase_for(progress) {
                sink.set_phase(phase);
            }
        }
    }

    drop(interval);
    debug!(ticks, settle_ms = cfg.settle_delay.as_millis() as u64, "progress complete, settling");

    tokio::select! {
        biased;
        _ = cancelled(&mut cancel_rx) => {
            debug!(ticks, "run cancelled during settle delay");
            return RunOutcome::Cancelled { progress, ticks };
        }
        _ = tokio::time::sleep(cfg.settle_delay) => {}
    }

    let report = RunReport {
        started_at,
        ticks,
        final_progress: progress,
        elapsed: start.elapsed(),
        tick_intervals_ms,
    };
    info!(
        ticks,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "analysis run completed"
    );
    on_complete(report.clone());
    RunOutcome::Completed(report)
}
