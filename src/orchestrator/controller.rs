//! Run lifecycle controller.
//!
//! Owns start/stop/quit orchestration and emits events for presentation layers.

use super::post_process;
use crate::config::Settings;
use crate::engine::ProgressSimulator;
use crate::locale::Locale;
use crate::model::{now_rfc3339, InfoEvent, ProgressEvent, RunOutcome, Severity};
use crate::notify::NotificationEmitter;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Commands emitted by UI layers to control the analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Start,
    Stop,
    Quit,
}

/// Report the outcome of a finished run. Completion itself is announced by the
/// run's callback, so only cancellations and failures are reported here.
fn report_outcome(
    outcome: Option<RunOutcome>,
    emitter: &NotificationEmitter,
    event_tx: &UnboundedSender<ProgressEvent>,
    locale: Locale,
) {
    match outcome {
        Some(RunOutcome::Completed(report)) => {
            debug!(ticks = report.ticks, "run outcome collected");
        }
        Some(RunOutcome::Cancelled { progress, ticks }) => {
            let _ = event_tx.send(ProgressEvent::RunStopped { progress, ticks });
        }
        None => {
            emitter.notify(locale.run_failed(), Severity::Error);
        }
    }
}

/// Start a new run wired to the completion handler. Returns `false` if one is active.
fn start_run(
    simulator: &mut ProgressSimulator,
    emitter: &NotificationEmitter,
    event_tx: &UnboundedSender<ProgressEvent>,
    locale: Locale,
) -> bool {
    let on_complete = {
        let emitter = emitter.clone();
        let event_tx = event_tx.clone();
        move |report| post_process::process_run_completion(&emitter, &event_tx, locale, report)
    };
    if !simulator.start(on_complete) {
        return false;
    }
    let _ = event_tx.send(ProgressEvent::RunStarted {
        started_at: now_rfc3339(),
    });
    emitter.notify(locale.analysis_started(), Severity::Info);
    true
}

/// Orchestrate analysis runs based on UI commands and emit events back to presentation layers.
pub(crate) async fn run_controller(
    settings: &Settings,
    auto_start: bool,
    event_tx: UnboundedSender<ProgressEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let locale = settings.locale;
    let emitter = NotificationEmitter::new(settings.notifications.clone())
        .with_sink(Arc::new(event_tx.clone()));
    let mut simulator =
        ProgressSimulator::new(settings.simulator.clone()).with_sink(Arc::new(event_tx.clone()));

    if auto_start {
        start_run(&mut simulator, &emitter, &event_tx, locale);
    }
    let mut quit_pending = false;

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv(), if !quit_pending => {
                match cmd {
                    Some(UiCommand::Start) => {
                        if simulator.is_running() {
                            emitter.notify(locale.already_running(), Severity::Warning);
                        } else {
                            // A stopped run may still be winding down; report it before the
                            // next run starts so its RunStopped is never lost.
                            if simulator.has_pending_run() {
                                let outcome = simulator.wait().await;
                                report_outcome(outcome, &emitter, &event_tx, locale);
                            }
                            start_run(&mut simulator, &emitter, &event_tx, locale);
                        }
                    }
                    Some(UiCommand::Stop) => {
                        if simulator.stop() {
                            emitter.notify(locale.analysis_stopped(), Severity::Info);
                        } else {
                            let _ = event_tx.send(ProgressEvent::Info(InfoEvent::NothingToStop));
                        }
                    }
                    Some(UiCommand::Quit) | None => {
                        // Quit waits for the run task to wind down so its outcome is reported.
                        quit_pending = true;
                        simulator.stop();
                        if !simulator.has_pending_run() {
                            break Ok(());
                        }
                    }
                }
            }
            // wait() keeps the JoinHandle in place until the run actually ends, so losing
            // this branch to a command does not drop the outcome.
            outcome = async {
                if simulator.has_pending_run() {
                    return simulator.wait().await;
                }
                futures::future::pending().await
            } => {
                report_outcome(outcome, &emitter, &event_tx, locale);
                if quit_pending {
                    break Ok(());
                }
            }
        }
    };

    if simulator.has_pending_run() {
        warn!("controller exiting with an uncollected run");
    }
    res
}
