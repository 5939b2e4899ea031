//! Post-run processing.
//!
//! Runs from the simulator's completion callback: announces success and hands the
//! report to the results view.

use crate::locale::Locale;
use crate::model::{ProgressEvent, RunReport, Severity};
use crate::notify::NotificationEmitter;
use tokio::sync::mpsc::UnboundedSender;

/// Announce a completed run and forward its report to presentation layers.
pub(crate) fn process_run_completion(
    emitter: &NotificationEmitter,
    event_tx: &UnboundedSender<ProgressEvent>,
    locale: Locale,
    report: RunReport,
) {
    emitter.notify(locale.analysis_completed(), Severity::Success);
    let _ = event_tx.send(ProgressEvent::RunCompleted {
        report: Box::new(report),
    });
}
