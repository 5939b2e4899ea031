mod phases;
mod ticker;

use crate::model::{Phase, ProgressEvent, RunOutcome, RunReport, SimConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Destination for progress output. Implementations decide how to render.
pub trait DisplaySink: Send + Sync {
    fn set_progress(&self, value: u8);
    fn set_phase(&self, phase: Phase);
}

// A closed receiver means nobody is rendering any more; dropping the update is fine.
impl DisplaySink for mpsc::UnboundedSender<ProgressEvent> {
    fn set_progress(&self, value: u8) {
        let _ = self.send(ProgressEvent::Progress { value });
    }

    fn set_phase(&self, phase: Phase) {
        let _ = self.send(ProgressEvent::Phase { phase });
    }
}

/// Internal handle for a running simulation task.
struct RunCtx {
    cancel_tx: watch::Sender<bool>,
    handle: Option<tokio::task::JoinHandle<RunOutcome>>,
}

impl RunCtx {
    fn is_active(&self) -> bool {
        !*self.cancel_tx.borrow() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Owns at most one simulated analysis run at a time.
///
/// Dropping the simulator cancels the active run.
pub struct ProgressSimulator {
    cfg: SimConfig,
    sink: Option<Arc<dyn DisplaySink>>,
    run: Option<RunCtx>,
}

impl ProgressSimulator {
    /// Out-of-range settings are clamped: a zero interval becomes 1ms and `step`
    /// is kept within 1..=100.
    pub fn new(mut cfg: SimConfig) -> Self {
        // interval_at panics on a zero period and a zero step never reaches 100.
        if cfg.tick_interval.is_zero() {
            warn!("zero tick interval, using {MIN_TICK_INTERVAL:?}");
            cfg.tick_interval = MIN_TICK_INTERVAL;
        }
        if !(1..=100).contains(&cfg.step) {
            warn!(step = cfg.step, "step out of range, clamping to 1..=100");
            cfg.step = cfg.step.clamp(1, 100);
        }
        Self {
            cfg,
            sink: None,
            run: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DisplaySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(RunCtx::is_active)
    }

    /// Start a run. Returns `false` and leaves the active run untouched if one exists.
    ///
    /// `on_complete` is invoked exactly once, after the settle delay, unless the run
    /// is stopped first. Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, on_complete: F) -> bool
    where
        F: FnOnce(RunReport) + Send + 'static,
    {
        if self.is_running() {
            debug!("start ignored: a run is already active");
            return false;
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let params = ticker::TickerParams {
            cfg: self.cfg.clone(),
            sink: self.sink.clone(),
            cancel_rx,
        };
        let handle = tokio::spawn(ticker::run_ticker(params, on_complete));

        // Replacing a finished or stopped context drops its sender, which also
        // releases a task that is still winding down.
        self.run = Some(RunCtx {
            cancel_tx,
            handle: Some(handle),
        });
        info!(
            tick_ms = self.cfg.tick_interval.as_millis() as u64,
            step = self.cfg.step,
            "analysis run started"
        );
        true
    }

    /// Stop the active run. Returns `false` if there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        match self.run.as_ref() {
            Some(ctx) if ctx.is_active() => {
                ctx.cancel_tx.send_replace(true);
                info!("analysis run stop requested");
                true
            }
            _ => {
                debug!("stop ignored: no active run");
                false
            }
        }
    }

    /// Whether a run task exists whose outcome has not been collected by [`wait`](Self::wait).
    pub fn has_pending_run(&self) -> bool {
        self.run.as_ref().is_some_and(|ctx| ctx.handle.is_some())
    }

    /// Wait for the current run task to end and return its outcome.
    ///
    /// Returns `None` if there is no uncollected run. Dropping the returned future
    /// before it resolves keeps the run and its handle intact.
    pub async fn wait(&mut self) -> Option<RunOutcome> {
        let ctx = self.run.as_mut()?;
        let handle = ctx.handle.as_mut()?;
        let joined = handle.await;
        ctx.handle = None;
        match joined {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "analysis run task failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        progress: Mutex<Vec<u8>>,
        phases: Mutex<Vec<Phase>>,
    }

    impl RecordingSink {
        fn progress(&self) -> Vec<u8> {
            self.progress.lock().unwrap().clone()
        }
    }

    impl DisplaySink for RecordingSink {
        fn set_progress(&self, value: u8) {
            self.progress.lock().unwrap().push(value);
        }

        fn set_phase(&self, phase: Phase) {
            self.phases.lock().unwrap().push(phase);
        }
    }

    fn simulator(step: u8) -> (ProgressSimulator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let cfg = SimConfig {
            step,
            ..SimConfig::default()
        };
        let sim = ProgressSimulator::new(cfg).with_sink(sink.clone());
        (sim, sink)
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(RunReport) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move |_report: RunReport| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_completes_once_after_settle_delay() {
        let (mut sim, sink) = simulator(1);
        let (count, on_complete) = counter();
        assert!(sim.start(on_complete));

        // 100 ticks at 100ms; still inside the 500ms settle delay.
        tokio::time::sleep(Duration::from_millis(10_250)).await;
        assert_eq!(sink.progress().len(), 100);
        assert_eq!(sink.progress().last(), Some(&100));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(sim.is_running());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        match sim.wait().await {
            Some(RunOutcome::Completed(report)) => {
                assert_eq!(report.ticks, 100);
                assert_eq!(report.final_progress, 100);
                assert_eq!(report.tick_intervals_ms.len(), 100);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!sim.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_increases_by_step_and_clamps_at_hundred() {
        let (mut sim, sink) = simulator(7);
        let (_count, on_complete) = counter();
        sim.start(on_complete);
        let _ = sim.wait().await;

        let values = sink.progress();
        assert_eq!(values.len(), 15);
        for pair in values.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        for (i, v) in values.iter().take(14).enumerate() {
            assert_eq!(*v as usize, (i + 1) * 7);
        }
        assert_eq!(values.last(), Some(&100));
        assert!(values.iter().all(|v| *v <= 100));
    }

    #[tokio::test(start_paused = true)]
    async fn phase_is_written_for_every_tick_below_hundred() {
        let (mut sim, sink) = simulator(1);
        let (_count, on_complete) = counter();
        sim.start(on_complete);
        let _ = sim.wait().await;

        let phases = sink.phases.lock().unwrap().clone();
        assert_eq!(phases.len(), 99);
        assert_eq!(phases[0], Phase::Initializing);
        assert_eq!(phases[18], Phase::Initializing);
        assert_eq!(phases[19], Phase::RuleScan);
        assert_eq!(phases[98], Phase::Finalizing);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_at_tick_45_halts_progress_and_suppresses_completion() {
        let (mut sim, sink) = simulator(1);
        let (count, on_complete) = counter();
        sim.start(on_complete);

        tokio::time::sleep(Duration::from_millis(4_550)).await;
        assert_eq!(sink.progress().len(), 45);

        assert!(sim.stop());
        assert!(!sim.is_running());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(sink.progress().len(), 45);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(
            sim.wait().await,
            Some(RunOutcome::Cancelled {
                progress: 45,
                ticks: 45
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_settle_delay_suppresses_completion() {
        let (mut sim, _sink) = simulator(10);
        let (count, on_complete) = counter();
        sim.start(on_complete);

        // 10 ticks reach 100 at 1000ms; settle runs until 1500ms.
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert!(sim.stop());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(
            sim.wait().await,
            Some(RunOutcome::Cancelled {
                progress: 100,
                ticks: 10
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_running_is_ignored() {
        let (mut sim, sink) = simulator(1);
        let (first, on_first) = counter();
        let (second, on_second) = counter();
        assert!(sim.start(on_first));
        assert!(!sim.start(on_second));

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(sink.progress(), (1..=10).collect::<Vec<u8>>());

        let _ = sim.wait().await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn redundant_stops_are_absorbed() {
        let (mut sim, _sink) = simulator(1);
        assert!(!sim.stop());

        let (_count, on_complete) = counter();
        sim.start(on_complete);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(sim.stop());
        assert!(!sim.stop());
        assert!(matches!(
            sim.wait().await,
            Some(RunOutcome::Cancelled { progress: 3, .. })
        ));
        assert!(!sim.stop());
        assert_eq!(sim.wait().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn can_start_again_after_stop() {
        let (mut sim, sink) = simulator(25);
        let (_c1, on_first) = counter();
        sim.start(on_first);
        tokio::time::sleep(Duration::from_millis(150)).await;
        sim.stop();

        let (again, on_again) = counter();
        assert!(sim.start(on_again));
        let outcome = sim.wait().await;
        assert!(matches!(outcome, Some(RunOutcome::Completed(_))));
        assert_eq!(again.load(Ordering::SeqCst), 1);
        assert_eq!(sink.progress(), vec![25, 25, 50, 75, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_without_a_sink() {
        let mut sim = ProgressSimulator::new(SimConfig {
            step: 50,
            ..SimConfig::default()
        });
        let (count, on_complete) = counter();
        sim.start(on_complete);
        assert!(matches!(sim.wait().await, Some(RunOutcome::Completed(_))));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_config_is_clamped_and_still_completes() {
        let sink = Arc::new(RecordingSink::default());
        let mut sim = ProgressSimulator::new(SimConfig {
            tick_interval: Duration::ZERO,
            step: 0,
            ..SimConfig::default()
        })
        .with_sink(sink.clone());
        let (count, on_complete) = counter();
        assert!(sim.start(on_complete));

        match sim.wait().await {
            Some(RunOutcome::Completed(report)) => assert_eq!(report.ticks, 100),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(sink.progress().first(), Some(&1));

        let mut sim = ProgressSimulator::new(SimConfig {
            step: u8::MAX,
            ..SimConfig::default()
        });
        let (_count, on_complete) = counter();
        sim.start(on_complete);
        match sim.wait().await {
            Some(RunOutcome::Completed(report)) => assert_eq!(report.ticks, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_simulator_cancels_the_run() {
        let (mut sim, sink) = simulator(1);
        let (count, on_complete) = counter();
        sim.start(on_complete);
        tokio::time::sleep(Duration::from_millis(250)).await;
        drop(sim);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(sink.progress().len(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn channel_sender_acts_as_display_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let mut sim = ProgressSimulator::new(SimConfig {
            step: 20,
            ..SimConfig::default()
        })
        .with_sink(Arc::new(tx));
        let (_count, on_complete) = counter();
        sim.start(on_complete);
        let _ = sim.wait().await;
        drop(sim);

        let mut values = Vec::new();
        let mut phases = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            match ev {
                ProgressEvent::Progress { value } => values.push(value),
                ProgressEvent::Phase { phase } => phases.push(phase),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(values, vec![20, 40, 60, 80, 100]);
        assert_eq!(
            phases,
            vec![
                Phase::RuleScan,
                Phase::ThreatDetection,
                Phase::IocAnalysis,
                Phase::Finalizing
            ]
        );
    }
}
