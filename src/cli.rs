use crate::config::{self, Settings};
use crate::error::ConfigError;
use crate::locale::Locale;
use crate::model::{Phase, ProgressEvent, SimConfig};
use crate::orchestrator::{run_controller, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
#[derive(Debug, PartialEq, Eq)]
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "forge-progress",
    version,
    about = "CortexDFIR-Forge analysis progress with optional TUI"
)]
pub struct Cli {
    /// Print every event as a JSON line, run once and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print progress and a text summary, run once and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Settings file (JSON); defaults to <config dir>/forge-progress/config.json if present
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Interval between progress ticks
    #[arg(long)]
    pub tick_interval: Option<humantime::Duration>,

    /// Percentage points added per tick (1-100)
    #[arg(long)]
    pub step: Option<u8>,

    /// Delay between reaching 100% and showing results
    #[arg(long)]
    pub settle_delay: Option<humantime::Duration>,

    /// How long a notification stays fully visible
    #[arg(long)]
    pub notification_visible: Option<humantime::Duration>,

    /// Fade-out period before a notification is removed
    #[arg(long)]
    pub notification_fade: Option<humantime::Duration>,

    /// UI language
    #[arg(long, value_enum)]
    pub lang: Option<Locale>,

    /// Stop the analysis once progress reaches this percentage (text/JSON modes)
    #[arg(long)]
    pub stop_at: Option<u8>,

    /// Use --auto-start true or --auto-start false to override (TUI)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_start: bool,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }
}

/// Build validated `Settings` from the config file and CLI overrides.
pub fn build_settings(args: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = config::load(args.config.as_deref())?;
    if let Some(d) = args.tick_interval {
        settings.simulator.tick_interval = Duration::from(d);
    }
    if let Some(step) = args.step {
        settings.simulator.step = step;
    }
    if let Some(d) = args.settle_delay {
        settings.simulator.settle_delay = Duration::from(d);
    }
    if let Some(d) = args.notification_visible {
        settings.notifications.visible = Duration::from(d);
    }
    if let Some(d) = args.notification_fade {
        settings.notifications.fade = Duration::from(d);
    }
    if let Some(lang) = args.lang {
        settings.locale = lang;
    }
    if let Some(percent) = args.stop_at {
        if !(1..=100).contains(&percent) {
            return Err(ConfigError::StopAtOutOfRange { percent });
        }
    }
    settings.validate()?;
    Ok(settings)
}

pub async fn run(args: Cli) -> Result<()> {
    let settings = build_settings(&args).context("invalid configuration")?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, settings).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(&args, settings, OutputMode::Text).await;
        }
    }

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    run_headless(&args, settings, mode).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
}

/// Turns events into text-mode output lines, remembering what was already shown.
struct TextRenderer {
    locale: Locale,
    sim: SimConfig,
    last_phase: Option<Phase>,
    last_decile: u8,
}

impl TextRenderer {
    fn new(settings: &Settings) -> Self {
        Self {
            locale: settings.locale,
            sim: settings.simulator.clone(),
            last_phase: None,
            last_decile: 0,
        }
    }

    fn render(&mut self, ev: &ProgressEvent) -> Vec<OutputLine> {
        let mut out = Vec::new();
        match ev {
            ProgressEvent::RunStarted { started_at } => {
                self.last_phase = None;
                self.last_decile = 0;
                out.push(OutputLine::Stderr(self.locale.run_started_at(started_at)));
            }
            ProgressEvent::Phase { phase } => {
                if self.last_phase != Some(*phase) {
                    self.last_phase = Some(*phase);
                    out.push(OutputLine::Stderr(format!(
                        "== {} ==",
                        phase.label(self.locale)
                    )));
                }
            }
            ProgressEvent::Progress { value } => {
                // One line per 10% crossed keeps the log readable at any step size.
                let decile = value / 10;
                if decile > self.last_decile {
                    self.last_decile = decile;
                    out.push(OutputLine::Stderr(format!("{value:>3}%")));
                }
            }
            ProgressEvent::Notification(n) => {
                out.push(OutputLine::Stderr(format!(
                    "[{}] {}",
                    n.severity.as_str(),
                    n.message
                )));
            }
            ProgressEvent::NotificationFading { .. } | ProgressEvent::NotificationRemoved { .. } => {}
            ProgressEvent::Info(info) => {
                out.push(OutputLine::Stderr(info.to_message(self.locale)));
            }
            ProgressEvent::RunCompleted { report } => {
                let summary = crate::text_summary::build_text_summary(report, &self.sim);
                out.extend(summary.lines.into_iter().map(OutputLine::Stdout));
            }
            ProgressEvent::RunStopped { progress, ticks } => {
                out.push(OutputLine::Stdout(
                    self.locale.stopped_after(*progress, *ticks),
                ));
            }
        }
        out
    }
}

/// Run a single analysis without the TUI and exit once the run is over and every
/// notification has expired.
async fn run_headless(args: &Cli, settings: Settings, mode: OutputMode) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let res = drive_headless(args, settings, mode, &out_tx).await;
    drop(out_tx);
    let _ = out_handle.await;
    res
}

/// Event loop behind the headless modes; rendered lines go to `out_tx`.
async fn drive_headless(
    args: &Cli,
    settings: Settings,
    mode: OutputMode,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let ctrl_settings = settings.clone();
    let controller =
        tokio::spawn(async move { run_controller(&ctrl_settings, true, event_tx, cmd_rx).await });

    let mut renderer = TextRenderer::new(&settings);
    let mut live_notifications: HashSet<u64> = HashSet::new();
    let mut stop_sent = false;
    let mut run_over = false;
    let mut quit_sent = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    // The channel closes once the controller and every notification timer are done.
    loop {
        let ev = tokio::select! {
            ev = event_rx.recv() => match ev {
                Some(ev) => ev,
                None => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                tracing::warn!("interrupted, stopping the analysis");
                interrupted = true;
                let _ = cmd_tx.send(UiCommand::Quit);
                quit_sent = true;
                continue;
            }
        };
        match &ev {
            ProgressEvent::Progress { value } => {
                if !stop_sent && args.stop_at.is_some_and(|p| *value >= p) {
                    let _ = cmd_tx.send(UiCommand::Stop);
                    stop_sent = true;
                }
            }
            ProgressEvent::Notification(n) => {
                live_notifications.insert(n.id);
            }
            ProgressEvent::NotificationRemoved { id } => {
                live_notifications.remove(id);
            }
            ProgressEvent::RunCompleted { .. } | ProgressEvent::RunStopped { .. } => {
                run_over = true;
            }
            _ => {}
        }

        match mode {
            OutputMode::Json => {
                let line = serde_json::to_string(&ev).context("serialize event")?;
                let _ = out_tx.send(OutputLine::Stdout(line));
            }
            OutputMode::Text => {
                for line in renderer.render(&ev) {
                    let _ = out_tx.send(line);
                }
            }
        }

        if run_over && live_notifications.is_empty() && !quit_sent {
            let _ = cmd_tx.send(UiCommand::Quit);
            quit_sent = true;
        }
    }

    controller
        .await
        .context("controller task failed")?
        .context("analysis run failed")?;
    Ok(())
}
