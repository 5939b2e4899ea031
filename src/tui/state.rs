use crate::config::Settings;
use crate::locale::Locale;
use crate::model::{Phase, ProgressEvent, RunReport, Severity, SimConfig};
use crate::notify::{NotificationBoard, NotificationEntry, NotificationSink};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub struct UiState {
    pub tab: usize,
    pub locale: Locale,
    pub sim: SimConfig,
    pub running: bool,
    pub progress: u8,
    pub phase: Option<Phase>,
    pub info: String,
    pub run_started_at: Option<String>,
    // Mirror of the controller's notifications, kept in display order
    pub notifications: NotificationBoard,
    pub last_report: Option<RunReport>,
    pub last_stop: Option<(u8, u32)>,
}

impl UiState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tab: 0,
            locale: settings.locale,
            sim: settings.simulator.clone(),
            running: false,
            progress: 0,
            phase: None,
            info: settings.locale.waiting_to_start().to_string(),
            run_started_at: None,
            notifications: NotificationBoard::new(),
            last_report: None,
            last_stop: None,
        }
    }

    pub fn apply_event(&mut self, ev: ProgressEvent) {
        match ev {
            ProgressEvent::RunStarted { started_at } => {
                self.running = true;
                self.progress = 0;
                self.phase = None;
                self.last_report = None;
                self.last_stop = None;
                self.info = self.locale.run_started_at(&started_at);
                self.run_started_at = Some(started_at);
            }
            ProgressEvent::Progress { value } => self.progress = value,
            ProgressEvent::Phase { phase } => self.phase = Some(phase),
            ProgressEvent::Notification(n) => self.notifications.push_notification(&n),
            ProgressEvent::NotificationFading { id } => self.notifications.fade_notification(id),
            ProgressEvent::NotificationRemoved { id } => {
                self.notifications.remove_notification(id)
            }
            ProgressEvent::Info(info) => self.info = info.to_message(self.locale),
            ProgressEvent::RunCompleted { report } => {
                self.running = false;
                self.info = self.locale.analysis_completed().to_string();
                self.last_report = Some(*report);
            }
            ProgressEvent::RunStopped { progress, ticks } => {
                self.running = false;
                self.last_stop = Some((progress, ticks));
                self.info = self.locale.stopped_at(progress);
            }
        }
    }

    /// Text under the gauge: the active phase, or where the run ended up.
    pub fn status_text(&self) -> String {
        if self.last_report.is_some() {
            return self.locale.analysis_completed().to_string();
        }
        if let Some((progress, _)) = self.last_stop {
            return format!("{} ({progress}%)", self.locale.analysis_stopped());
        }
        match (self.running, self.phase) {
            (true, Some(phase)) if self.progress < 100 => phase.label(self.locale).to_string(),
            (true, _) if self.progress >= 100 => "...".to_string(),
            (true, _) => Phase::Initializing.label(self.locale).to_string(),
            (false, _) => self.locale.waiting_to_start().to_string(),
        }
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Warning => Color::Yellow,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}

pub fn notification_line(entry: &NotificationEntry) -> Line<'static> {
    let n = &entry.notification;
    let (tag_style, text_style) = if entry.fading {
        let dim = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM);
        (dim, dim)
    } else {
        (
            Style::default()
                .fg(severity_color(n.severity))
                .add_modifier(Modifier::BOLD),
            Style::default(),
        )
    };
    Line::from(vec![
        Span::styled(format!("[{}]", n.severity.as_str()), tag_style),
        Span::raw(" "),
        Span::styled(n.message.clone(), text_style),
    ])
}
