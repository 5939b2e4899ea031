use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and step settings for one simulated analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Percentage points added per tick.
    pub step: u8,
    /// Pause between reaching 100% and invoking the completion callback.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            step: 1,
            settle_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays fully visible.
    #[serde(with = "humantime_serde")]
    pub visible: Duration,
    /// Fade-out period between the visible period and removal.
    #[serde(with = "humantime_serde")]
    pub fade: Duration,
}

impl NotificationConfig {
    pub fn lifetime(&self) -> Duration {
        self.visible + self.fade
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            visible: Duration::from_secs(3),
            fade: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Initializing,
    RuleScan,
    ThreatDetection,
    IocAnalysis,
    Finalizing,
}

impl Phase {
    /// Status line shown while the phase is active.
    pub fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Phase::Initializing) => "Initializing analysis...",
            (Locale::En, Phase::RuleScan) => "Scanning files with YARA rules...",
            (Locale::En, Phase::ThreatDetection) => "Detecting threats...",
            (Locale::En, Phase::IocAnalysis) => "Analyzing indicators of compromise...",
            (Locale::En, Phase::Finalizing) => "Generating report...",
            (Locale::Fr, Phase::Initializing) => "Initialisation de l'analyse...",
            (Locale::Fr, Phase::RuleScan) => "Analyse des fichiers avec règles YARA...",
            (Locale::Fr, Phase::ThreatDetection) => "Détection des menaces...",
            (Locale::Fr, Phase::IocAnalysis) => "Analyse des indicateurs de compromission...",
            (Locale::Fr, Phase::Finalizing) => "Génération du rapport...",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub issued_at: String,
}

/// Summary of a run that reached 100%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: String,
    pub ticks: u32,
    pub final_progress: u8,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    /// Measured gap between consecutive ticks, in milliseconds.
    pub tick_intervals_ms: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed(RunReport),
    Cancelled { progress: u8, ticks: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressEvent {
    RunStarted {
        started_at: String,
    },
    Progress {
        value: u8,
    },
    Phase {
        phase: Phase,
    },
    Notification(Notification),
    NotificationFading {
        id: u64,
    },
    NotificationRemoved {
        id: u64,
    },
    Info(InfoEvent),
    RunCompleted {
        // Boxed so the per-tick variants stay small.
        report: Box<RunReport>,
    },
    RunStopped {
        progress: u8,
        ticks: u32,
    },
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    NothingToStop,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self, locale: Locale) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::NothingToStop => locale.nothing_to_stop().to_string(),
        }
    }
}

/// RFC 3339 timestamp for the current instant.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_timings() {
        let sim = SimConfig::default();
        assert_eq!(sim.tick_interval, Duration::from_millis(100));
        assert_eq!(sim.step, 1);
        assert_eq!(sim.settle_delay, Duration::from_millis(500));

        let notes = NotificationConfig::default();
        assert_eq!(notes.lifetime(), Duration::from_millis(3300));
    }

    #[test]
    fn severity_defaults_to_info() {
        assert_eq!(Severity::default(), Severity::Info);
        assert_eq!(
            serde_json::to_string(&Severity::Success).unwrap(),
            "\"success\""
        );
    }

    #[test]
    fn sim_config_reads_humantime_durations() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{"tick_interval":"250ms","step":5}"#).unwrap();
        assert_eq!(cfg.tick_interval, Duration::from_millis(250));
        assert_eq!(cfg.step, 5);
        assert_eq!(cfg.settle_delay, Duration::from_millis(500));
    }

    #[test]
    fn phase_labels_follow_locale() {
        assert_eq!(Phase::Finalizing.label(Locale::En), "Generating report...");
        assert_eq!(
            Phase::Finalizing.label(Locale::Fr),
            "Génération du rapport..."
        );
    }
}
