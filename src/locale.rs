//! User-facing wording for the two supported UI languages.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn analysis_started(self) -> &'static str {
        match self {
            Locale::En => "Analysis started",
            Locale::Fr => "Analyse démarrée",
        }
    }

    pub fn analysis_stopped(self) -> &'static str {
        match self {
            Locale::En => "Analysis stopped by user",
            Locale::Fr => "Analyse arrêtée par l'utilisateur",
        }
    }

    pub fn analysis_completed(self) -> &'static str {
        match self {
            Locale::En => "Analysis completed successfully",
            Locale::Fr => "Analyse terminée avec succès",
        }
    }

    pub fn already_running(self) -> &'static str {
        match self {
            Locale::En => "An analysis is already running",
            Locale::Fr => "Une analyse est déjà en cours",
        }
    }

    pub fn nothing_to_stop(self) -> &'static str {
        match self {
            Locale::En => "No analysis is running",
            Locale::Fr => "Aucune analyse en cours",
        }
    }

    pub fn run_failed(self) -> &'static str {
        match self {
            Locale::En => "Analysis run failed unexpectedly",
            Locale::Fr => "L'analyse a échoué de manière inattendue",
        }
    }

    pub fn no_results(self) -> &'static str {
        match self {
            Locale::En => "No results yet",
            Locale::Fr => "Aucun résultat pour le moment",
        }
    }

    pub fn run_started_at(self, started_at: &str) -> String {
        match self {
            Locale::En => format!("Run started at {started_at}"),
            Locale::Fr => format!("Analyse lancée à {started_at}"),
        }
    }

    pub fn stopped_at(self, progress: u8) -> String {
        match self {
            Locale::En => format!("Stopped at {progress}%"),
            Locale::Fr => format!("Arrêtée à {progress}%"),
        }
    }

    pub fn stopped_after(self, progress: u8, ticks: u32) -> String {
        match self {
            Locale::En => format!("Stopped at {progress}% after {ticks} ticks"),
            Locale::Fr => format!("Arrêtée à {progress}% après {ticks} étapes"),
        }
    }

    pub fn waiting_to_start(self) -> &'static str {
        match self {
            Locale::En => "Press s to start an analysis",
            Locale::Fr => "Appuyez sur s pour lancer une analyse",
        }
    }
}
