use crate::model::Phase;

/// Half-open progress range `[start, end)` mapped to one phase.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PhaseBand {
    pub start: u8,
    pub end: u8,
    pub phase: Phase,
}

/// Ordered, contiguous bands covering `[0, 100)`. 100 has no band; completion owns it.
pub(crate) const PHASE_BANDS: [PhaseBand; 5] = [
    PhaseBand {
        start: 0,
        end: 20,
        phase: Phase::Initializing,
    },
    PhaseBand {
        start: 20,
        end: 40,
        phase: Phase::RuleScan,
    },
    PhaseBand {
        start: 40,
        end: 60,
        phase: Phase::ThreatDetection,
    },
    PhaseBand {
        start: 60,
        end: 80,
        phase: Phase::IocAnalysis,
    },
    PhaseBand {
        start: 80,
        end: 100,
        phase: Phase::Finalizing,
    },
];

/// Phase for a progress value, or `None` once the run is at 100.
pub fn phase_for(progress: u8) -> Option<Phase> {
    PHASE_BANDS
        .iter()
        .find(|b| (b.start..b.end).contains(&progress))
        .map(|b| b.phase)
}
