use super::aggregate::AnalysisReport;
use super::fallback::FallbackReport;
use std::fmt;

/// Which rung of the degradation ladder produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Advanced,
    Fallback,
    Emergency,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Advanced => "advanced",
            Tier::Fallback => "fallback",
            Tier::Emergency => "emergency",
        }
    }

    /// Model tag reported to clients.
    pub fn model(&self) -> &'static str {
        match self {
            Tier::Advanced => "advanced-nlp-makhraj-v1",
            Tier::Fallback => "fallback-system",
            Tier::Emergency => "emergency-fallback",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Advanced(Box<AnalysisReport>),
    Fallback(FallbackReport),
    Emergency(FallbackReport),
}

impl AnalysisOutcome {
    pub fn tier(&self) -> Tier {
        match self {
            AnalysisOutcome::Advanced(_) => Tier::Advanced,
            AnalysisOutcome::Fallback(_) => Tier::Fallback,
            AnalysisOutcome::Emergency(_) => Tier::Emergency,
        }
    }

    pub fn model(&self) -> &'static str {
        self.tier().model()
    }

    pub fn overall(&self) -> u8 {
        match self {
            AnalysisOutcome::Advanced(report) => report.scores.overall,
            AnalysisOutcome::Fallback(report) | AnalysisOutcome::Emergency(report) => {
                report.scores.overall
            }
        }
    }

    /// The full report, only available on the primary path.
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Advanced(report) => Some(report),
            _ => None,
        }
    }
}
