use chrono::NaiveDate;

/// Failures surfaced by the accumulation core. Recomputation is
/// all-or-nothing: any of these aborts the replay before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// Weather is missing for one or more dates inside the computed range.
    DataGap { from: NaiveDate, to: NaiveDate },
    /// No parameter version covers the date. Impossible while the
    /// first-version-at-start-date invariant holds; fatal if it surfaces.
    NoApplicableParameters { date: NaiveDate },
    InvalidResetDate { date: NaiveDate, reason: String },
    DuplicateResetDate { date: NaiveDate },
}

impl EngineError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DataGap { .. } => "data_gap",
            Self::NoApplicableParameters { .. } => "no_applicable_parameters",
            Self::InvalidResetDate { .. } => "invalid_reset_date",
            Self::DuplicateResetDate { .. } => "duplicate_reset_date",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataGap { from, to } => {
                write!(f, "missing weather data from {from} to {to}")
            }
            Self::NoApplicableParameters { date } => {
                write!(f, "no parameter version covers {date}")
            }
            Self::InvalidResetDate { date, reason } => {
                write!(f, "invalid reset date {date}: {reason}")
            }
            Self::DuplicateResetDate { date } => {
                write!(f, "a reset already exists on {date}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
