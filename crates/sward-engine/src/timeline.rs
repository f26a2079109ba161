use crate::error::EngineError;
use chrono::NaiveDate;
use sward_model::ParameterVersion;

/// Ordered view over a model's parameter versions. The version with the
/// greatest `effective_from` not after the queried date is authoritative.
#[derive(Debug, Clone)]
pub struct ParameterTimeline {
    versions: Vec<ParameterVersion>,
}

impl ParameterTimeline {
    /// Builds a timeline from versions in any order. Uniqueness of
    /// `effective_from` per model is enforced by the store; with equal
    /// dates the later-listed version wins (stable sort).
    #[must_use]
    pub fn new(mut versions: Vec<ParameterVersion>) -> Self {
        versions.sort_by_key(|v| v.effective_from);
        Self { versions }
    }

    pub fn resolve(&self, date: NaiveDate) -> Result<&ParameterVersion, EngineError> {
        let idx = self.versions.partition_point(|v| v.effective_from <= date);
        if idx == 0 {
            return Err(EngineError::NoApplicableParameters { date });
        }
        Ok(&self.versions[idx - 1])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }
}
