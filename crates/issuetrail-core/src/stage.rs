//! Outcome of one enrichment stage

/// Result of a stage that never fails the row.
///
/// Every variant carries a value that can be written to a report, so callers
/// can always build a record; the variant says how much to trust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<T> {
    /// The remote source answered and the value is real
    Found(T),
    /// The stage was attempted but part of the value is a placeholder
    Degraded { value: T, reason: String },
    /// Nothing was found or the stage was skipped; the value is all sentinels
    Sentinel { value: T, reason: String },
}

impl<T> Stage<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn sentinel(value: T, reason: impl Into<String>) -> Self {
        Self::Sentinel {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Found(value) | Self::Degraded { value, .. } | Self::Sentinel { value, .. } => {
                value
            }
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Found(value) | Self::Degraded { value, .. } | Self::Sentinel { value, .. } => {
                value
            }
        }
    }

    /// Why the value is not a plain `Found`
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::Degraded { reason, .. } | Self::Sentinel { reason, .. } => Some(reason),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel { .. })
    }
}
