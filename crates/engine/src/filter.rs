use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("cannot use include and exclude validator lists at the same time")]
    IncludeAndExclude,
}

/// Decides which validators are tracked, by operator address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MonitorFilter {
    #[default]
    All,
    IncludeOnly(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl MonitorFilter {
    /// Builds the filter from the configured lists. Empty lists mean "not configured".
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::IncludeOnly(include.iter().cloned().collect())),
            (true, false) => Ok(Self::Exclude(exclude.iter().cloned().collect())),
            (false, false) => Err(FilterError::IncludeAndExclude),
        }
    }

    pub fn is_monitored(&self, operator_address: &str) -> bool {
        match self {
            Self::All => true,
            Self::IncludeOnly(addresses) => addresses.contains(operator_address),
            Self::Exclude(addresses) => !addresses.contains(operator_address),
        }
    }
}
