//! Crawl lifecycle state definitions
use crate::SpiderError;
use std::fmt;

/// Represents the lifecycle of one crawl
///
/// A crawl moves `NotStarted -> Running -> Ended`, or straight from `NotStarted` to
/// `Ended` when the seed URL is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlState {
    /// No event emitted yet
    #[default]
    NotStarted,

    /// `CrawlStarted` emitted, batches being processed
    Running,

    /// Last event emitted
    Ended,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns true if moving from this state to `to` is allowed
    pub fn can_transition_to(&self, to: CrawlState) -> bool {
        matches!(
            (self, to),
            (Self::NotStarted, Self::Running)
                | (Self::NotStarted, Self::Ended)
                | (Self::Running, Self::Ended)
        )
    }

    /// Moves to `to`, failing on transitions the lifecycle does not allow
    pub fn transition(self, to: CrawlState) -> Result<CrawlState, SpiderError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(SpiderError::InvalidTransition { from: self, to })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
