//! Time range handling for mesh boundaries.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// One end of a configured time range.
///
/// Either an absolute date (`2019-03-01`) or a date relative to the day the
/// mesh is built (`TODAY`, `TODAY-5`, `TODAY+2`, in days).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    Absolute(NaiveDate),
    RelativeToToday(i64),
}

impl TimeBound {
    /// Parse a configured time bound.
    pub fn parse(s: &str) -> MeshResult<Self> {
        let trimmed = s.trim();
        let upper = trimmed.to_uppercase();

        if let Some(rest) = upper.strip_prefix("TODAY") {
            let rest: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
            if rest.is_empty() {
                return Ok(TimeBound::RelativeToToday(0));
            }
            let offset: i64 = rest
                .trim_start_matches('+')
                .parse()
                .map_err(|_| MeshError::InvalidTime(s.to_string()))?;
            return Ok(TimeBound::RelativeToToday(offset));
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(TimeBound::Absolute)
            .map_err(|_| MeshError::InvalidTime(s.to_string()))
    }

    /// Resolve against a reference "today".
    pub fn resolve_at(&self, today: NaiveDate) -> NaiveDate {
        match self {
            TimeBound::Absolute(date) => *date,
            TimeBound::RelativeToToday(days) => today + Duration::days(*days),
        }
    }

    /// Resolve against the current UTC date.
    pub fn resolve(&self) -> NaiveDate {
        self.resolve_at(Utc::now().date_naive())
    }
}

/// An inclusive range of dates attached to a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> MeshResult<Self> {
        if end < start {
            return Err(MeshError::InvalidTime(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a pair of configured bounds, resolving relative ones against today.
    pub fn parse(start: &str, end: &str) -> MeshResult<Self> {
        let start = TimeBound::parse(start)?.resolve();
        let end = TimeBound::parse(end)?.resolve();
        Self::new(start, end)
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        date >= &self.start && date <= &self.end
    }
}
