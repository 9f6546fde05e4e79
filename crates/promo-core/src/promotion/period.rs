//! Promotion validity window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// The closed interval `[start, end]` during which a promotion may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPeriod")]
pub struct PromotionPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawPeriod> for PromotionPeriod {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        PromotionPeriod::new(raw.start, raw.end)
    }
}

impl PromotionPeriod {
    /// Creates a period.
    ///
    /// ## Errors
    /// `Inconsistent` when `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::Inconsistent(format!(
                "promotion start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(PromotionPeriod { start, end })
    }

    /// A period starting at `start` and lasting `days` days.
    pub fn for_days(start: DateTime<Utc>, days: u32) -> Self {
        PromotionPeriod {
            start,
            end: start + Duration::days(i64::from(days)),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True when `now` lies within `[start, end]`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// True when the wall clock lies within the period.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end
    }

    /// True when the two closed intervals share at least one instant.
    pub fn overlaps(&self, other: &PromotionPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_days(&self) -> i64 {
        self.duration().num_days()
    }

    /// Moves the end `days` later.
    pub fn extend_by_days(&self, days: u32) -> PromotionPeriod {
        PromotionPeriod {
            start: self.start,
            end: self.end + Duration::days(i64::from(days)),
        }
    }

    /// Moves the end `days` earlier.
    ///
    /// ## Errors
    /// `Inconsistent` if the new end would precede the start.
    pub fn shorten_by_days(&self, days: u32) -> ValidationResult<PromotionPeriod> {
        PromotionPeriod::new(self.start, self.end - Duration::days(i64::from(days)))
    }
}
