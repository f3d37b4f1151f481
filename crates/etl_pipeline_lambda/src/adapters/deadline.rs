use std::time::Duration;

use chrono::{DateTime, Utc};

pub trait TimeBudget {
    fn remaining(&self) -> Duration;
}

/// Wall-clock deadline of the current Lambda invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LambdaDeadline {
    deadline: DateTime<Utc>,
}

impl LambdaDeadline {
    pub fn new(deadline: DateTime<Utc>) -> Self {
        Self { deadline }
    }

    /// Builds from the runtime's deadline in milliseconds since the epoch.
    pub fn from_epoch_millis(deadline_ms: u64) -> Option<Self> {
        let millis = i64::try_from(deadline_ms).ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self::new)
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl TimeBudget for LambdaDeadline {
    fn remaining(&self) -> Duration {
        self.remaining_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_counts_down_to_deadline() {
        let deadline =
            LambdaDeadline::from_epoch_millis(1_700_000_060_000).expect("deadline should parse");
        let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).expect("now should parse");

        assert_eq!(deadline.remaining_at(now), Duration::from_secs(60));
    }

    #[test]
    fn remaining_is_zero_after_deadline() {
        let deadline =
            LambdaDeadline::from_epoch_millis(1_700_000_000_000).expect("deadline should parse");
        let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_005_000).expect("now should parse");

        assert_eq!(deadline.remaining_at(now), Duration::ZERO);
    }

    #[test]
    fn rejects_out_of_range_deadline() {
        assert_eq!(LambdaDeadline::from_epoch_millis(u64::MAX), None);
    }
}
