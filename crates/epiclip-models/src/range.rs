//! Time range validation and clamping policy.
//!
//! Two validation policies exist, one per artifact-serving strategy:
//!
//! - [`validate_range`] bounds a range against the episode duration and
//!   clamps an overshooting *end* marker down to the duration. A start
//!   marker outside the episode is always a hard error; the asymmetry
//!   is deliberate.
//! - [`validate_against_snapshots`] additionally requires both
//!   endpoints to coincide with precomputed snapshot instants. Used by
//!   endpoints that serve stored frames instead of transcoding.

use thiserror::Error;

use crate::library::Episode;

/// A validated `(start, end)` pair in milliseconds.
///
/// Invariant: `start < end <= duration` of the episode it was
/// validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimeRange {
    /// Span of the range in milliseconds.
    pub fn span_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Range validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// An endpoint lies outside the episode and clamping does not apply.
    #[error("time out of range")]
    OutOfRange,
    /// Start is not before end (after clamping).
    #[error("bad time range")]
    BadRange,
    /// Span exceeds the policy maximum for the artifact kind.
    #[error("requested time range exceeds maximum limit")]
    RangeTooLarge { max_span_ms: u64 },
}

/// Clamp an end marker to the episode duration.
///
/// Returns the effective end and whether clamping occurred. Only end
/// markers fail gracefully this way; start markers never clamp.
pub fn clamp_end(end_ms: u64, duration_ms: u64) -> (u64, bool) {
    if end_ms > duration_ms {
        (duration_ms, true)
    } else {
        (end_ms, false)
    }
}

/// Validate a single instant against the episode duration.
pub fn validate_instant(ms: u64, duration_ms: u64) -> Result<(), RangeError> {
    if ms > duration_ms {
        Err(RangeError::OutOfRange)
    } else {
        Ok(())
    }
}

/// Validate a requested range against the episode duration.
///
/// The start marker must lie within the episode. An end marker past the
/// episode is clamped to its duration. After clamping, the range must
/// be non-empty and its span must not exceed `max_span_ms` (inclusive).
pub fn validate_range(
    start_ms: u64,
    end_ms: u64,
    max_span_ms: u64,
    duration_ms: u64,
) -> Result<TimeRange, RangeError> {
    if start_ms > duration_ms {
        return Err(RangeError::OutOfRange);
    }
    let (end_ms, _clamped) = clamp_end(end_ms, duration_ms);
    if start_ms >= end_ms {
        return Err(RangeError::BadRange);
    }
    if end_ms - start_ms > max_span_ms {
        return Err(RangeError::RangeTooLarge { max_span_ms });
    }
    Ok(TimeRange { start_ms, end_ms })
}

/// Validate a range against the episode's precomputed snapshot instants.
///
/// Stricter than [`validate_range`]: no clamping, and both endpoints
/// must be instants for which a frame was precomputed.
pub fn validate_against_snapshots(start_ms: u64, end_ms: u64, episode: &Episode) -> bool {
    start_ms < end_ms
        && end_ms <= episode.duration_ms
        && episode.has_snapshot(start_ms)
        && episode.has_snapshot(end_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Episode;

    fn episode_with_snapshots(duration_ms: u64, instants: &[u64]) -> Episode {
        let mut episode = Episode::new("ep1", "/tmp/ep1.mkv", duration_ms);
        episode.snapshot_instants = instants.iter().copied().collect();
        episode
    }

    #[test]
    fn test_clamp_end() {
        assert_eq!(clamp_end(500, 1000), (500, false));
        assert_eq!(clamp_end(1000, 1000), (1000, false));
        assert_eq!(clamp_end(1500, 1000), (1000, true));
    }

    #[test]
    fn test_start_past_duration_is_hard_error() {
        assert_eq!(
            validate_range(600_001, 610_000, 10_000, 600_000),
            Err(RangeError::OutOfRange)
        );
    }

    #[test]
    fn test_end_clamps_to_duration() {
        // 600s episode, 10s gif budget: (590s, 605s) clamps to 600s and passes
        let range = validate_range(590_000, 605_000, 10_000, 600_000).unwrap();
        assert_eq!(range.end_ms, 600_000);
        assert_eq!(range.span_ms(), 10_000);
    }

    #[test]
    fn test_span_bound_is_inclusive() {
        let range = validate_range(590_000, 604_000, 10_000, 600_000).unwrap();
        assert_eq!(range.span_ms(), 10_000);

        assert_eq!(
            validate_range(589_000, 600_000, 10_000, 600_000),
            Err(RangeError::RangeTooLarge { max_span_ms: 10_000 })
        );
    }

    #[test]
    fn test_start_not_before_end() {
        assert_eq!(
            validate_range(5_000, 5_000, 10_000, 600_000),
            Err(RangeError::BadRange)
        );
        assert_eq!(
            validate_range(6_000, 5_000, 10_000, 600_000),
            Err(RangeError::BadRange)
        );
        // Clamping can empty the range: start at duration, end past it
        assert_eq!(
            validate_range(600_000, 700_000, 10_000, 600_000),
            Err(RangeError::BadRange)
        );
    }

    #[test]
    fn test_validate_instant() {
        assert_eq!(validate_instant(0, 600_000), Ok(()));
        assert_eq!(validate_instant(600_000, 600_000), Ok(()));
        assert_eq!(validate_instant(600_001, 600_000), Err(RangeError::OutOfRange));
    }

    #[test]
    fn test_snapshot_policy_requires_known_instants() {
        let episode = episode_with_snapshots(600_000, &[0, 1_000, 2_000]);

        assert!(validate_against_snapshots(0, 2_000, &episode));
        // end not a snapshot instant
        assert!(!validate_against_snapshots(0, 1_500, &episode));
        // start not a snapshot instant
        assert!(!validate_against_snapshots(500, 2_000, &episode));
        // empty range
        assert!(!validate_against_snapshots(1_000, 1_000, &episode));
    }
}
