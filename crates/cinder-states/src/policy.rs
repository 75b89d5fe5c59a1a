//! Freshness policy gating cache writes.

use chrono::{DateTime, Utc};

/// Decides whether a candidate record may replace what is already stored.
///
/// An empty slot is always written, even by a record that carries no
/// timestamp. Once a value exists it only gives way to a strictly newer
/// one; ties keep the stored value, so replaying the same completion
/// event never re-serializes.
pub fn should_update(
    current: Option<DateTime<Utc>>,
    candidate: Option<DateTime<Utc>>,
) -> bool {
    match (current, candidate) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(current), Some(candidate)) => candidate > current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 4, 22, 22, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_slot_always_updates() {
        assert!(should_update(None, Some(at(10))));
        assert!(should_update(None, None));
    }

    #[test]
    fn test_newer_candidate_updates() {
        assert!(should_update(Some(at(12)), Some(at(14))));
    }

    #[test]
    fn test_older_candidate_is_rejected() {
        assert!(!should_update(Some(at(12)), Some(at(10))));
    }

    #[test]
    fn test_tie_keeps_stored_value() {
        assert!(!should_update(Some(at(12)), Some(at(12))));
    }

    #[test]
    fn test_candidate_without_timestamp_never_displaces() {
        assert!(!should_update(Some(at(12)), None));
    }
}
