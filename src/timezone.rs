//! Looking up the UTC offset of the configured timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The current UTC offset of `canonical_timezone`, e.g. "Asia/Kolkata".
///
/// Returns `None` if the name is not a canonical timezone name.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod timezone_tests {
    use time::UtcOffset;

    use super::get_local_offset;

    #[test]
    fn finds_fixed_offset_timezones() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
        assert_eq!(
            get_local_offset("Asia/Kolkata"),
            UtcOffset::from_hms(5, 30, 0).ok()
        );
    }

    #[test]
    fn rejects_unknown_timezones() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
        assert_eq!(get_local_offset(""), None);
    }
}
