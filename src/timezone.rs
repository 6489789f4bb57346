//! Resolves the configured timezone into the local wall clock used for new
//! transaction timestamps and for "the current month".

use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of a canonical timezone such as "Pacific/Auckland".
///
/// # Errors
///
/// Returns an [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// known timezone name.
pub fn get_local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}

/// The current local date and time at `offset`, truncated to the minute.
pub fn local_now(offset: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(offset);
    let time = now.time();
    // Seconds are dropped because timestamps are stored with minute precision.
    let time = time.replace_second(0).unwrap_or(time);
    let time = time.replace_nanosecond(0).unwrap_or(time);

    PrimitiveDateTime::new(now.date(), time)
}

#[cfg(test)]
mod tests {
    use time::UtcOffset;

    use crate::{Error, get_local_offset, local_now};

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Ok(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_eq!(
            get_local_offset("Middle/Earth"),
            Err(Error::InvalidTimezoneError("Middle/Earth".to_owned()))
        );
    }

    #[test]
    fn local_now_has_minute_precision() {
        let now = local_now(UtcOffset::UTC);

        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }
}
