//! strftime-style layouts for formatting and parsing timestamps.
//!
//! Layouts use the directives of [`jiff::fmt::strtime`]: `%Y`, `%m`, `%d`, `%e`, `%F`, `%j`,
//! `%a`, `%A`, `%b`, `%B`, `%H`, `%M`, `%S`, `%T`, `%z`, `%Z`, `%V`, `%%` and the rest.
//! Formatting renders the timestamp on its zone's wall clock and covers years -9999 through
//! 9999. Parsing needs the full date (a year, a month and a day of the month); a missing
//! time of day is midnight. `%Z` can only be formatted.

use jiff::fmt::strtime::BrokenDownTime;
use jiff::tz::{Offset, TimeZone};

use crate::error::{Error, Result};
use crate::gregorian_normalized_date::day_from_overflowing_date;
use crate::timestamp::{Timestamp, SECONDS_PER_DAY};
use crate::zone::Zone;

/// ISO 8601 calendar date, `YYYY-MM-DD`.
pub const DEFAULT_LAYOUT: &str = "%Y-%m-%d";

/// Renders `timestamp` on its zone's wall clock.
pub fn format(layout: &str, timestamp: &Timestamp) -> Result<String> {
    let fail = |err: jiff::Error| Error::format(layout, err.to_string());
    let zoned = to_zoned(timestamp).map_err(fail)?;
    let mut rendered = String::with_capacity(layout.len() + 10);
    BrokenDownTime::from(&zoned)
        .format(layout, &mut rendered)
        .map_err(fail)?;
    Ok(rendered)
}

/// Parses `text` against `layout`.
///
/// Text without an offset is read as wall-clock time in `zone`. With an offset, the result
/// is in `zone` when the offset agrees with it and in an unnamed fixed zone otherwise.
pub fn parse(layout: &str, text: &str, zone: &Zone) -> Result<Timestamp> {
    let fail = |err: jiff::Error| Error::parse(layout, text, err.to_string());
    let tm = BrokenDownTime::parse(layout, text).map_err(fail)?;
    let datetime = tm.to_datetime().map_err(fail)?;

    let day = day_from_overflowing_date(
        datetime.year() as i64,
        datetime.month() as i64,
        datetime.day() as i64,
    );
    let local_seconds = day * SECONDS_PER_DAY
        + datetime.hour() as i64 * 3600
        + datetime.minute() as i64 * 60
        + datetime.second() as i64;
    let nanos = datetime.subsec_nanosecond() as u32;
    Ok(match tm.offset() {
        None => Timestamp::from_local_seconds(local_seconds, nanos, zone),
        Some(offset) => {
            let offset = offset.seconds();
            let unix_seconds = local_seconds - offset as i64;
            let zone = if zone.offset_at(unix_seconds) == offset {
                zone.clone()
            } else {
                Zone::fixed("", offset)
            };
            Timestamp::new(unix_seconds, nanos, zone)
        }
    })
}

/// The instant as a jiff zoned datetime carrying the offset and abbreviation in force at it.
fn to_zoned(timestamp: &Timestamp) -> std::result::Result<jiff::Zoned, jiff::Error> {
    let offset = Offset::from_seconds(timestamp.offset())?;
    let instant = jiff::Timestamp::new(timestamp.unix_seconds(), timestamp.nanos() as i32)?;
    Ok(instant.to_zoned(fixed_zone(offset, &timestamp.abbreviation())))
}

/// A jiff zone fixed at `offset` that renders `abbreviation` for `%Z`.
fn fixed_zone(offset: Offset, abbreviation: &str) -> TimeZone {
    let nameable = abbreviation.len() >= 3
        && abbreviation
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-');
    if !nameable {
        return TimeZone::fixed(offset);
    }
    // POSIX TZ offsets count westward.
    let seconds = offset.seconds();
    let sign = if seconds > 0 { '-' } else { '+' };
    let seconds = seconds.unsigned_abs();
    let rule = format!(
        "<{}>{}{}:{:02}:{:02}",
        abbreviation,
        sign,
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    );
    TimeZone::posix(&rule).unwrap_or_else(|_| TimeZone::fixed(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::tests::stockholm_2024;

    fn render(layout: &str, t: &Timestamp) -> String {
        format(layout, t).unwrap()
    }

    #[test]
    fn format_date_directives() {
        let t = Timestamp::midnight(2024, 3, 5, &Zone::utc());
        assert_eq!(render(DEFAULT_LAYOUT, &t), "2024-03-05");
        assert_eq!(render("%d/%m/%Y", &t), "05/03/2024");
        assert_eq!(render("%e %B", &t), " 5 March");
        assert_eq!(render("%a %b %A", &t), "Tue Mar Tuesday");
        assert_eq!(render("%j", &t), "065");
        assert_eq!(render("100%%", &t), "100%");
        assert_eq!(render("%Y", &Timestamp::midnight(7, 1, 1, &Zone::utc())), "0007");
    }

    #[test]
    fn format_uses_the_zone_wall_clock() {
        // 2024-06-30T23:30Z
        let t = Timestamp::new(1_719_790_200, 0, Zone::utc());
        assert_eq!(render("%F %T %z %Z", &t), "2024-06-30 23:30:00 +0000 UTC");
        let t = t.in_zone(&stockholm_2024());
        assert_eq!(render("%F %T %z %Z", &t), "2024-07-01 01:30:00 +0200 CEST");
        let t = t.in_zone(&Zone::fixed("", -(3 * 3600 + 1800)));
        assert_eq!(render("%H:%M %z %Z", &t), "20:00 -0330 -0330");
    }

    #[test]
    fn format_errors() {
        let t = Timestamp::midnight(2024, 3, 5, &Zone::utc());
        assert!(matches!(format("%", &t), Err(Error::Format { .. })));
        let far = Timestamp::midnight(12345, 1, 1, &Zone::utc());
        assert!(matches!(
            format(DEFAULT_LAYOUT, &far),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn parse_dates() {
        let t = parse(DEFAULT_LAYOUT, "2024-02-29", &Zone::utc()).unwrap();
        assert_eq!(t, Timestamp::midnight(2024, 2, 29, &Zone::utc()));
        let t = parse("%d %B %Y", "05 March 2024", &Zone::utc()).unwrap();
        assert_eq!(t.civil_date(), (2024, 3, 5));
        let t = parse("%m/%d/%Y %H:%M", "03/15/2024 13:45", &Zone::utc()).unwrap();
        assert_eq!(t.civil_date(), (2024, 3, 15));
        assert_eq!(t.clock(), (13, 45, 0));
    }

    #[test]
    fn parse_in_zone() {
        let zone = stockholm_2024();
        let t = parse(DEFAULT_LAYOUT, "2024-07-01", &zone).unwrap();
        assert_eq!(t.unix_seconds(), 1_719_784_800);
        assert_eq!(t.zone(), &zone);
    }

    #[test]
    fn parse_with_offset() {
        let t = parse("%FT%T%:z", "2024-06-30T23:30:00+02:00", &Zone::utc()).unwrap();
        assert_eq!(t.unix_seconds(), 1_719_783_000);
        assert_eq!(t.zone(), &Zone::fixed("", 7200));
        assert_eq!(t.civil_date(), (2024, 6, 30));

        // An offset that agrees with the zone keeps the zone.
        let zone = stockholm_2024();
        let t = parse("%FT%T%z", "2024-06-30T23:30:00+0200", &zone).unwrap();
        assert_eq!(t.zone(), &zone);
    }

    #[test]
    fn parse_errors() {
        let fails = |layout, text| {
            matches!(
                parse(layout, text, &Zone::utc()),
                Err(Error::Parse { .. })
            )
        };
        assert!(fails(DEFAULT_LAYOUT, "2023-02-29"));
        assert!(fails(DEFAULT_LAYOUT, "2024-13-01"));
        assert!(fails(DEFAULT_LAYOUT, "2024-01-01 "));
        assert!(fails(DEFAULT_LAYOUT, ""));
        // A date needs a year, a month and a day.
        assert!(fails("%m/%d", "07/04"));
        // Weekday disagrees with the date.
        assert!(fails("%a %F", "Mon 2024-03-05"));
        assert!(fails("%Q", "2024"));
        assert!(fails("%Z", "UTC"));
    }
}
