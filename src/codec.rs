//! Text, JSON and binary encodings of [`Date`].
//!
//! JSON and text use the ISO 8601 calendar date (`YYYY-MM-DD`) and only cover years 0
//! through 9999, the range in which the encoding sorts the same way the dates do. Decoding
//! accepts exactly that form, so signed or five-digit years are rejected, and yields a date
//! whose display zone is UTC.
//!
//! The binary form is the [`Timestamp`] encoding of midnight in the display zone, so it
//! keeps the zone's offset. Decoding restores a UTC zone, the local zone when the offset
//! matches it, or an unnamed fixed zone.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{self, Serialize, Serializer};

use crate::date::Date;
use crate::error::{Error, Result};
use crate::layout::{self, DEFAULT_LAYOUT};
use crate::timestamp::Timestamp;
use crate::zone::Zone;

// Named in decode errors.
const JSON_LAYOUT: &str = "\"%Y-%m-%d\"";
const JSON_NULL: &[u8] = b"null";

// Exclusive upper bound of the years the JSON and text forms can hold.
const MAX_ENCODED_YEAR: i64 = 10_000;

impl Date {
    /// Parses `text` as a date in `layout`.
    ///
    /// Text without an offset is read in UTC, which becomes the display zone; with an offset
    /// the date is the one on that offset's wall clock. Fails with [`Error::Parse`] when the
    /// text doesn't match or names a date that doesn't exist.
    ///
    /// ```
    /// use plaindate::Date;
    ///
    /// let date = Date::parse("%d %B %Y", "17 May 1814").unwrap();
    /// assert_eq!(date.ymd(), (1814, 5, 17));
    /// ```
    pub fn parse(layout: &str, text: &str) -> Result<Date> {
        Date::parse_in(layout, text, &Zone::utc())
    }

    /// Like [`parse`](Self::parse), but zone-less text is read in `zone`.
    pub fn parse_in(layout: &str, text: &str, zone: &Zone) -> Result<Date> {
        layout::parse(layout, text, zone).map(|t| Date::from_timestamp(&t))
    }

    /// Renders midnight of the date in its display zone (the local zone when it has none).
    ///
    /// Fails with [`Error::Format`] for a malformed layout or a year outside -9999 through
    /// 9999.
    pub fn format(&self, layout: &str) -> Result<String> {
        layout::format(layout, &self.to_timestamp())
    }

    /// Like [`format`](Self::format), appending to `buf`. On error `buf` is unchanged.
    pub fn append_format(&self, layout: &str, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(self.format(layout)?.as_bytes());
        Ok(())
    }

    fn check_encodable(&self) -> Result<()> {
        let year = self.year();
        if (0..MAX_ENCODED_YEAR).contains(&year) {
            Ok(())
        } else {
            Err(Error::YearOutOfRange { year })
        }
    }

    /// `"YYYY-MM-DD"`, quotes included.
    pub fn marshal_json(&self) -> Result<Vec<u8>> {
        self.check_encodable()?;
        Ok(format!("\"{}\"", self).into_bytes())
    }

    /// Decodes [`marshal_json`](Self::marshal_json) output into `self`.
    ///
    /// The JSON literal `null` leaves `self` as it is. On error `self` is unchanged.
    pub fn unmarshal_json(&mut self, data: &[u8]) -> Result<()> {
        if data == JSON_NULL {
            return Ok(());
        }
        let quoted = data
            .strip_prefix(b"\"")
            .and_then(|rest| rest.strip_suffix(b"\""))
            .ok_or_else(|| {
                Error::parse(JSON_LAYOUT, &String::from_utf8_lossy(data), "expected a string")
            })?;
        *self = decode_calendar_date(quoted)?;
        Ok(())
    }

    /// `YYYY-MM-DD`.
    pub fn marshal_text(&self) -> Result<Vec<u8>> {
        self.check_encodable()?;
        Ok(self.to_string().into_bytes())
    }

    /// Decodes [`marshal_text`](Self::marshal_text) output into `self`. On error `self` is
    /// unchanged.
    pub fn unmarshal_text(&mut self, data: &[u8]) -> Result<()> {
        *self = decode_calendar_date(data)?;
        Ok(())
    }

    /// Encodes midnight in the display zone with [`Timestamp::marshal_binary`].
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        self.to_timestamp().marshal_binary()
    }

    /// Decodes [`marshal_binary`](Self::marshal_binary) output into `self`. On error `self`
    /// is unchanged.
    pub fn unmarshal_binary(&mut self, data: &[u8]) -> Result<()> {
        let timestamp = Timestamp::unmarshal_binary(data)?;
        *self = Date::from_timestamp(&timestamp);
        Ok(())
    }
}

/// Decodes exactly `YYYY-MM-DD`: an unsigned four-digit year, then two-digit month and day.
fn decode_calendar_date(data: &[u8]) -> Result<Date> {
    let text = std::str::from_utf8(data).map_err(|_| {
        Error::parse(DEFAULT_LAYOUT, &String::from_utf8_lossy(data), "invalid UTF-8")
    })?;
    let well_formed = data.len() == 10
        && data.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(Error::parse(
            DEFAULT_LAYOUT,
            text,
            "expected YYYY-MM-DD with a year from 0000 to 9999",
        ));
    }
    Date::parse(DEFAULT_LAYOUT, text)
}

impl FromStr for Date {
    type Err = Error;

    /// Parses exactly `YYYY-MM-DD`, the form [`Display`](fmt::Display) writes for years 0
    /// through 9999.
    fn from_str(s: &str) -> Result<Date> {
        decode_calendar_date(s.as_bytes())
    }
}

/// `YYYY-MM-DD`; years before 0 carry a `-` and years past 9999 take more digits.
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) = self.ymd();
        let sign = if year < 0 { "-" } else { "" };
        f.pad(&format!(
            "{}{:04}-{:02}-{:02}",
            sign,
            year.unsigned_abs(),
            month,
            day
        ))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.check_encodable().map_err(ser::Error::custom)?;
        serializer.collect_str(self)
    }
}

struct DateVisitor;

impl Visitor<'_> for DateVisitor {
    type Value = Date;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date formatted as YYYY-MM-DD")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Date, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> std::result::Result<Date, E> {
        decode_calendar_date(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Date, D::Error> {
        deserializer.deserialize_str(DateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::zone::tests::stockholm_2024;

    fn utc(year: i32, month: i32, day: i32) -> Date {
        Date::new_in(year, month, day, &Zone::utc())
    }

    #[test]
    fn parse() {
        let date = Date::parse(DEFAULT_LAYOUT, "2024-02-29").unwrap();
        assert_eq!(date.ymd(), (2024, 2, 29));
        assert!(date.display_zone().is_some_and(Zone::is_utc));

        let date = Date::parse("%A, %d %b %Y", "Saturday, 01 Jun 2024").unwrap();
        assert_eq!(date.ymd(), (2024, 6, 1));

        let date: Date = "1999-12-31".parse().unwrap();
        assert_eq!(date.ymd(), (1999, 12, 31));
    }

    #[test]
    fn parse_with_offset_keeps_wall_clock_date() {
        let date = Date::parse("%F %T %z", "2024-06-30 23:30:00 -0500").unwrap();
        assert_eq!(date.ymd(), (2024, 6, 30));
        assert_eq!(date.display_zone(), Some(&Zone::fixed("", -5 * 3600)));
    }

    #[test]
    fn parse_in_zone() {
        let zone = stockholm_2024();
        let date = Date::parse_in(DEFAULT_LAYOUT, "2024-07-01", &zone).unwrap();
        assert_eq!(date.ymd(), (2024, 7, 1));
        assert_eq!(date.display_zone(), Some(&zone));
        assert_eq!(date.to_timestamp().unix_seconds(), 1_719_784_800);
    }

    #[test]
    fn parse_errors() {
        for text in ["2023-02-29", "2024-13-01", "2024-01-01x", ""] {
            assert!(
                matches!(Date::parse(DEFAULT_LAYOUT, text), Err(Error::Parse { .. })),
                "{text:?}"
            );
        }
        assert!(matches!(
            Date::parse("%Q", "2024"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn from_str_takes_only_the_canonical_form() {
        for text in [
            "2024-1-01",
            "24-01-01",
            "+2024-01-01",
            "-0001-12-31",
            "10000-01-01",
            " 2024-01-01",
            "2024/01/01",
            "2024-02-30",
        ] {
            assert!(
                matches!(text.parse::<Date>(), Err(Error::Parse { .. })),
                "{text:?}"
            );
        }
        assert_eq!("0000-01-01".parse::<Date>().unwrap().ymd(), (0, 1, 1));
    }

    #[test]
    fn format() {
        let date = Date::new_in(2024, 7, 1, &stockholm_2024());
        assert_eq!(date.format(DEFAULT_LAYOUT).unwrap(), "2024-07-01");
        assert_eq!(
            date.format("%a %e %B %Y, week %V").unwrap(),
            "Mon  1 July 2024, week 27"
        );
        assert_eq!(date.format("%F %T %z %Z").unwrap(), "2024-07-01 00:00:00 +0200 CEST");
        assert!(matches!(date.format("%"), Err(Error::Format { .. })));
        assert!(matches!(
            utc(12345, 6, 7).format(DEFAULT_LAYOUT),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn append_format() {
        let mut buf = b"due: ".to_vec();
        utc(2024, 1, 9).append_format(DEFAULT_LAYOUT, &mut buf).unwrap();
        utc(2024, 1, 10).append_format(" / %d", &mut buf).unwrap();
        assert_eq!(buf, b"due: 2024-01-09 / 10");
        assert!(utc(2024, 1, 11).append_format("%", &mut buf).is_err());
        assert_eq!(buf, b"due: 2024-01-09 / 10");
    }

    #[test]
    fn display() {
        assert_eq!(utc(2024, 1, 9).to_string(), "2024-01-09");
        assert_eq!(utc(33, 4, 3).to_string(), "0033-04-03");
        assert_eq!(utc(-1, 12, 31).to_string(), "-0001-12-31");
        assert_eq!(utc(12345, 6, 7).to_string(), "12345-06-07");
        assert_eq!(Date::default().to_string(), "0001-01-01");
        assert_eq!(format!("[{:>12}]", utc(2024, 1, 9)), "[  2024-01-09]");
    }

    #[test]
    fn json_round_trip() {
        for date in [utc(0, 1, 1), utc(2024, 2, 29), utc(9999, 12, 31)] {
            let json = date.marshal_json().unwrap();
            let mut decoded = Date::default();
            decoded.unmarshal_json(&json).unwrap();
            assert_eq!(decoded, date);
            assert!(decoded.display_zone().is_some_and(Zone::is_utc));
        }
        assert_eq!(utc(2024, 2, 29).marshal_json().unwrap(), b"\"2024-02-29\"");
    }

    #[test]
    fn json_year_bounds() {
        assert_eq!(
            utc(10000, 1, 1).marshal_json(),
            Err(Error::YearOutOfRange { year: 10000 })
        );
        assert_eq!(
            utc(-1, 12, 31).marshal_json(),
            Err(Error::YearOutOfRange { year: -1 })
        );
    }

    #[test]
    fn json_null_is_a_no_op() {
        let mut date = Date::new_in(2024, 5, 17, &stockholm_2024());
        date.unmarshal_json(b"null").unwrap();
        assert_eq!(date.ymd(), (2024, 5, 17));
        assert_eq!(date.display_zone(), Some(&stockholm_2024()));
    }

    #[test]
    fn json_errors_leave_target_unchanged() {
        let mut date = utc(2024, 5, 17);
        for data in [
            &b"2024-05-18"[..],
            b"\"2024-05-32\"",
            b"\"2024-05-18",
            b"NULL",
            b"",
            b"\"\xff\"",
            b"\"",
            b"\"-0001-12-31\"",
            b"\"+2024-05-18\"",
            b"\"10000-01-01\"",
        ] {
            assert!(
                matches!(date.unmarshal_json(data), Err(Error::Parse { .. })),
                "{:?}",
                String::from_utf8_lossy(data)
            );
            assert_eq!(date.ymd(), (2024, 5, 17));
        }
    }

    #[test]
    fn text() {
        let date = utc(2024, 12, 1);
        assert_eq!(date.marshal_text().unwrap(), b"2024-12-01");
        assert!(matches!(
            utc(10000, 1, 1).marshal_text(),
            Err(Error::YearOutOfRange { .. })
        ));

        let mut decoded = Date::default();
        decoded.unmarshal_text(b"2024-12-01").unwrap();
        assert_eq!(decoded, date);
        for data in [&b"\"2024-12-02\""[..], b"+2024-01-01", b"-2024-01-01", b"02024-01-01"] {
            assert!(
                matches!(decoded.unmarshal_text(data), Err(Error::Parse { .. })),
                "{:?}",
                String::from_utf8_lossy(data)
            );
            assert_eq!(decoded, date);
        }
    }

    #[test]
    fn binary_round_trip_keeps_zone() {
        for zone in [Zone::utc(), Zone::fixed("", 5 * 3600 + 30 * 60), Zone::fixed("", -3600)] {
            let date = Date::new_in(2024, 3, 10, &zone);
            let data = date.marshal_binary().unwrap();
            let mut decoded = Date::default();
            decoded.unmarshal_binary(&data).unwrap();
            assert_eq!(decoded, date);
            assert_eq!(decoded.display_zone(), Some(&zone));
        }
    }

    #[test]
    fn binary_layout() {
        // 2024-01-01T00:00:00Z is 63_839_664_000 seconds after 0001-01-01.
        let data = utc(2024, 1, 1).marshal_binary().unwrap();
        let mut expected = vec![1];
        expected.extend_from_slice(&63_839_664_000_i64.to_be_bytes());
        expected.extend_from_slice(&[0, 0, 0, 0, 0xff, 0xff]);
        assert_eq!(data, expected);
    }

    #[test]
    fn binary_errors_leave_target_unchanged() {
        let mut date = utc(2024, 5, 17);
        assert_eq!(
            date.unmarshal_binary(&[]),
            Err(Error::BinaryDecode("no data"))
        );
        assert_eq!(
            date.unmarshal_binary(&[3; 15]),
            Err(Error::BinaryDecode("unsupported version"))
        );
        assert_eq!(
            date.unmarshal_binary(&[1; 14]),
            Err(Error::BinaryDecode("invalid length"))
        );
        assert_eq!(date.ymd(), (2024, 5, 17));
        assert!(date.display_zone().is_some_and(Zone::is_utc));
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Event {
        name: String,
        on: Date,
        until: Option<Date>,
    }

    #[test]
    fn serde() {
        let event = Event {
            name: "Midsummer".to_string(),
            on: utc(2024, 6, 21),
            until: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"name":"Midsummer","on":"2024-06-21","until":null}"#);
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);

        let decoded: Event =
            serde_json::from_str(r#"{"name":"x","on":"2024-06-21","until":"2024-06-23"}"#)
                .unwrap();
        assert_eq!(decoded.until, Some(utc(2024, 6, 23)));
    }

    #[test]
    fn serde_errors() {
        assert!(serde_json::to_string(&utc(10000, 1, 1)).is_err());
        assert!(serde_json::from_str::<Date>(r#""2024-02-30""#).is_err());
        assert!(serde_json::from_str::<Date>("20240101").is_err());
        assert!(serde_json::from_str::<Date>(r#""-0001-12-31""#).is_err());
        assert!(serde_json::from_str::<Date>(r#""+2024-01-01""#).is_err());
    }
}
