use std::time::SystemTime;

use num_integer::Integer;

use crate::error::{Error, Result};
use crate::gregorian_normalized_date::{day_from_overflowing_date, GregorianNormalizedDate};
use crate::zone::Zone;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

// Seconds from 0001-01-01T00:00:00Z to 1970-01-01T00:00:00Z. The binary encoding counts
// from year 1.
const UNIX_TO_YEAR_ONE_SECONDS: i64 = 719_162 * SECONDS_PER_DAY;

const BINARY_VERSION_V1: u8 = 1;
// Adds a trailing byte for offsets with a seconds part.
const BINARY_VERSION_V2: u8 = 2;
const BINARY_LEN_V1: usize = 15;
const BINARY_LEN_V2: usize = 16;
// Offset in minutes that marks UTC, as opposed to a zone that happens to be at +0000.
const BINARY_UTC_MARKER: i16 = -1;

/// An instant with nanosecond precision, viewed in a zone.
///
/// This is the timestamp representation dates are truncated from and expanded into. Two
/// timestamps are equal when they denote the same instant in the same zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    // Seconds since the unix epoch. Unix time: every day has exactly 86,400 seconds.
    unix_seconds: i64,
    nanos: u32,
    zone: Zone,
}

impl Timestamp {
    /// Nanoseconds past one billion carry into the seconds.
    pub fn new(unix_seconds: i64, nanos: u32, zone: Zone) -> Self {
        let (carry, nanos) = nanos.div_rem(&NANOS_PER_SECOND);
        Timestamp {
            unix_seconds: unix_seconds.saturating_add(carry as i64),
            nanos,
            zone,
        }
    }

    pub fn from_system_time(time: SystemTime, zone: Zone) -> Self {
        let (unix_seconds, nanos) = match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
            Err(e) => {
                // Before the epoch: the duration counts backwards, so borrow a second to keep
                // the nanoseconds positive.
                let d = e.duration();
                let seconds = -(d.as_secs() as i64);
                match d.subsec_nanos() {
                    0 => (seconds, 0),
                    n => (seconds - 1, NANOS_PER_SECOND - n),
                }
            }
        };
        Timestamp::new(unix_seconds, nanos, zone)
    }

    /// Midnight at the start of the given date in `zone`. Out-of-range months and days are
    /// normalized the way [`Date::new`](crate::Date::new) does.
    pub fn midnight(year: i32, month: i32, day: i32, zone: &Zone) -> Self {
        Self::midnight_of_day(
            day_from_overflowing_date(year as i64, month as i64, day as i64),
            zone,
        )
    }

    /// Saturates at the ends of the `i64` second range.
    pub(crate) fn midnight_of_day(day: i64, zone: &Zone) -> Self {
        Self::from_local_seconds(day.saturating_mul(SECONDS_PER_DAY), 0, zone)
    }

    /// A wall-clock time, as seconds since 1970-01-01T00:00 on the zone's clock.
    pub(crate) fn from_local_seconds(local_seconds: i64, nanos: u32, zone: &Zone) -> Self {
        Timestamp::new(zone.local_to_unix(local_seconds), nanos, zone.clone())
    }

    pub fn unix_seconds(&self) -> i64 {
        self.unix_seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// The same instant viewed in another zone.
    pub fn in_zone(&self, zone: &Zone) -> Timestamp {
        Timestamp {
            unix_seconds: self.unix_seconds,
            nanos: self.nanos,
            zone: zone.clone(),
        }
    }

    /// Seconds east of UTC in force at this instant.
    pub fn offset(&self) -> i32 {
        self.zone.offset_at(self.unix_seconds)
    }

    pub fn abbreviation(&self) -> String {
        self.zone.abbreviation_at(self.unix_seconds)
    }

    fn local_seconds(&self) -> i64 {
        self.unix_seconds.saturating_add(self.offset() as i64)
    }

    /// Days since 1970-01-01 of the wall-clock date in this timestamp's zone.
    pub(crate) fn local_day(&self) -> i64 {
        Integer::div_floor(&self.local_seconds(), &SECONDS_PER_DAY)
    }

    /// Year, month and day on the wall clock of this timestamp's zone.
    pub fn civil_date(&self) -> (i64, u8, u8) {
        GregorianNormalizedDate::from_day(self.local_day()).to_date()
    }

    /// Hour, minute and second on the wall clock of this timestamp's zone.
    pub fn clock(&self) -> (u8, u8, u8) {
        let second_of_day = self.local_seconds().mod_floor(&SECONDS_PER_DAY);
        (
            (second_of_day / 3600) as u8,
            (second_of_day / 60 % 60) as u8,
            (second_of_day % 60) as u8,
        )
    }

    /// Encodes the instant and the zone offset in force at it.
    ///
    /// ```text
    /// byte 0        version: 1, or 2 when the offset has a seconds part
    /// bytes 1..=8   big-endian seconds since 0001-01-01T00:00:00Z
    /// bytes 9..=12  big-endian nanoseconds
    /// bytes 13..=14 big-endian offset in minutes, -1 for UTC
    /// byte 15       seconds part of the offset (version 2 only)
    /// ```
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        let mut version = BINARY_VERSION_V1;
        let mut offset_seconds = 0_i8;
        let offset_minutes = if self.zone.is_utc() {
            BINARY_UTC_MARKER
        } else {
            let offset = self.offset();
            if offset % 60 != 0 {
                version = BINARY_VERSION_V2;
                offset_seconds = (offset % 60) as i8;
            }
            let minutes = offset / 60;
            if minutes == BINARY_UTC_MARKER as i32 {
                return Err(Error::ZoneOffset { offset });
            }
            i16::try_from(minutes).map_err(|_| Error::ZoneOffset { offset })?
        };

        let seconds = self
            .unix_seconds
            .checked_add(UNIX_TO_YEAR_ONE_SECONDS)
            .ok_or(Error::TimeOutOfRange {
                unix_seconds: self.unix_seconds,
            })?;

        let mut enc = Vec::with_capacity(BINARY_LEN_V2);
        enc.push(version);
        enc.extend_from_slice(&seconds.to_be_bytes());
        enc.extend_from_slice(&(self.nanos as i32).to_be_bytes());
        enc.extend_from_slice(&offset_minutes.to_be_bytes());
        if version == BINARY_VERSION_V2 {
            enc.push(offset_seconds as u8);
        }
        Ok(enc)
    }

    /// Decodes [`marshal_binary`](Self::marshal_binary) output.
    ///
    /// The UTC marker gives [`Zone::utc`]; an offset matching the local zone at that instant
    /// gives [`Zone::local`]; anything else an unnamed fixed zone.
    pub fn unmarshal_binary(data: &[u8]) -> Result<Timestamp> {
        let version = *data.first().ok_or(Error::BinaryDecode("no data"))?;
        let expected_len = match version {
            BINARY_VERSION_V1 => BINARY_LEN_V1,
            BINARY_VERSION_V2 => BINARY_LEN_V2,
            _ => return Err(Error::BinaryDecode("unsupported version")),
        };
        if data.len() != expected_len {
            return Err(Error::BinaryDecode("invalid length"));
        }

        let mut seconds = [0_u8; 8];
        seconds.copy_from_slice(&data[1..9]);
        let mut nanos = [0_u8; 4];
        nanos.copy_from_slice(&data[9..13]);
        let seconds = i64::from_be_bytes(seconds);
        let nanos = i32::from_be_bytes(nanos);
        let mut offset = i16::from_be_bytes([data[13], data[14]]) as i32 * 60;
        if version == BINARY_VERSION_V2 {
            offset += data[15] as i8 as i32;
        }

        let nanos = u32::try_from(nanos)
            .ok()
            .filter(|n| *n < NANOS_PER_SECOND)
            .ok_or(Error::BinaryDecode("nanoseconds out of range"))?;
        let unix_seconds = seconds
            .checked_sub(UNIX_TO_YEAR_ONE_SECONDS)
            .ok_or(Error::BinaryDecode("seconds out of range"))?;

        let zone = if offset == BINARY_UTC_MARKER as i32 * 60 {
            Zone::utc()
        } else {
            let local = Zone::local();
            if local.offset_at(unix_seconds) == offset {
                local
            } else {
                Zone::fixed("", offset)
            }
        };
        Ok(Timestamp {
            unix_seconds,
            nanos,
            zone,
        })
    }
}
