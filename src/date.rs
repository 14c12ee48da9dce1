use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;

use crate::clock::{Clock, SystemClock};
use crate::gregorian_normalized_date::{
    day_from_overflowing_date, iso_week_of_day, GregorianNormalizedDate,
};
use crate::timestamp::Timestamp;
use crate::weekday::Weekday;
use crate::zone::Zone;

// Day number of 0001-01-01, the zero date.
const YEAR_ONE_DAY: i64 = -719_162;

// Day numbers of -2147483648-01-01 and 2147483647-12-31, the dates of `i32` years.
const MIN_DAY: i64 = -784_353_015_834;
const MAX_DAY: i64 = 784_351_576_776;

/// A calendar date in the proleptic Gregorian calendar.
///
/// A date remembers the zone it was created in (its display zone). The zone is only used
/// when the date is turned back into a [`Timestamp`]; it takes no part in equality, ordering
/// or arithmetic.
///
/// Construction never fails: out-of-range months and days roll over into the neighbouring
/// months and years, the same way [`Date::add`] does. Dates saturate at [`Date::MIN`] and
/// [`Date::MAX`].
///
/// ```
/// use plaindate::{Date, Zone};
///
/// let date = Date::new_in(2024, 2, 30, &Zone::utc());
/// assert_eq!(date.ymd(), (2024, 3, 1));
/// assert_eq!(date, Date::new(2024, 3, 1));
/// ```
#[derive(Clone)]
pub struct Date {
    // Days since 1970-01-01.
    day: i64,
    zone: Option<Zone>,
}

impl Date {
    /// January 1 of year -2147483648.
    pub const MIN: Date = Date {
        day: MIN_DAY,
        zone: None,
    };

    /// December 31 of year 2147483647.
    pub const MAX: Date = Date {
        day: MAX_DAY,
        zone: None,
    };

    /// The date in the host's local zone.
    pub fn new(year: i32, month: i32, day: i32) -> Date {
        Date::new_in(year, month, day, &Zone::local())
    }

    pub fn new_in(year: i32, month: i32, day: i32, zone: &Zone) -> Date {
        Date::from_day(
            day_from_overflowing_date(year as i64, month as i64, day as i64),
            Some(zone.clone()),
        )
    }

    /// Today, on the host's wall clock in the local zone.
    pub fn now() -> Date {
        Date::now_with(&SystemClock::default())
    }

    pub fn now_with<C: Clock + ?Sized>(clock: &C) -> Date {
        Date::from_timestamp(&clock.now())
    }

    /// The calendar date of `timestamp` in its own zone, which becomes the display zone.
    pub fn from_timestamp(timestamp: &Timestamp) -> Date {
        Date::from_day(timestamp.local_day(), Some(timestamp.zone().clone()))
    }

    /// Clamps `day` to the range of [`Date::MIN`] through [`Date::MAX`].
    pub(crate) fn from_day(day: i64, zone: Option<Zone>) -> Date {
        Date {
            day: day.clamp(MIN_DAY, MAX_DAY),
            zone,
        }
    }

    /// Shifts the date by years, months and days in one normalization.
    ///
    /// The fields are added first and the result is normalized afterwards, so the day of
    /// month is never clamped: one month after January 31 is March 2 in a leap year.
    ///
    /// ```
    /// use plaindate::Date;
    ///
    /// let date = Date::new(2024, 1, 31).add(0, 1, 0);
    /// assert_eq!(date.ymd(), (2024, 3, 2));
    /// ```
    pub fn add(&self, years: i32, months: i32, days: i32) -> Date {
        let (year, month, day) = self.ymd();
        Date::from_day(
            day_from_overflowing_date(
                year + years as i64,
                month as i64 + months as i64,
                day as i64 + days as i64,
            ),
            self.zone.clone(),
        )
    }

    /// Saturates at [`Date::MIN`] and [`Date::MAX`].
    pub fn add_days(&self, days: i64) -> Date {
        Date::from_day(self.day.saturating_add(days), self.zone.clone())
    }

    /// Whole days from `other` to `self`; negative when `other` is later.
    pub fn sub(&self, other: &Date) -> i64 {
        self.day - other.day
    }

    /// Days elapsed from `date` until today.
    pub fn since(date: &Date) -> i64 {
        Date::since_with(date, &SystemClock::default())
    }

    pub fn since_with<C: Clock + ?Sized>(date: &Date, clock: &C) -> i64 {
        Date::now_with(clock).sub(date)
    }

    /// Days from today until `date`.
    pub fn until(date: &Date) -> i64 {
        Date::until_with(date, &SystemClock::default())
    }

    pub fn until_with<C: Clock + ?Sized>(date: &Date, clock: &C) -> i64 {
        date.sub(&Date::now_with(clock))
    }

    pub fn before(&self, other: &Date) -> bool {
        self.day < other.day
    }

    pub fn after(&self, other: &Date) -> bool {
        self.day > other.day
    }

    pub fn equal(&self, other: &Date) -> bool {
        self.day == other.day
    }

    /// -1, 0 or +1 as `self` is before, equal to or after `other`.
    pub fn compare(&self, other: &Date) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    fn normalized(&self) -> GregorianNormalizedDate {
        GregorianNormalizedDate::from_day(self.day)
    }

    pub fn year(&self) -> i64 {
        self.ymd().0
    }

    /// Month of the year, 1-12.
    pub fn month(&self) -> u8 {
        self.ymd().1
    }

    /// Day of the month, 1-31.
    pub fn day(&self) -> u8 {
        self.ymd().2
    }

    pub fn ymd(&self) -> (i64, u8, u8) {
        self.normalized().to_date()
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::from_day(self.day)
    }

    /// ISO 8601 week-numbering year and week number (1-53).
    ///
    /// The first days of January may belong to the last week of the previous year and the
    /// last days of December to week 1 of the next.
    pub fn iso_week(&self) -> (i64, u8) {
        iso_week_of_day(self.day)
    }

    /// Day of the year, 1-366.
    pub fn year_day(&self) -> u16 {
        self.normalized().day_of_year()
    }

    pub fn is_leap_year(&self) -> bool {
        self.normalized().is_leap_year()
    }

    pub fn days_in_month(&self) -> u8 {
        self.normalized().days_in_month()
    }

    /// Midnight at the start of the date in the display zone, or in the local zone when the
    /// date has none.
    pub fn to_timestamp(&self) -> Timestamp {
        match &self.zone {
            Some(zone) => self.to_timestamp_in(zone),
            None => self.to_timestamp_in(&Zone::local()),
        }
    }

    pub fn to_timestamp_in(&self, zone: &Zone) -> Timestamp {
        Timestamp::midnight_of_day(self.day, zone)
    }

    pub fn display_zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// Whether this is the zero date: 0001-01-01 without a display zone.
    pub fn is_zero(&self) -> bool {
        self.day == YEAR_ONE_DAY && self.zone.is_none()
    }

    // The field builders drop the display zone.

    /// The same month and day in `year`, normalized (February 29 becomes March 1 in a
    /// common year). The result has no display zone.
    pub fn with_year(&self, year: i32) -> Date {
        let (_, month, day) = self.ymd();
        Date::from_day(
            day_from_overflowing_date(year as i64, month as i64, day as i64),
            None,
        )
    }

    /// The result has no display zone.
    pub fn with_month(&self, month: i32) -> Date {
        let (year, _, day) = self.ymd();
        Date::from_day(
            day_from_overflowing_date(year, month as i64, day as i64),
            None,
        )
    }

    /// The result has no display zone.
    pub fn with_day(&self, day: i32) -> Date {
        let (year, month, _) = self.ymd();
        Date::from_day(
            day_from_overflowing_date(year, month as i64, day as i64),
            None,
        )
    }

    pub fn set_year(&mut self, year: i32) {
        *self = self.with_year(year);
    }

    pub fn set_month(&mut self, month: i32) {
        *self = self.with_month(month);
    }

    pub fn set_day(&mut self, day: i32) {
        *self = self.with_day(day);
    }
}

impl Default for Date {
    fn default() -> Self {
        Date::from_day(YEAR_ONE_DAY, None)
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.day == other.day
    }
}

impl Eq for Date {}

impl Hash for Date {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.day.hash(state);
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day.cmp(&other.day)
    }
}

impl Sub for &Date {
    type Output = i64;

    fn sub(self, other: Self) -> i64 {
        Date::sub(self, other)
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Date")
            .field("date", &format_args!("{}", self))
            .field("zone", &self.zone)
            .finish()
    }
}
