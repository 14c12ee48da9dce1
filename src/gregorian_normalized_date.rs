// The gregorian calendar works in cycles of 400 years. Each cycle starts with a leap year.
// From then every 4th year is a leap year, except for every 100th year. So the year
// 1600 is a leap year but 1700, 1800 and 1900 are not. This means that each cycle
// has 100-3=97 leap years and 303 normal years. 97*366 + 303*365 = 146097 days.
// Day numbers are counted from the unix epoch (1970-01-01). To get them aligned with
// cycles we use a reference that starts at the beginning of a cycle.
//
// Having the leap day at the beginning of a cycle or quadrennium makes the calculations
// branchy, so we shift the year to start on March 1. The leap day then comes out at the
// end of each period and falls out naturally as an "overflow" of the last year (see
// clamped_div_rem). The zero point is 2000-03-01, right after the last leap day of the
// preceding cycle. A quadrennium then consists of the "years"
// - 2000-03-01 to 2001-02-28
// - 2001-03-01 to 2002-02-28
// - 2002-03-01 to 2003-02-28
// - 2003-03-01 to 2004-02-29
//
// and the cycle ends with the "leap century"
// - 2396-03-01 to 2397-02-28
// - 2397-03-01 to 2398-02-28
// - 2398-03-01 to 2399-02-28
// - 2399-03-01 to 2400-02-29

use num_integer::Integer;

use crate::div_rem::ClampedDivRem;
use crate::weekday::Weekday;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GregorianNormalizedDate {
    // Number of 400-year cycles since 2000-03-01.
    cycle: i64,
    // Number of centuries since the start of the cycle (0-3).
    century: u8,
    // Number of quadrennia (4-year periods) since the start of the century (0-24).
    quadrennium: u8,
    // Number of years since the start of the quadrennium (0-3).
    year: u8,
    // Number of days since the start of the year (0-365, where the year starts March 1).
    day: u16,
}

const GREGORIAN_CYCLE_DAYS: u32 = 97 * 366 + 303 * 365;
const GREGORIAN_CENTURY_DAYS: u16 = 24 * 366 + 76 * 365;
#[allow(clippy::identity_op)]
const GREGORIAN_QUADRENNIUM_DAYS: u16 = 3 * 365 + 1 * 366;
const GREGORIAN_YEAR_DAYS: u16 = 365;
const GREGORIAN_CYCLE_YEARS: u16 = 400;
const GREGORIAN_CENTURY_YEARS: u8 = 100;
const GREGORIAN_QUADRENNIUM_YEARS: u8 = 4;

const GREGORIAN_NORMALIZED_DATE_OFFSET_DAYS: u16 = 11017; // 11017 days from 1970-01-01 to 2000-03-01
const GREGORIAN_MONTH_STARTS: [u16; 13] =
    [0, 31, 61, 92, 122, 153, 184, 214, 245, 275, 306, 337, 65535]; // Index 0 = March

// Offset of January 1 in a March-based year.
const JANUARY_START: u16 = 306;

fn month_from_day_offset(day: u16) -> u8 {
    let mut month = (day / 30) as u8;
    if day < GREGORIAN_MONTH_STARTS[month as usize] {
        // Overshot the month. Move back.
        month -= 1;
    }
    month
}

/// Day number (days since 1970-01-01) of a year, month and day that may each be out of range.
///
/// The month carries into the year first; then `day - 1` days are added to the first day of
/// the resulting month. So 2023-13-01 is 2024-01-01, 2024-02-30 is 2024-03-01 and 2024-03-00
/// is 2024-02-29.
pub(crate) fn day_from_overflowing_date(year: i64, month: i64, day: i64) -> i64 {
    let (carry, month) = (month - 1).div_mod_floor(&12);
    let first_of_month = GregorianNormalizedDate::from_date(year + carry, month as u8 + 1, 1);
    first_of_month.to_day() + (day - 1)
}

/// ISO 8601 week-numbering year and week (1-53) of a day number.
///
/// Weeks start on Monday and week 1 is the week containing the year's first Thursday, so the
/// week belongs to whichever year its Thursday falls in.
pub(crate) fn iso_week_of_day(day: i64) -> (i64, u8) {
    let weekday = Weekday::from_day(day).number_from_monday() as i64;
    let thursday = GregorianNormalizedDate::from_day(day + 4 - weekday);
    let (year, _, _) = thursday.to_date();
    let week = (thursday.day_of_year() - 1) / 7 + 1;
    (year, week as u8)
}

impl GregorianNormalizedDate {
    pub(crate) fn from_day(day: i64) -> Self {
        let day = day - GREGORIAN_NORMALIZED_DATE_OFFSET_DAYS as i64;
        let (cycle, days_into_cycle) = day.div_mod_floor(&(GREGORIAN_CYCLE_DAYS as i64));
        let days_into_cycle = days_into_cycle as u32; // 2^18 days per cycle

        // The first three centuries of each cycle are normal centuries with 24 leap years and 76
        // normal years. The fourth century is a leap century with 25 leap years, so it has one
        // extra leap day at the end.
        let (century, days_into_century) =
            days_into_cycle.clamped_div_rem(GREGORIAN_CENTURY_DAYS as u32, 3_u8);
        let days_into_century = days_into_century as u16; // 2^16 days per century

        // Each quadrennium has 3 normal years and 1 leap year, so the leap day is at the end. The
        // last quadrennium of a normal century lacks the leap day and is one day shorter, so a
        // plain division works here.
        let (quadrennium, days_into_quadrennium) =
            days_into_century.div_rem(&GREGORIAN_QUADRENNIUM_DAYS);
        let quadrennium = quadrennium as u8;

        let (years_into_quadrennium, days_into_year) =
            days_into_quadrennium.clamped_div_rem(GREGORIAN_YEAR_DAYS, 3_u8);

        GregorianNormalizedDate {
            cycle,
            century,
            quadrennium,
            year: years_into_quadrennium,
            day: days_into_year,
        }
    }

    pub(crate) fn to_day(&self) -> i64 {
        self.cycle * GREGORIAN_CYCLE_DAYS as i64
            + self.century as i64 * GREGORIAN_CENTURY_DAYS as i64
            + self.quadrennium as i64 * GREGORIAN_QUADRENNIUM_DAYS as i64
            + self.year as i64 * GREGORIAN_YEAR_DAYS as i64
            + self.day as i64
            + GREGORIAN_NORMALIZED_DATE_OFFSET_DAYS as i64
    }

    /// Month must be 1-12 and day 1-31. A day past the end of its month is still
    /// converted linearly, so `to_day` on the result lands in the following month.
    pub(crate) fn from_date(year: i64, month: u8, day: u8) -> Self {
        debug_assert!((1..=12).contains(&month));
        debug_assert!((1..=31).contains(&day));

        let mut year = year;
        let mut month = month - 1;
        let day = day - 1;
        if month < 2 {
            month += 12;
            year -= 1;
        }
        month -= 2;
        year -= 2000;
        let (cycle, years_into_cycle) = year.div_mod_floor(&(GREGORIAN_CYCLE_YEARS as i64));
        let years_into_cycle = years_into_cycle as u16; // 2^9 years per cycle
        let (century, years_into_century) =
            years_into_cycle.clamped_div_rem(GREGORIAN_CENTURY_YEARS as u16, 3_u8);
        let (quadrennium, years_into_quadrennium) =
            years_into_century.clamped_div_rem(GREGORIAN_QUADRENNIUM_YEARS as u16, 24_u8);
        let years_into_quadrennium = years_into_quadrennium as u8;

        let days_into_year = GREGORIAN_MONTH_STARTS[month as usize] + day as u16;
        GregorianNormalizedDate {
            cycle,
            century,
            quadrennium,
            year: years_into_quadrennium,
            day: days_into_year,
        }
    }

    pub(crate) fn to_date(&self) -> (i64, u8, u8) {
        let mut year = 2000
            + 400 * self.cycle
            + 100 * self.century as i64
            + 4 * self.quadrennium as i64
            + self.year as i64;

        // NB: shifted so march is first. This way the leap day never moves a month start.
        let mut month = month_from_day_offset(self.day);
        let days_into_month = (self.day - GREGORIAN_MONTH_STARTS[month as usize]) as u8;

        // Back to January-based months; January and February belong to the next calendar year.
        month += 2;
        if month >= 12 {
            month -= 12;
            year += 1;
        }
        (year, month + 1, days_into_month + 1)
    }

    /// Ordinal day of the calendar year, 1-366.
    pub(crate) fn day_of_year(&self) -> u16 {
        if self.day >= JANUARY_START {
            self.day - JANUARY_START + 1
        } else {
            // March to December: January and February of the same calendar year precede it.
            let february = if self.is_leap_year() { 29 } else { 28 };
            self.day + 31 + february + 1
        }
    }

    pub(crate) fn days_in_month(&self) -> u8 {
        let month = month_from_day_offset(self.day);
        if month < 11 {
            (GREGORIAN_MONTH_STARTS[(month + 1) as usize] - GREGORIAN_MONTH_STARTS[month as usize])
                as u8
        } else if self.is_leap_year() {
            29
        } else {
            28
        }
    }

    pub(crate) fn is_leap_year(&self) -> bool {
        // The normalized year starts in March, so January 1 and later belong to the following
        // calendar year. Rebuild the calendar year within the cycle (the cycle itself doesn't
        // matter) and apply the usual rule.
        let mut year = 100 * self.century as u16 + 4 * self.quadrennium as u16 + self.year as u16;
        if self.day >= JANUARY_START {
            year = (year + 1) % 400
        }

        (year % 4 == 0) && (year % 100 != 0 || year == 0)
    }
}
