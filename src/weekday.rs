use std::fmt;

use num_integer::Integer;

/// Day of the week.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

impl Weekday {
    /// Weekday of a day number counted from 1970-01-01, which was a Thursday.
    pub(crate) fn from_day(day: i64) -> Self {
        let offset = (day + 3).mod_floor(&7);
        WEEKDAYS[offset as usize]
    }

    /// ISO 8601 weekday number, Monday = 1 through Sunday = 7.
    pub fn number_from_monday(self) -> u8 {
        self as u8 + 1
    }

    /// Sunday = 0 through Saturday = 6, as in C's `tm_wday`.
    pub fn days_from_sunday(self) -> u8 {
        (self as u8 + 1) % 7
    }

    pub fn succ(self) -> Self {
        WEEKDAYS[(self as usize + 1) % 7]
    }

    pub fn pred(self) -> Self {
        WEEKDAYS[(self as usize + 6) % 7]
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
