//! Calendar dates without a time of day.
//!
//! A [`Date`] is a day in the proleptic Gregorian calendar. It remembers the zone it came
//! from so it can be turned back into a [`Timestamp`] at midnight, but the zone never takes
//! part in comparisons or arithmetic.
//!
//! ```
//! use plaindate::{range, Date};
//!
//! let start: Date = "2024-02-27".parse().unwrap();
//! let end = start.add(0, 0, 3);
//! let days: Vec<String> = range(&start, &end).map(|d| d.to_string()).collect();
//! assert_eq!(days, ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);
//! assert_eq!(end.sub(&start), 3);
//! ```

#[macro_use]
mod logging;

mod clock;
mod codec;
mod date;
mod div_rem;
mod error;
mod gregorian_normalized_date;
pub mod layout;
mod range;
mod timestamp;
mod weekday;
mod zone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date::Date;
pub use error::{Error, Result};
pub use layout::DEFAULT_LAYOUT;
pub use range::{range, range_with_index, Range, RangeWithIndex};
pub use timestamp::Timestamp;
pub use weekday::Weekday;
pub use zone::Zone;
