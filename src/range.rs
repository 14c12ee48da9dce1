use std::iter::FusedIterator;

use crate::date::Date;

/// Every date from `start` to `end`, both included.
///
/// The range counts down when `start` is after `end`, so `range(end, start)` yields the same
/// dates in reverse. Each date is `start` shifted by a number of days and keeps `start`'s
/// display zone.
///
/// The range holds at most `usize::MAX` dates. That only binds on targets with a `usize`
/// narrower than 64 bits, where a longer range stops early.
///
/// ```
/// use plaindate::{range, Date};
///
/// let days: Vec<_> = range(&Date::new(2024, 1, 3), &Date::new(2024, 1, 1))
///     .map(|d| d.day())
///     .collect();
/// assert_eq!(days, [3, 2, 1]);
/// ```
pub fn range(start: &Date, end: &Date) -> Range {
    let span = end.sub(start);
    let max_len = u64::try_from(usize::MAX).unwrap_or(u64::MAX);
    Range {
        start: start.clone(),
        step: if span < 0 { -1 } else { 1 },
        front: 0,
        back: (span.unsigned_abs() + 1).min(max_len),
    }
}

/// Like [`range`], also yielding each date's position, counted from zero.
pub fn range_with_index(start: &Date, end: &Date) -> RangeWithIndex {
    RangeWithIndex {
        range: range(start, end),
    }
}

/// Iterator created by [`range`].
///
/// Dates are computed as they're asked for.
#[derive(Debug, Clone)]
pub struct Range {
    start: Date,
    // +1 or -1 days per position.
    step: i64,
    // Positions [front, back) are yet to be yielded. `back` fits in a usize.
    front: u64,
    back: u64,
}

impl Range {
    fn at(&self, position: u64) -> Date {
        self.start.add_days(self.step * position as i64)
    }

    /// The date the next call to `next` will return.
    pub fn peek(&self) -> Option<Date> {
        (self.front < self.back).then(|| self.at(self.front))
    }

    fn next_indexed(&mut self) -> Option<(Date, usize)> {
        if self.front == self.back {
            return None;
        }
        let position = self.front;
        self.front += 1;
        Some((self.at(position), position as usize))
    }

    fn next_back_indexed(&mut self) -> Option<(Date, usize)> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some((self.at(self.back), self.back as usize))
    }

    fn remaining(&self) -> usize {
        (self.back - self.front) as usize
    }
}

impl Iterator for Range {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        self.next_indexed().map(|(date, _)| date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining();
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<Date> {
        self.front = self.back.min(self.front.saturating_add(n as u64));
        self.next()
    }
}

impl DoubleEndedIterator for Range {
    fn next_back(&mut self) -> Option<Date> {
        self.next_back_indexed().map(|(date, _)| date)
    }
}

impl ExactSizeIterator for Range {}

impl FusedIterator for Range {}

/// Iterator created by [`range_with_index`].
#[derive(Debug, Clone)]
pub struct RangeWithIndex {
    range: Range,
}

impl RangeWithIndex {
    pub fn peek(&self) -> Option<(Date, usize)> {
        self.range
            .peek()
            .map(|date| (date, self.range.front as usize))
    }
}

impl Iterator for RangeWithIndex {
    type Item = (Date, usize);

    fn next(&mut self) -> Option<(Date, usize)> {
        self.range.next_indexed()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for RangeWithIndex {
    fn next_back(&mut self) -> Option<(Date, usize)> {
        self.range.next_back_indexed()
    }
}

impl ExactSizeIterator for RangeWithIndex {}

impl FusedIterator for RangeWithIndex {}
