use std::cmp::min;

use num_traits::PrimInt;

/// Division whose quotient saturates at `max_quotient`, with the excess left in the remainder.
///
/// Used to split a day count into calendar periods where the last period of a cycle is one
/// day longer than the others (the leap day lands in the remainder instead of starting a new
/// period).
pub(crate) trait ClampedDivRem<Q: Ord>: Sized {
    fn clamped_div_rem(self, divisor: Self, max_quotient: Q) -> (Q, Self);
}

impl<T, Q> ClampedDivRem<Q> for T
where
    T: PrimInt + TryInto<Q>,
    Q: Ord + Into<T> + Copy,
{
    fn clamped_div_rem(self, divisor: T, max_quotient: Q) -> (Q, Self) {
        let quotient = min(self / divisor, max_quotient.into());
        let remainder = self - quotient * divisor;
        // The quotient is bounded by max_quotient, so the conversion only fails for a negative
        // dividend, which callers never pass.
        let quotient: Q = quotient.try_into().unwrap_or(max_quotient);
        (quotient, remainder)
    }
}
