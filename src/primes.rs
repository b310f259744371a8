//! Prime capacity policy for [`ProbingTable`](crate::ProbingTable).
//!
//! The odd-offset probe sequence only reaches enough distinct slots when the
//! table length is prime, so every capacity the table ever uses comes from
//! [`next_prime`].

/// Returns `true` if `number` is prime.
///
/// Trial division by odd divisors up to `√number`.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub const fn is_prime(number: usize) -> bool {
    if number == 2 || number == 3 {
        return true;
    }
    if number < 2 || number % 2 == 0 {
        return false;
    }

    let mut divisor: usize = 3;
    // `divisor <= number / divisor` is `divisor² <= number` without overflow
    while divisor <= number / divisor {
        if number % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// Returns the smallest prime greater than or equal to `number`, or `None` if
/// that prime does not fit in a `usize`.
#[must_use]
pub const fn checked_next_prime(number: usize) -> Option<usize> {
    if number <= 2 {
        return Some(2);
    }

    let mut candidate = number | 1;
    while !is_prime(candidate) {
        candidate = match candidate.checked_add(2) {
            Some(next) => next,
            None => return None,
        };
    }

    Some(candidate)
}

/// Returns the smallest prime greater than or equal to `number`.
///
/// ```rust
/// use probing::next_prime;
///
/// assert_eq!(next_prime(50), 53);
/// assert_eq!(next_prime(2), 2);
/// assert_eq!(next_prime(7), 7);
/// ```
///
/// # Panics
///
/// Panics if no prime `>= number` fits in a `usize`. Use
/// [`checked_next_prime`] to handle that case.
#[must_use]
#[allow(clippy::panic)]
pub const fn next_prime(number: usize) -> usize {
    match checked_next_prime(number) {
        Some(prime) => prime,
        None => panic!("no prime capacity fits in usize"),
    }
}
