//! Numeric routines behind the `fibonacci`, `prime`, `lcm` and `hcf`
//! operations. All functions are pure.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    #[error("{0} requires at least one number")]
    EmptyInput(&'static str),

    #[error("{0} result exceeds the supported integer range")]
    Overflow(&'static str),
}

/// First `n` terms of 0, 1, 1, 2, 3, 5, ...
///
/// Fails with [`NumericError::Overflow`] once a term no longer fits in a
/// `u64` (from the 95th term on).
pub fn fibonacci(n: usize) -> Result<Vec<u64>, NumericError> {
    let mut terms: Vec<u64> = Vec::with_capacity(n.min(FIBONACCI_TERMS_LIMIT));

    for i in 0..n {
        let term = match i {
            0 => 0,
            1 => 1,
            _ => terms[i - 1]
                .checked_add(terms[i - 2])
                .ok_or(NumericError::Overflow("fibonacci"))?,
        };
        terms.push(term);
    }

    Ok(terms)
}

/// Largest Fibonacci prefix whose terms all fit in a `u64` (F(0)..=F(93)).
pub const FIBONACCI_TERMS_LIMIT: usize = 94;

/// Most values one `prime` request may carry.
pub const PRIME_VALUES_LIMIT: usize = 1_000;

/// Largest value accepted for primality testing. Trial division stops at
/// 10^6, so one value costs at most half a million divisions.
pub const PRIME_VALUE_LIMIT: i64 = 1_000_000_000_000;

/// Trial division up to floor(sqrt(x)), odd divisors only after 2.
pub fn is_prime(x: i64) -> bool {
    if x < 2 {
        return false;
    }
    if x % 2 == 0 {
        return x == 2;
    }

    let mut d = 3;
    while d <= x / d {
        if x % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Primes of `values`, in input order, duplicates kept.
pub fn filter_primes(values: &[i64]) -> Vec<i64> {
    values.iter().copied().filter(|v| is_prime(*v)).collect()
}

/// Greatest common divisor of the absolute values; `gcd(0, 0) == 0`.
pub fn gcd(a: i64, b: i64) -> u64 {
    gcd_u64(a.unsigned_abs(), b.unsigned_abs())
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `|a * b| / gcd(a, b)`, or 0 when either operand is 0.
pub fn lcm_pair(a: i64, b: i64) -> Result<u64, NumericError> {
    lcm_u64(a.unsigned_abs(), b.unsigned_abs())
}

fn lcm_u64(a: u64, b: u64) -> Result<u64, NumericError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd_u64(a, b))
        .checked_mul(b)
        .ok_or(NumericError::Overflow("lcm"))
}

/// Highest common factor of all values.
pub fn reduce_hcf(values: &[i64]) -> Result<u64, NumericError> {
    let (first, rest) = values
        .split_first()
        .ok_or(NumericError::EmptyInput("hcf"))?;

    Ok(rest
        .iter()
        .fold(first.unsigned_abs(), |acc, v| gcd_u64(acc, v.unsigned_abs())))
}

/// Least common multiple of all values.
pub fn reduce_lcm(values: &[i64]) -> Result<u64, NumericError> {
    let (first, rest) = values
        .split_first()
        .ok_or(NumericError::EmptyInput("lcm"))?;

    rest.iter()
        .try_fold(first.unsigned_abs(), |acc, v| lcm_u64(acc, v.unsigned_abs()))
}
