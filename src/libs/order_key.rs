//! Dense, totally-ordered string keys for task ordering.
//!
//! An [`OrderKey`] is a base-36 string (`0-9a-z`) read as a fraction in the
//! open interval (0, 1): the key `"a5"` denotes `0.a5` in base 36. Canonical
//! keys never end in `'0'`, so distinct keys denote distinct values and plain
//! byte comparison of the strings equals numeric comparison of the fractions.
//!
//! Keys are strings rather than integers or floats so that any two distinct
//! keys admit a midpoint: inserting or moving a task between two neighbors
//! produces one fresh key and touches no other row, instead of the O(n)
//! cascading rewrite an integer position column forces on every insert.

use crate::libs::error::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base-36 digit alphabet, in sort order.
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE: u32 = 36;

/// The canonical key for the first task of an owner: 0.5 in base 36.
const MIDDLE: &str = "i";

/// An opaque, densely-insertable ordering key.
///
/// Totally ordered by byte comparison of the inner string. Construct via
/// [`OrderKey::middle`], [`OrderKey::parse`], or the derivation operations;
/// the inner string is guaranteed canonical (non-empty, `0-9a-z` only, no
/// trailing `'0'`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderKey(String);

impl OrderKey {
    /// The key assigned when an owner has no active tasks yet.
    pub fn middle() -> Self {
        OrderKey(MIDDLE.to_string())
    }

    /// Validates a raw string as a canonical order key.
    pub fn parse(raw: &str) -> Result<Self, OrderError> {
        if raw.is_empty() {
            return Err(OrderError::MalformedOrderKey(raw.to_string()));
        }
        if !raw.bytes().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()) {
            return Err(OrderError::MalformedOrderKey(raw.to_string()));
        }
        if raw.ends_with('0') {
            return Err(OrderError::MalformedOrderKey(raw.to_string()));
        }
        Ok(OrderKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A key strictly greater than `self`, used to append after the current
    /// last task.
    ///
    /// Increments the leftmost digit below `'z'` and truncates the rest, so
    /// repeated appends keep keys short instead of growing by one digit each
    /// time.
    pub fn next(&self) -> OrderKey {
        for (i, &c) in self.0.as_bytes().iter().enumerate() {
            if c < b'z' {
                let mut s = self.0[..i].to_string();
                s.push(digit_char(digit_value(c) + 1));
                return OrderKey(s);
            }
        }
        // All digits are 'z'; extend toward 1.0.
        OrderKey(format!("{}{}", self.0, MIDDLE))
    }

    /// A key strictly less than `self`, used to prepend before the current
    /// first task.
    pub fn prev(&self) -> OrderKey {
        for (i, &c) in self.0.as_bytes().iter().enumerate() {
            if c > b'0' {
                let mut s = self.0[..i].to_string();
                let d = digit_value(c);
                if d > 1 {
                    s.push(digit_char(d - 1));
                } else {
                    // Decrementing '1' would leave a trailing zero; step into
                    // the interval below it instead.
                    s.push('0');
                    s.push_str(MIDDLE);
                }
                return OrderKey(s);
            }
        }
        // Canonical keys always contain a nonzero digit.
        OrderKey::middle()
    }

    /// A key strictly between `a` and `b`, requiring `a < b`.
    ///
    /// For canonical keys this always succeeds: any two distinct fractions
    /// admit a midpoint. [`OrderError::OrderKeyExhausted`] signals the
    /// degenerate inputs (equal or inverted keys, as can arise when a restored
    /// task collides with a key assigned while it sat in the trash); callers
    /// treat it as the trigger for a full renumber, never a user-visible
    /// error.
    pub fn between(a: &OrderKey, b: &OrderKey) -> Result<OrderKey, OrderError> {
        if a.0 >= b.0 {
            return Err(OrderError::OrderKeyExhausted);
        }
        let mid = midpoint(a.0.as_bytes(), Some(b.0.as_bytes()));
        let key = OrderKey::parse(&mid).map_err(|_| OrderError::OrderKeyExhausted)?;
        if a.0.as_str() < key.as_str() && key.as_str() < b.0.as_str() {
            Ok(key)
        } else {
            Err(OrderError::OrderKeyExhausted)
        }
    }

    /// `n` fresh, evenly spaced canonical keys in ascending order.
    ///
    /// Used by the renumber maintenance pass: multiples of `36^w / (n + 1)`
    /// at the smallest width `w` that fits, with trailing zeros trimmed.
    pub fn spread(n: usize) -> Vec<OrderKey> {
        if n == 0 {
            return Vec::new();
        }
        let mut width = 1usize;
        let mut capacity = BASE as u128;
        while capacity <= n as u128 + 1 {
            capacity *= BASE as u128;
            width += 1;
        }
        let step = capacity / (n as u128 + 1);
        (1..=n as u128)
            .map(|i| {
                let mut value = step * i;
                let mut buf = vec![0u8; width];
                for slot in buf.iter_mut().rev() {
                    *slot = DIGITS[(value % BASE as u128) as usize];
                    value /= BASE as u128;
                }
                while buf.len() > 1 && buf.last() == Some(&b'0') {
                    buf.pop();
                }
                OrderKey(buf.iter().map(|&c| c as char).collect())
            })
            .collect()
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderKey {
    type Error = OrderError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        OrderKey::parse(&raw)
    }
}

impl From<OrderKey> for String {
    fn from(key: OrderKey) -> String {
        key.0
    }
}

fn digit_value(c: u8) -> u32 {
    if c.is_ascii_digit() {
        (c - b'0') as u32
    } else {
        (c - b'a') as u32 + 10
    }
}

fn digit_char(d: u32) -> char {
    DIGITS[d as usize] as char
}

/// Midpoint of two base-36 fractions.
///
/// `a` exhausted means 0; `b` of `None` (or exhausted) means 1. The shared
/// prefix is kept, treating `a` as zero-extended, then the first differing
/// digit pair decides: pick a digit strictly between when there is room,
/// otherwise descend one digit and bisect the remaining interval.
fn midpoint(a: &[u8], b: Option<&[u8]>) -> String {
    if let Some(b) = b {
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(b'0') == b[n] {
            n += 1;
        }
        if n > 0 {
            let head: String = b[..n].iter().map(|&c| c as char).collect();
            let a_tail = if n < a.len() { &a[n..] } else { &[][..] };
            return format!("{}{}", head, midpoint(a_tail, Some(&b[n..])));
        }
    }
    let digit_a = a.first().map(|&c| digit_value(c)).unwrap_or(0);
    let digit_b = match b {
        Some(b) if !b.is_empty() => digit_value(b[0]),
        _ => BASE,
    };
    if digit_b - digit_a > 1 {
        digit_char((digit_a + digit_b) / 2).to_string()
    } else if b.map_or(false, |b| b.len() > 1) {
        // Consecutive first digits; b's own first digit is strictly between,
        // since b carries more (nonzero-terminated) digits after it.
        (b.unwrap()[0] as char).to_string()
    } else {
        let a_tail = if a.is_empty() { &[][..] } else { &a[1..] };
        format!("{}{}", digit_char(digit_a), midpoint(a_tail, None))
    }
}
