//! Column labels in bijective base-26: `A, B, ..., Z, AA, AB, ..., AZ, BA, ...`.
//!
//! Every "digit" is a letter from `A` (1) to `Z` (26), there is no zero digit.
//! This is why the label length grows exactly at index 26, 26 + 26², and so on,
//! instead of at the powers of 26.

use std::iter::Map;
use std::ops::RangeFrom;

const RADIX: u64 = 26;

/// The error type for [`decode()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelError {
    Empty,
    NotALetter(char),
    /// The label denotes an index that does not fit into a `u64`.
    TooLong,
}

impl std::error::Error for LabelError {}

impl std::fmt::Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelError::Empty => write!(f, "Label is empty"),
            LabelError::NotALetter(c) => write!(f, "Label contains {:?}, which is not a letter", c),
            LabelError::TooLong => write!(f, "Label is too long to be decoded"),
        }
    }
}

/// Returns the `index`-th label, counting from zero.
///
/// ```
/// use tabletop::label::encode;
/// assert_eq!(encode(0), "A");
/// assert_eq!(encode(25), "Z");
/// assert_eq!(encode(26), "AA");
/// assert_eq!(encode(701), "ZZ");
/// assert_eq!(encode(702), "AAA");
/// ```
pub fn encode(index: u64) -> String {
    // Work with the 1-based value, whose bijective digits are taken off
    // from the least significant end.
    let mut n = index as u128 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let digit = ((n - 1) % RADIX as u128) as u8;
        letters.push(b'A' + digit);
        n = (n - 1) / RADIX as u128;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Inverse of [`encode()`]. Letters are accepted in either case.
pub fn decode(label: &str) -> Result<u64, LabelError> {
    if label.is_empty() {
        return Err(LabelError::Empty);
    }
    let mut value: u128 = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(LabelError::NotALetter(c));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u128 + 1;
        value = value
            .checked_mul(RADIX as u128)
            .and_then(|v| v.checked_add(digit))
            .ok_or(LabelError::TooLong)?;
    }
    // value >= 1 since there was at least one digit
    u64::try_from(value - 1).map_err(|_| LabelError::TooLong)
}

/// The infinite sequence of all labels, starting at `A`.
///
/// Each item is computed from its index alone, so any number of these
/// iterators can be created and consumed independently.
pub fn labels() -> Labels {
    labels_from(0)
}

/// Like [`labels()`], but starting at the label for `index`.
pub fn labels_from(index: u64) -> Labels {
    (index..).map(encode as fn(u64) -> String)
}

pub type Labels = Map<RangeFrom<u64>, fn(u64) -> String>;
