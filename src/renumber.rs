//! Positional placeholder renumbering.
//!
//! A placeholder token is `$` followed by the maximal run of ASCII digits
//! (`$1`, `$47`, `$148`). Renumbering shifts every token inside an inclusive
//! range by a fixed offset and leaves all other tokens byte-identical.
//!
//! The shift is computed per token in a single pass over the original text,
//! so a token written by the pass is never matched again. `$146` becomes
//! `$145` and stays there, regardless of what else the range contains.

use serde::Deserialize;
use std::ops::Range;

/// Inclusive token range and the offset applied to tokens inside it.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RenumberRange {
    pub start: u32,
    pub end: u32,
    #[serde(default = "default_shift")]
    pub shift: i64,
}

fn default_shift() -> i64 {
    -1
}

impl RenumberRange {
    pub fn new(start: u32, end: u32, shift: i64) -> Self {
        Self { start, end, shift }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.start..=self.end).contains(&value)
    }

    /// New value for `value`, or `None` when the token is outside the range
    /// or the shifted value does not fit a token.
    pub fn map(&self, value: u32) -> Option<u32> {
        if !self.contains(value) {
            return None;
        }
        let shifted = i64::from(value).checked_add(self.shift)?;
        u32::try_from(shifted).ok()
    }
}

/// A placeholder token located in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Numeric value of the token
    pub value: u32,
    /// Byte span of the whole token, `$` included
    pub span: Range<usize>,
}

/// Iterate over the canonical placeholder tokens of `text`.
///
/// Digit runs with a leading zero (`$049`) and runs too large for `u32` are
/// not canonical tokens and are skipped.
pub fn placeholders(text: &str) -> Placeholders<'_> {
    Placeholders {
        bytes: text.as_bytes(),
        pos: 0,
    }
}

pub struct Placeholders<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for Placeholders<'_> {
    type Item = Placeholder;

    fn next(&mut self) -> Option<Placeholder> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            self.pos += 1;

            if self.bytes[start] != b'$' {
                continue;
            }

            let digits_start = start + 1;
            let digits_end = self.bytes[digits_start..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(self.bytes.len(), |offset| digits_start + offset);

            if digits_end == digits_start {
                continue;
            }
            self.pos = digits_end;

            let digits = &self.bytes[digits_start..digits_end];
            if digits.len() > 1 && digits[0] == b'0' {
                continue;
            }

            let Some(value) = digits.iter().try_fold(0u32, |acc, d| {
                acc.checked_mul(10)?.checked_add(u32::from(d - b'0'))
            }) else {
                continue;
            };

            return Some(Placeholder {
                value,
                span: start..digits_end,
            });
        }
        None
    }
}

/// Shift every placeholder inside `range`, returning the new text and the
/// number of tokens rewritten.
pub fn shift_placeholders(text: &str, range: &RenumberRange) -> (String, usize) {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut shifted = 0;

    for token in placeholders(text) {
        let Some(new_value) = range.map(token.value) else {
            continue;
        };
        output.push_str(&text[last..token.span.start]);
        output.push('$');
        output.push_str(&new_value.to_string());
        last = token.span.end;
        shifted += 1;
    }

    output.push_str(&text[last..]);

    tracing::debug!(
        start = range.start,
        end = range.end,
        shift = range.shift,
        shifted,
        "renumbered placeholders"
    );

    (output, shifted)
}
