//! Key construction and escaping for resource table keys.
//!
//! The resource table addresses rows by a partition key and a row key. The
//! partition key of a resource set is the lower-cased concatenation of the
//! culture name and the namespace:
//!
//! ```text
//! partition key: | lower(culture) | lower(namespace) |
//! row key:       | resource key   |
//! ```
//!
//! Keys that must be split back into their parts use the escaped composite
//! layout instead. Both markers are ordinary key characters so that the
//! store's ordinal range comparisons keep working:
//!
//! ```text
//! composite key: | escape(first) | 'a' | escape(second) |
//! escape seq:    | 'b' | hex hi | hex lo |
//! ```

use crate::error::{Error, Result};

/// Separates the two halves of a composite key.
pub const KEY_SEPARATOR: char = 'a';

/// Introduces a two-digit hexadecimal escape sequence.
pub const ESCAPE_CHARACTER: char = 'b';

/// Characters removed by [`encode_for_table_storage`].
const STRIPPED_CHARACTERS: [char; 6] = ['/', '\\', '#', '?', '~', '.'];

/// Returns true for characters that are not allowed verbatim in a key.
///
/// Covers control characters, the C1 range and the characters the table
/// service treats specially in key predicates.
pub fn is_invalid_key_character(c: char) -> bool {
    let code = c as u32;
    code < 32
        || (127..160).contains(&code)
        || matches!(c, '#' | '&' | '+' | '/' | '?' | ':' | '%' | '\\')
}

fn push_escape_sequence(out: &mut String, c: char) {
    out.push(ESCAPE_CHARACTER);
    out.push_str(&format!("{:02X}", c as u32));
}

/// Escapes a string into a store-safe key fragment.
///
/// The escape marker, the key separator and every invalid key character
/// are replaced by `b` followed by the character's uppercase hex code.
pub fn escape(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ESCAPE_CHARACTER || c == KEY_SEPARATOR || is_invalid_key_character(c) {
            push_escape_sequence(&mut out, c);
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverses [`escape`].
///
/// Fails with [`Error::Encoding`] if an escape sequence is truncated or
/// is not followed by two hexadecimal digits.
pub fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE_CHARACTER {
            out.push(c);
            continue;
        }
        let (hi, lo) = match (chars.next(), chars.next()) {
            (Some(hi), Some(lo)) => (hi, lo),
            _ => {
                return Err(Error::Encoding(format!(
                    "the string '{}' is not correctly escaped",
                    s
                )));
            }
        };
        match (hi.to_digit(16), lo.to_digit(16)) {
            (Some(hi), Some(lo)) => {
                let byte = (hi * 16 + lo) as u8;
                out.push(char::from(byte));
            }
            _ => {
                return Err(Error::Encoding(format!(
                    "invalid escape sequence '{}{}{}' in '{}'",
                    ESCAPE_CHARACTER, hi, lo, s
                )));
            }
        }
    }
    Ok(out)
}

/// Combines a culture name and a namespace into a resource set partition key.
///
/// Both inputs are lower-cased and concatenated with no separator and no
/// escaping. Stored resources are keyed this way, so the layout must not
/// change.
pub fn combine_to_key(first: &str, second: &str) -> String {
    let mut key = first.to_lowercase();
    key.push_str(&second.to_lowercase());
    key
}

/// Returns the escaped first half of a composite key, including the separator.
///
/// Every composite key built from `first` starts with this prefix.
pub fn escaped_first(first: &str) -> String {
    let mut prefix = escape(first);
    prefix.push(KEY_SEPARATOR);
    prefix
}

/// Builds a reversible composite key from two fragments.
pub fn composite_key(first: &str, second: &str) -> String {
    let mut key = escaped_first(first);
    key.push_str(&escape(second));
    key
}

fn split_composite_key(key: &str) -> Result<(&str, &str)> {
    key.split_once(KEY_SEPARATOR).ok_or_else(|| {
        Error::Encoding(format!(
            "composite key '{}' has no '{}' separator",
            key, KEY_SEPARATOR
        ))
    })
}

/// Returns the unescaped first half of a composite key.
pub fn get_first_from_key(key: &str) -> Result<String> {
    let (first, _) = split_composite_key(key)?;
    unescape(first)
}

/// Returns the unescaped second half of a composite key.
pub fn get_second_from_key(key: &str) -> Result<String> {
    let (_, second) = split_composite_key(key)?;
    unescape(second)
}

/// Computes the exclusive upper bound for a prefix range query.
///
/// The table service has no "starts with" predicate, so `k.starts_with(s)`
/// is evaluated as `s <= k && k < next_comparison_string(s)` under ordinal
/// comparison. The result is `s` with its last character advanced by one
/// code point (skipping the surrogate range).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `s` is empty or ends in `char::MAX`.
pub fn next_comparison_string(s: &str) -> Result<String> {
    let mut chars = s.chars();
    let last = chars
        .next_back()
        .ok_or_else(|| Error::InvalidInput("the string argument must not be empty".into()))?;
    let next = match last {
        char::MAX => {
            return Err(Error::InvalidInput(format!(
                "cannot form an upper bound for '{}'",
                s
            )));
        }
        '\u{D7FF}' => '\u{E000}',
        c => char::from_u32(c as u32 + 1)
            .ok_or_else(|| Error::Internal(format!("no successor for {:?}", c)))?,
    };
    let mut out = String::with_capacity(s.len() + next.len_utf8());
    out.push_str(chars.as_str());
    out.push(next);
    Ok(out)
}

/// Normalizes a namespace or class name for use in a partition key.
///
/// Removes `/ \ # ? ~ .` and lower-cases the rest. Absent or empty input
/// yields an empty string.
pub fn encode_for_table_storage(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v
            .chars()
            .filter(|c| !STRIPPED_CHARACTERS.contains(c))
            .collect::<String>()
            .to_lowercase(),
        _ => String::new(),
    }
}
