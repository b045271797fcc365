//! Positional base-62 encoding of store identifiers.
//!
//! The alphabet is fixed: digits, then lowercase, then uppercase. Changing it
//! invalidates every code issued so far.

use crate::error::{CoreError, Result};

/// The 62-symbol alphabet, most significant symbol written first.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

/// Longest code `encode` can produce (`u64::MAX` needs 11 symbols).
pub const MAX_ENCODED_LEN: usize = 11;

/// Encodes an identifier as a base-62 string.
///
/// `encode(0)` yields the empty string; store identifiers start at 1.
///
/// # Examples
///
/// ```
/// use tinyurl_core::base62;
///
/// assert_eq!(base62::encode(1), "1");
/// assert_eq!(base62::encode(62), "10");
/// ```
pub fn encode(mut id: u64) -> String {
    let mut buf = Vec::with_capacity(MAX_ENCODED_LEN);
    while id > 0 {
        buf.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    buf.reverse();
    // Every symbol comes from the ASCII alphabet.
    buf.into_iter().map(char::from).collect()
}

/// Decodes a base-62 string back to the identifier it encodes.
///
/// Fails with [`CoreError::InvalidCodeFormat`] on an empty input, on any
/// symbol outside [`ALPHABET`], or when the value does not fit in a `u64`.
pub fn decode(code: &str) -> Result<u64> {
    if code.is_empty() {
        return Err(CoreError::InvalidCodeFormat(
            "code cannot be empty".to_string(),
        ));
    }

    code.chars().try_fold(0u64, |acc, c| {
        let digit = symbol_value(c).ok_or_else(|| {
            CoreError::InvalidCodeFormat(format!("'{c}' is not a base62 symbol in '{code}'"))
        })?;
        acc.checked_mul(BASE)
            .and_then(|value| value.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidCodeFormat(format!("'{code}' overflows u64")))
    })
}

/// Returns the value of a single symbol, or `None` if it is not in the alphabet.
fn symbol_value(c: char) -> Option<u64> {
    let value = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'a'..='z' => c as u64 - 'a' as u64 + 10,
        'A'..='Z' => c as u64 - 'A' as u64 + 36,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn encode_zero_is_empty() {
        assert_eq!(encode(0), "");
    }

    #[test]
    fn encode_follows_alphabet_order() {
        assert_eq!(encode(1), "1");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(35), "z");
        assert_eq!(encode(36), "A");
        assert_eq!(encode(61), "Z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "ZZ");
    }

    #[test]
    fn encode_max_fits_in_max_len() {
        let code = encode(u64::MAX);
        assert_eq!(code.len(), MAX_ENCODED_LEN);
        assert_eq!(decode(&code).unwrap(), u64::MAX);
    }

    #[test]
    fn round_trip() {
        let samples = [1u64, 2, 61, 62, 63, 999, 238_327, 238_328, 1 << 40, u64::MAX - 1];
        for id in samples {
            assert_eq!(decode(&encode(id)).unwrap(), id, "id {id}");
        }
    }

    #[test]
    fn encode_is_injective_over_a_dense_range() {
        let codes: HashSet<String> = (1..=20_000u64).map(encode).collect();
        assert_eq!(codes.len(), 20_000);
    }

    #[test]
    fn decode_rejects_symbols_outside_alphabet() {
        for code in ["ab-c", "a b", "héllo", "abc!", "_"] {
            let err = decode(code).unwrap_err();
            assert!(matches!(err, CoreError::InvalidCodeFormat(_)), "{code}");
        }
    }

    #[test]
    fn decode_rejects_empty() {
        assert!(matches!(decode(""), Err(CoreError::InvalidCodeFormat(_))));
    }

    #[test]
    fn decode_rejects_overflow() {
        let too_big = "Z".repeat(MAX_ENCODED_LEN + 1);
        assert!(matches!(
            decode(&too_big),
            Err(CoreError::InvalidCodeFormat(_))
        ));
    }
}
