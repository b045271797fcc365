use crate::base62;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated short code identifier for a shortened URL.
///
/// Short codes are the base-62 encoding of a store identifier, so they are
/// 1-11 characters long and contain only `[0-9a-zA-Z]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Derives the short code for a store-assigned identifier.
    ///
    /// Identifiers start at 1; `0` would encode to the empty string and is
    /// rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinyurl_core::ShortCode;
    ///
    /// let code = ShortCode::from_id(125).unwrap();
    /// assert_eq!(code.as_str(), "21");
    /// assert_eq!(code.id().unwrap(), 125);
    /// ```
    pub fn from_id(id: u64) -> Result<Self, CoreError> {
        if id == 0 {
            return Err(CoreError::InvalidShortCode(
                "identifier must be at least 1".to_string(),
            ));
        }
        Ok(Self(base62::encode(id)))
    }

    /// Creates a new `ShortCode` after validating the input.
    ///
    /// Valid codes are 1-11 characters of the base-62 alphabet and decode to
    /// a value that fits in a `u64`.
    pub fn new(code: impl Into<String>) -> Result<Self, CoreError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes read back from trusted storage.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Decodes the code back to the identifier it was derived from.
    pub fn id(&self) -> Result<u64, CoreError> {
        base62::decode(&self.0)
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), CoreError> {
        if code.len() > base62::MAX_ENCODED_LEN {
            return Err(CoreError::InvalidCodeFormat(format!(
                "length must be at most {}, got {}",
                base62::MAX_ENCODED_LEN,
                code.len()
            )));
        }
        base62::decode(code).map(|_| ())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortCode> for String {
    fn from(value: ShortCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("b").is_ok());
        assert!(ShortCode::new("Abc123xyz").is_ok());
        assert!(ShortCode::new("zzzz").is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(
            ShortCode::new(""),
            Err(CoreError::InvalidCodeFormat(_))
        ));
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(12)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc-def").is_err());
        assert!(ShortCode::new("abc_def").is_err());
    }

    #[test]
    fn from_id_rejects_zero() {
        assert!(matches!(
            ShortCode::from_id(0),
            Err(CoreError::InvalidShortCode(_))
        ));
    }

    #[test]
    fn from_id_round_trips() {
        for id in [1u64, 62, 3844, 1_000_000_007] {
            let code = ShortCode::from_id(id).unwrap();
            assert_eq!(code.id().unwrap(), id);
            assert_eq!(ShortCode::new(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn display() {
        let code = ShortCode::from_id(1).unwrap();
        assert_eq!(code.to_string(), "1");
    }

    #[test]
    fn to_url() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(code.to_url("https://tiny.url"), "https://tiny.url/abc123");
        assert_eq!(code.to_url("https://tiny.url/"), "https://tiny.url/abc123");
    }

    #[test]
    fn deserialize_validates() {
        let code: ShortCode = serde_json::from_str("\"a1B\"").unwrap();
        assert_eq!(code.as_str(), "a1B");
        assert!(serde_json::from_str::<ShortCode>("\"a-1\"").is_err());
    }
}
