use std::fmt;

use rand::Rng;
use subtle::ConstantTimeEq;

use super::errors::OtpError;

/// Six digit one-time code.
///
/// Generated codes are drawn uniformly from `100000..=999999`, so they
/// never start with a zero and never render shorter than six digits.
/// Submitted codes only need to be six ASCII digits; a leading zero is
/// accepted on input and simply never matches.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub const LENGTH: usize = 6;
    const MIN: u32 = 100_000;
    const MAX: u32 = 999_999;

    /// Draw a fresh code from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let value = rand::thread_rng().gen_range(Self::MIN..=Self::MAX);
        Self(value.to_string())
    }

    /// Parse a code submitted by a client.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not exactly six ASCII digits
    pub fn parse(raw: &str) -> Result<Self, OtpError> {
        let raw = raw.trim();
        if raw.len() == Self::LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(OtpError::InvalidFormat {
                expected: Self::LENGTH,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a stored code without short-circuiting on the
    /// first differing byte.
    pub fn matches(&self, stored: &str) -> bool {
        self.0.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

// Codes are secrets; keep them out of debug output.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
