use super::errors::PasswordError;

/// Acceptance rules for new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 8;

    /// Validate a candidate password.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than `min_length` characters
    pub fn check(&self, password: &str) -> Result<(), PasswordError> {
        let actual = password.chars().count();
        if actual < self.min_length {
            return Err(PasswordError::TooShort {
                min: self.min_length,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: Self::DEFAULT_MIN_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_minimum_length() {
        assert!(PasswordPolicy::default().check("12345678").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(
            PasswordPolicy::default().check("short"),
            Err(PasswordError::TooShort { min: 8, actual: 5 })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 4 characters, 8 bytes
        assert!(PasswordPolicy::default().check("ééöö").is_err());
    }
}
