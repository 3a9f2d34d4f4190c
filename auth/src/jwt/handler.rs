use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT handler bound to a single HS256 signing secret.
///
/// Every token kind (user access, user refresh, admin access, admin
/// refresh) gets its own handler, so a token signed for one kind never
/// verifies under another.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a handler for the given secret.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least 32 bytes recommended
    ///
    /// # Returns
    /// Handler that requires an `exp` claim and applies no clock leeway
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, then decode the claims.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is in the past
    /// * `InvalidSignature` - Token was signed with another secret
    /// * `DecodingFailed` - Token is malformed or the claims do not fit `T`
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::DecodingFailed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn claims_expiring_in(seconds: i64) -> TestClaims {
        TestClaims {
            sub: "user123".to_string(),
            exp: Utc::now().timestamp() + seconds,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let claims = claims_expiring_in(60);

        let token = handler.encode(&claims).expect("Failed to encode token");
        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_garbage() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&claims_expiring_in(60))
            .expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected_without_leeway() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = handler
            .encode(&claims_expiring_in(-5))
            .expect("Failed to encode token");

        let result = handler.decode::<TestClaims>(&token);
        assert_eq!(result, Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_missing_exp_rejected() {
        #[derive(Serialize)]
        struct NoExp {
            sub: String,
        }

        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = handler
            .encode(&NoExp {
                sub: "user123".to_string(),
            })
            .expect("Failed to encode token");

        assert!(handler.decode::<TestClaims>(&token).is_err());
    }
}
