use serde::Deserialize;
use serde::Serialize;

/// Claims carried by access and refresh tokens.
///
/// The subject id travels under `userId` for user tokens and under
/// `adminId` for admin tokens; admin tokens additionally carry
/// `"type": "admin"`. Exactly one of the two id fields is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrincipalClaims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(rename = "adminId", default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,

    pub email: String,

    pub role: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token id, keeps two tokens minted in the same second distinct
    pub jti: String,
}

impl PrincipalClaims {
    pub const ADMIN_TYPE: &'static str = "admin";

    pub fn for_user(id: String, email: String, role: String, iat: i64, exp: i64) -> Self {
        Self {
            user_id: Some(id),
            admin_id: None,
            email,
            role,
            token_type: None,
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn for_admin(id: String, email: String, role: String, iat: i64, exp: i64) -> Self {
        Self {
            user_id: None,
            admin_id: Some(id),
            email,
            role,
            token_type: Some(Self::ADMIN_TYPE.to_string()),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Claims carried by a password reset ticket.
///
/// The `type` tag is what distinguishes a ticket from an access token
/// signed with the same secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetClaims {
    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "type")]
    pub token_type: String,

    pub iat: i64,

    pub exp: i64,
}
