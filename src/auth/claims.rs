use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role a session was issued for. One token carries exactly one role;
/// handlers gate on it through the role-specific extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    User,
    Vendor,
    Worker,
    Admin,
}

/// JWT claims structure for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: Uuid,

    /// Actor role
    pub role: ActorRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}
