use serde::{Deserialize, Serialize};

/// A person who owns stores and schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUIDv7; doubles as the `owner_id` on every roster record.
    pub id: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Maps an external account (e.g. the subject a proxy asserts) to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub user_id: String,
    /// Where the subject comes from, e.g. "proxy".
    pub provider: String,
    /// Opaque identifier within that provider.
    pub subject: String,
    pub created_at: String,
}

/// Stored API token metadata. The secret itself is never kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: String,
    pub user_id: String,
    pub label: Option<String>,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

/// Returned once, at issue time.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plaintext bearer token. Show it to the operator and drop it.
    pub token: String,
    pub record: ApiToken,
}
