use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder owner for records created without an authenticated user.
pub const DEFAULT_USER_ID: &str = "user_1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub from_stop: String,
    pub to_stop: String,
    pub created_at: DateTime<Utc>,
}
