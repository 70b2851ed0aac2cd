/// User domain type
use serde::{Deserialize, Serialize};

use super::UserId;

/// Application-level profile of a signed-in user
///
/// Keyed by the same identifier as the backend auth user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,
}
