use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::model::role::Role;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// A user as seen through the directory. The core never writes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}
