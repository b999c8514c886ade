use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity object handed to the core by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    #[serde(default)]
    pub admin: bool,
}

impl CurrentUser {
    pub fn new(id: Uuid) -> Self {
        Self { id, admin: false }
    }

    pub fn admin(id: Uuid) -> Self {
        Self { id, admin: true }
    }
}
